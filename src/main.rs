use accompanist::config::{AppConfig, GeneratorPolicy};
use accompanist::data::key::{parse_pitch_class, Key, ScaleMode};
use accompanist::data::{quantize, render_accompaniment, MidiConnector};
use accompanist::engines::evaluation::FitnessEvaluator;
use accompanist::engines::generation::{ConsoleProgressCallback, EvolutionEngine, IndividualGenerator};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "accompanist")]
#[command(about = "Genetic chord accompaniment for monophonic MIDI melodies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a chord accompaniment for a melody and write it as a new MIDI file
    Harmonize {
        /// Input MIDI file containing the melody
        input: PathBuf,

        /// Output MIDI file (melody plus chord track)
        #[arg(short, long, default_value = "output.mid")]
        output: PathBuf,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Number of generations
        #[arg(short, long)]
        generations: Option<usize>,

        /// Population size (at least 10)
        #[arg(short, long)]
        population: Option<usize>,

        /// Initial population policy
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Key tonic, e.g. C, F#, Bb. Enables key-aware scoring.
        #[arg(long, requires = "mode")]
        tonic: Option<String>,

        /// Key mode (major or minor)
        #[arg(long, requires = "tonic")]
        mode: Option<String>,

        /// Write a JSON report of the best accompaniment and per-generation stats
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the default configuration as TOML
    DefaultConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Jitter,
    KeySampling,
}

impl From<PolicyArg> for GeneratorPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Jitter => GeneratorPolicy::Jitter,
            PolicyArg::KeySampling => GeneratorPolicy::KeySampling,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DefaultConfig => {
            print!("{}", AppConfig::default().to_toml_string()?);
            Ok(())
        }
        Commands::Harmonize {
            input,
            output,
            config,
            seed,
            generations,
            population,
            policy,
            tonic,
            mode,
            report,
        } => {
            let mut app_config = match &config {
                Some(path) => AppConfig::load_from_file(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => AppConfig::default(),
            };
            if seed.is_some() {
                app_config.evolution.seed = seed;
            }
            if let Some(g) = generations {
                app_config.evolution.generations = g;
            }
            if let Some(p) = population {
                app_config.evolution.population_size = p;
            }
            if let Some(p) = policy {
                app_config.evolution.generator_policy = p.into();
            }
            app_config.validate()?;

            let source = MidiConnector::load_melody(&input, &app_config.melody)
                .with_context(|| format!("reading melody from {}", input.display()))?;
            let melody = quantize(&source.events, source.ticks_per_beat, app_config.melody.boundary)?;
            log::info!(
                "Quantized melody: {} beat slots, {} onsets",
                melody.len(),
                melody.onset_count()
            );

            let key = match (tonic, mode) {
                (Some(tonic), Some(mode)) => {
                    let Some(tonic_pc) = parse_pitch_class(&tonic) else {
                        bail!("unrecognized tonic '{}'", tonic);
                    };
                    let mode: ScaleMode = mode.parse().map_err(anyhow::Error::msg)?;
                    let lowest = source
                        .lowest_pitch
                        .context("melody has no notes to anchor the key")?;
                    let key = Key::from_tonic(tonic_pc, mode, lowest);
                    log::info!("Key pitches: {:?}", key.pitches());
                    Some(key)
                }
                _ => None,
            };
            if app_config.evolution.generator_policy == GeneratorPolicy::KeySampling && key.is_none() {
                bail!("key sampling policy needs --tonic and --mode");
            }

            let generator =
                IndividualGenerator::from_config(&app_config.evolution, &app_config.melody, key.clone());
            let evaluator = FitnessEvaluator::new(app_config.scoring.clone(), key);
            let mut engine = EvolutionEngine::new(app_config.evolution.clone(), generator, evaluator)?;
            let outcome = engine.run(&melody, ConsoleProgressCallback)?;

            println!("Best fitness: {}", outcome.best_fitness);

            let events = render_accompaniment(&outcome.best, source.ticks_per_beat, &app_config.render);
            MidiConnector::write_accompaniment(&input, &source, &events, &app_config.render, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Wrote {}", output.display());

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&outcome.report())?;
                std::fs::write(&path, json)
                    .with_context(|| format!("writing report {}", path.display()))?;
            }
            Ok(())
        }
    }
}
