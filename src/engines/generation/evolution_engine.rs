use crate::config::{ConfigSection, EvolutionConfig, GeneratorPolicy};
use crate::engines::evaluation::FitnessEvaluator;
use crate::engines::generation::{
    generator::IndividualGenerator,
    operators::{crossover, mutate, replace_weakest},
    population::Population,
};
use crate::error::{AccompanistError, Result};
use crate::types::{FitnessScore, Individual, QuantizedMelody};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;

/// Phases of one generation, executed strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionPhase {
    ScorePopulation,
    SelectAndBreed,
    Mutate,
    ScoreOffspring,
    Replace,
}

impl fmt::Display for EvolutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvolutionPhase::ScorePopulation => "score population",
            EvolutionPhase::SelectAndBreed => "select and breed",
            EvolutionPhase::Mutate => "mutate",
            EvolutionPhase::ScoreOffspring => "score offspring",
            EvolutionPhase::Replace => "replace",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: FitnessScore,
    pub mean_fitness: f64,
}

#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    pub population: Population,
    pub fitness: Vec<FitnessScore>,
    pub best: Individual,
    pub best_fitness: FitnessScore,
    pub history: Vec<GenerationStats>,
}

/// Serializable summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub best_fitness: FitnessScore,
    pub best: &'a Individual,
    pub history: &'a [GenerationStats],
}

impl EvolutionOutcome {
    pub fn report(&self) -> RunReport<'_> {
        RunReport {
            best_fitness: self.best_fitness,
            best: &self.best,
            history: &self.history,
        }
    }
}

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats);
}

/// Steady-state genetic search over chord sequences.
pub struct EvolutionEngine<R: Rng = StdRng> {
    config: EvolutionConfig,
    generator: IndividualGenerator,
    evaluator: FitnessEvaluator,
    rng: R,
}

impl EvolutionEngine<StdRng> {
    /// Seeded from `config.seed` when present, from OS entropy otherwise.
    pub fn new(
        config: EvolutionConfig,
        generator: IndividualGenerator,
        evaluator: FitnessEvaluator,
    ) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, generator, evaluator, rng)
    }
}

impl<R: Rng> EvolutionEngine<R> {
    pub fn with_rng(
        config: EvolutionConfig,
        generator: IndividualGenerator,
        evaluator: FitnessEvaluator,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;
        if generator.policy() != config.generator_policy {
            return Err(AccompanistError::Configuration(format!(
                "generator uses the {:?} policy but the configuration asks for {:?}",
                generator.policy(),
                config.generator_policy
            )));
        }
        if generator.policy() == GeneratorPolicy::Jitter && generator.jitter() != config.generation_jitter {
            return Err(AccompanistError::Configuration(format!(
                "generator jitter {:?} differs from configured generation_jitter {:?}",
                generator.jitter(),
                config.generation_jitter
            )));
        }
        generator.validate()?;
        Ok(Self {
            config,
            generator,
            evaluator,
            rng,
        })
    }

    /// Generate the initial population, then evolve it.
    pub fn run<C: ProgressCallback>(
        &mut self,
        melody: &QuantizedMelody,
        callback: C,
    ) -> Result<EvolutionOutcome> {
        let population = self
            .generator
            .populate(self.config.population_size, melody, &mut self.rng)?;
        log::info!(
            "Generated {} individuals over {} beat slots ({:?} policy)",
            population.size(),
            melody.len(),
            self.generator.policy()
        );
        self.evolve(population, melody, callback)
    }

    /// Run the configured number of generations on `population`.
    pub fn evolve<C: ProgressCallback>(
        &mut self,
        mut population: Population,
        melody: &QuantizedMelody,
        mut callback: C,
    ) -> Result<EvolutionOutcome> {
        if population.size() != self.config.population_size {
            return Err(AccompanistError::InvalidPopulationState(format!(
                "expected {} individuals, got {}",
                self.config.population_size,
                population.size()
            )));
        }
        if let Some(bad) = population.iter().find(|i| i.len() != melody.len()) {
            return Err(AccompanistError::InvalidPopulationState(format!(
                "individual of length {} for a melody of {} slots",
                bad.len(),
                melody.len()
            )));
        }

        let mut history = Vec::with_capacity(self.config.generations);
        if melody.is_empty() {
            log::info!("Melody has no beat slots; nothing to evolve");
        } else {
            for generation in 0..self.config.generations {
                callback.on_generation_start(generation);
                let stats = self.step(generation, &mut population, melody)?;
                callback.on_generation_complete(&stats);
                history.push(stats);
            }
        }

        let fitness = self.evaluator.population_fitness(&population, melody);
        let (best_index, best_fitness) = population.best(&fitness)?.ok_or_else(|| {
            AccompanistError::InvalidPopulationState("population is empty".to_string())
        })?;
        let best = population.members()[best_index].clone();

        Ok(EvolutionOutcome {
            population,
            fitness,
            best,
            best_fitness,
            history,
        })
    }

    fn step(
        &mut self,
        generation: usize,
        population: &mut Population,
        melody: &QuantizedMelody,
    ) -> Result<GenerationStats> {
        log::debug!("Generation {}: {}", generation + 1, EvolutionPhase::ScorePopulation);
        let fitness = self.evaluator.population_fitness(population, melody);
        let stats = GenerationStats {
            generation,
            best_fitness: fitness.iter().copied().max().unwrap_or(0),
            mean_fitness: fitness.iter().map(|&f| f as f64).sum::<f64>() / fitness.len().max(1) as f64,
        };

        log::debug!("Generation {}: {}", generation + 1, EvolutionPhase::SelectAndBreed);
        let mut offspring = crossover(
            population,
            &fitness,
            self.config.offspring_per_generation,
            &mut self.rng,
        )?;

        log::debug!("Generation {}: {}", generation + 1, EvolutionPhase::Mutate);
        if let Some((child, slot)) = mutate(&mut offspring, self.config.mutation_jitter, &mut self.rng)? {
            log::trace!("Mutated offspring {} at beat {}", child, slot);
        }

        log::debug!("Generation {}: {}", generation + 1, EvolutionPhase::ScoreOffspring);
        let offspring_fitness = self.evaluator.batch_fitness(&offspring, melody);

        log::debug!("Generation {}: {}", generation + 1, EvolutionPhase::Replace);
        replace_weakest(
            population,
            &fitness,
            offspring,
            &offspring_fitness,
            self.config.replaced_per_generation,
        )?;

        Ok(stats)
    }
}
