use accompanist::config::{AppConfig, BoundaryPolicy};
use accompanist::data::key::{Key, ScaleMode};
use accompanist::data::{quantize, render_accompaniment, MidiConnector};
use accompanist::engines::evaluation::FitnessEvaluator;
use accompanist::engines::generation::{EvolutionEngine, IndividualGenerator, SilentProgressCallback};
use midly::num::{u15, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        },
    }
}

fn end_of_track(delta: u32) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

/// Single-track melody at 120 ticks per beat: D4, rest, F4, A4.
fn melody_file() -> Vec<u8> {
    let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(120))));
    smf.tracks.push(vec![
        note_on(0, 62, 90),
        note_on(120, 62, 0),
        note_on(120, 65, 90),
        note_on(120, 65, 0),
        note_on(0, 69, 90),
        note_on(120, 69, 0),
        end_of_track(0),
    ]);
    let mut buf = Vec::new();
    smf.write(&mut buf).unwrap();
    buf
}

fn note_ons(track: &[TrackEvent]) -> usize {
    track
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                }
            )
        })
        .count()
}

#[test]
fn test_melody_to_accompaniment_file() {
    let mut config = AppConfig::default();
    config.evolution.population_size = 12;
    config.evolution.generations = 4;
    config.evolution.seed = Some(31);

    let bytes = melody_file();
    let source = MidiConnector::parse_melody(&bytes, &config.melody).unwrap();
    assert_eq!(source.melody_track, 0);
    assert_eq!(source.lowest_pitch, Some(62));

    let melody = quantize(&source.events, source.ticks_per_beat, config.melody.boundary).unwrap();
    // 480 ticks over 120 per beat, end point included
    assert_eq!(melody.slots(), &[62, 0, 65, 69, 0]);

    let key = Key::from_tonic(2, ScaleMode::Minor, 62);
    let generator = IndividualGenerator::from_config(&config.evolution, &config.melody, Some(key.clone()));
    let evaluator = FitnessEvaluator::new(config.scoring.clone(), Some(key));
    let mut engine = EvolutionEngine::new(config.evolution.clone(), generator, evaluator).unwrap();
    let outcome = engine.run(&melody, SilentProgressCallback).unwrap();
    assert_eq!(outcome.best.len(), 5);

    let chords = render_accompaniment(&outcome.best, source.ticks_per_beat, &config.render);
    let out = MidiConnector::build_accompaniment(&bytes, &source, &chords, &config.render).unwrap();

    let smf = Smf::parse(&out).unwrap();
    assert_eq!(smf.tracks.len(), 2);
    assert_eq!(smf.tracks[0].len(), 7);

    let playable = outcome.best.chords().iter().filter(|c| c.is_renderable()).count();
    assert_eq!(note_ons(&smf.tracks[1]), playable * 3);
    let span: u32 = smf.tracks[1].iter().map(|e| e.delta.as_int()).sum();
    assert_eq!(span, 5 * 120);
}

#[test]
fn test_exclusive_boundary_drops_final_slot() {
    let bytes = melody_file();
    let config = AppConfig::default();
    let source = MidiConnector::parse_melody(&bytes, &config.melody).unwrap();
    let melody = quantize(&source.events, source.ticks_per_beat, BoundaryPolicy::Exclusive).unwrap();
    assert_eq!(melody.slots(), &[62, 0, 65, 69]);
}

#[test]
fn test_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("accompanist-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let input = dir.join("melody.mid");
    let output = dir.join("accompanied.mid");
    std::fs::write(&input, melody_file()).unwrap();

    let config = AppConfig::default();
    let source = MidiConnector::load_melody(&input, &config.melody).unwrap();
    let melody = quantize(&source.events, source.ticks_per_beat, config.melody.boundary).unwrap();
    let generator = IndividualGenerator::from_config(&config.evolution, &config.melody, None);
    let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(2);
    let individual = generator.generate(&melody, &mut rng).unwrap();

    let chords = render_accompaniment(&individual, source.ticks_per_beat, &config.render);
    MidiConnector::write_accompaniment(&input, &source, &chords, &config.render, &output).unwrap();

    let written = std::fs::read(&output).unwrap();
    let smf = Smf::parse(&written).unwrap();
    assert_eq!(smf.tracks.len(), 2);

    std::fs::remove_dir_all(&dir).unwrap();
}
