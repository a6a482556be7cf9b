use crate::config::{EvolutionConfig, GeneratorPolicy, JitterRange, MelodyConfig};
use crate::data::key::Key;
use crate::engines::generation::population::Population;
use crate::error::{AccompanistError, Result};
use crate::types::{Chord, Individual, PitchValue, QuantizedMelody};
use rand::seq::SliceRandom;
use rand::Rng;

/// Distance below the melody pitch around which jittered chords are placed.
pub const ACCOMPANIMENT_DROP: PitchValue = 24;

/// Builds random candidate accompaniments for a quantized melody.
#[derive(Debug, Clone)]
pub struct IndividualGenerator {
    policy: GeneratorPolicy,
    jitter: JitterRange,
    seed_chord: Chord,
    key: Option<Key>,
}

impl IndividualGenerator {
    pub fn new(policy: GeneratorPolicy, jitter: JitterRange, seed_chord: Chord, key: Option<Key>) -> Self {
        Self {
            policy,
            jitter,
            seed_chord,
            key,
        }
    }

    pub fn from_config(evolution: &EvolutionConfig, melody: &MelodyConfig, key: Option<Key>) -> Self {
        Self::new(
            evolution.generator_policy,
            evolution.generation_jitter,
            Chord::new(melody.seed_chord),
            key,
        )
    }

    pub fn policy(&self) -> GeneratorPolicy {
        self.policy
    }

    pub fn jitter(&self) -> JitterRange {
        self.jitter
    }

    /// Reject settings that would make `generate` fail or panic part way
    /// through a population.
    pub fn validate(&self) -> Result<()> {
        match self.policy {
            GeneratorPolicy::Jitter => self.jitter.validate("generation_jitter"),
            GeneratorPolicy::KeySampling => self.sampling_key().map(|_| ()),
        }
    }

    /// One chord per melody slot.
    pub fn generate<R: Rng>(&self, melody: &QuantizedMelody, rng: &mut R) -> Result<Individual> {
        match self.policy {
            GeneratorPolicy::Jitter => self.jittered(melody, rng),
            GeneratorPolicy::KeySampling => self.key_sampled(melody, rng),
        }
    }

    pub fn populate<R: Rng>(&self, size: usize, melody: &QuantizedMelody, rng: &mut R) -> Result<Population> {
        let members = (0..size)
            .map(|_| self.generate(melody, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Population::new(members))
    }

    /// Onset beats get three notes scattered around `pitch - 24`; silent
    /// beats sustain the previous chord, starting from the seed chord.
    fn jittered<R: Rng>(&self, melody: &QuantizedMelody, rng: &mut R) -> Result<Individual> {
        self.jitter.validate("generation_jitter")?;
        let mut previous = self.seed_chord;
        let chords = melody
            .slots()
            .iter()
            .map(|&pitch| {
                if pitch != 0 {
                    let base = pitch - ACCOMPANIMENT_DROP;
                    previous = Chord::new([
                        base + self.jitter.sample(rng),
                        base + self.jitter.sample(rng),
                        base + self.jitter.sample(rng),
                    ]);
                }
                previous
            })
            .collect();
        Ok(Individual::new(chords))
    }

    /// Three distinct key pitches for every beat, silent or not.
    fn key_sampled<R: Rng>(&self, melody: &QuantizedMelody, rng: &mut R) -> Result<Individual> {
        let key = self.sampling_key()?;

        let chords = (0..melody.len())
            .map(|_| {
                let mut notes = [0; 3];
                for (slot, &pitch) in notes.iter_mut().zip(key.pitches().choose_multiple(rng, 3)) {
                    *slot = pitch;
                }
                Chord::new(notes)
            })
            .collect();
        Ok(Individual::new(chords))
    }

    fn sampling_key(&self) -> Result<&Key> {
        self.key.as_ref().filter(|k| k.len() >= 3).ok_or_else(|| {
            AccompanistError::Configuration(
                "key sampling needs a key with at least three pitches".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn c_major() -> Key {
        Key::new(vec![36, 38, 40, 41, 43, 45, 47, 48])
    }

    fn jitter_generator() -> IndividualGenerator {
        IndividualGenerator::new(
            GeneratorPolicy::Jitter,
            JitterRange::new(-7, 7),
            Chord::new([60, 64, 67]),
            None,
        )
    }

    #[test]
    fn test_jitter_sustains_silent_beats() {
        let melody = QuantizedMelody::new(vec![0, 60, 0, 64]);
        let mut rng = StdRng::seed_from_u64(11);
        let individual = jitter_generator().generate(&melody, &mut rng).unwrap();

        assert_eq!(individual.len(), 4);
        assert_eq!(individual.chords()[0], Chord::new([60, 64, 67]));
        assert_eq!(individual.chords()[2], individual.chords()[1]);
        let jitter = JitterRange::new(-7, 7);
        for note in individual.chords()[1].iter() {
            assert!(jitter.contains(note - 36), "note {} outside 60-24 +/- 7", note);
        }
        for note in individual.chords()[3].iter() {
            assert!(jitter.contains(note - 40), "note {} outside 64-24 +/- 7", note);
        }
    }

    #[test]
    fn test_key_sampling_uses_distinct_key_pitches() {
        let generator = IndividualGenerator::new(
            GeneratorPolicy::KeySampling,
            JitterRange::new(-7, 7),
            Chord::new([60, 64, 67]),
            Some(c_major()),
        );
        let melody = QuantizedMelody::new(vec![0, 60, 0, 64, 65]);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let individual = generator.generate(&melody, &mut rng).unwrap();
            assert_eq!(individual.len(), 5);
            for chord in individual.chords() {
                let [a, b, c] = chord.notes();
                assert!(a < b && b < c, "{} is not three distinct sorted notes", chord);
                assert!(chord.iter().all(|n| c_major().contains(n)));
            }
        }
    }

    #[test]
    fn test_key_sampling_without_key_fails() {
        let generator = IndividualGenerator::new(
            GeneratorPolicy::KeySampling,
            JitterRange::new(-7, 7),
            Chord::new([60, 64, 67]),
            Some(Key::new(vec![36, 38])),
        );
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            generator.generate(&QuantizedMelody::new(vec![60]), &mut rng),
            Err(AccompanistError::Configuration(_))
        ));
    }

    #[test]
    fn test_populate_size_and_length() {
        let melody = QuantizedMelody::new(vec![62, 0, 65, 67, 0]);
        let mut rng = StdRng::seed_from_u64(3);
        let population = jitter_generator().populate(12, &melody, &mut rng).unwrap();
        assert_eq!(population.size(), 12);
        assert!(population.iter().all(|i| i.len() == melody.len()));
    }

    #[test]
    fn test_empty_melody_gives_empty_individuals() {
        let mut rng = StdRng::seed_from_u64(3);
        let population = jitter_generator()
            .populate(10, &QuantizedMelody::default(), &mut rng)
            .unwrap();
        assert!(population.iter().all(|i| i.is_empty()));
    }

    #[test]
    fn test_inverted_jitter_is_an_error() {
        let generator = IndividualGenerator::new(
            GeneratorPolicy::Jitter,
            JitterRange::new(3, -3),
            Chord::new([60, 64, 67]),
            None,
        );
        assert!(matches!(generator.validate(), Err(AccompanistError::Configuration(_))));
        let mut rng = StdRng::seed_from_u64(9);
        assert!(matches!(
            generator.generate(&QuantizedMelody::new(vec![60, 0, 62]), &mut rng),
            Err(AccompanistError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_checks_the_active_policy() {
        assert!(jitter_generator().validate().is_ok());

        let sampling = |key| {
            IndividualGenerator::new(
                GeneratorPolicy::KeySampling,
                JitterRange::new(3, -3),
                Chord::new([60, 64, 67]),
                key,
            )
        };
        // the jitter range is unused under key sampling
        assert!(sampling(Some(c_major())).validate().is_ok());
        assert!(sampling(None).validate().is_err());
    }
}
