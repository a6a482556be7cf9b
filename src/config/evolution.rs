use super::traits::ConfigSection;
use crate::error::AccompanistError;
use crate::types::PitchValue;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest population for which roulette selection still means something.
pub const MIN_POPULATION_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub offspring_per_generation: usize,
    pub replaced_per_generation: usize,
    /// Per-note delta applied by mutation.
    pub mutation_jitter: JitterRange,
    /// Per-note offset around `reference - 24` used by the jitter generator.
    pub generation_jitter: JitterRange,
    pub generator_policy: GeneratorPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// How the initial population is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorPolicy {
    /// Notes scattered around two octaves below each onset; silent beats sustain.
    Jitter,
    /// Three distinct key pitches per beat, melody ignored.
    KeySampling,
}

/// Inclusive integer range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterRange {
    pub low: PitchValue,
    pub high: PitchValue,
}

impl JitterRange {
    pub const fn new(low: PitchValue, high: PitchValue) -> Self {
        Self { low, high }
    }

    /// Callers check [`JitterRange::validate`] first; an inverted range panics.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> PitchValue {
        rng.gen_range(self.low..=self.high)
    }

    pub fn contains(&self, value: PitchValue) -> bool {
        (self.low..=self.high).contains(&value)
    }

    pub fn validate(&self, field: &str) -> Result<(), AccompanistError> {
        if self.low > self.high {
            return Err(AccompanistError::Configuration(format!(
                "{} range is empty: low {} > high {}",
                field, self.low, self.high
            )));
        }
        Ok(())
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            generations: 10,
            offspring_per_generation: 5,
            replaced_per_generation: 3,
            mutation_jitter: JitterRange::new(-2, 5),
            generation_jitter: JitterRange::new(-7, 7),
            generator_policy: GeneratorPolicy::Jitter,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), AccompanistError> {
        if self.population_size < MIN_POPULATION_SIZE {
            return Err(AccompanistError::Configuration(format!(
                "Population size must be at least {}",
                MIN_POPULATION_SIZE
            )));
        }
        if self.offspring_per_generation == 0 {
            return Err(AccompanistError::Configuration(
                "At least one offspring per generation is required".to_string(),
            ));
        }
        if self.replaced_per_generation > self.offspring_per_generation {
            return Err(AccompanistError::Configuration(format!(
                "Cannot replace {} parents with only {} offspring per generation",
                self.replaced_per_generation, self.offspring_per_generation
            )));
        }
        if self.replaced_per_generation > self.population_size {
            return Err(AccompanistError::Configuration(format!(
                "Cannot replace {} parents in a population of {}",
                self.replaced_per_generation, self.population_size
            )));
        }
        self.mutation_jitter.validate("mutation_jitter")?;
        self.generation_jitter.validate("generation_jitter")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_small_population_rejected() {
        let config = EvolutionConfig {
            population_size: 9,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AccompanistError::Configuration(_))
        ));
    }

    #[test]
    fn test_replacing_more_than_offspring_rejected() {
        let config = EvolutionConfig {
            offspring_per_generation: 2,
            replaced_per_generation: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AccompanistError::Configuration(_))
        ));
    }

    #[test]
    fn test_inverted_jitter_rejected() {
        let config = EvolutionConfig {
            mutation_jitter: JitterRange::new(3, -3),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_serialized_snake_case() {
        let json = serde_json::to_string(&GeneratorPolicy::KeySampling).unwrap();
        assert_eq!(json, "\"key_sampling\"");
    }
}
