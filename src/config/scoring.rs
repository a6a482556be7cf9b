use super::traits::ConfigSection;
use crate::error::AccompanistError;
use crate::types::FitnessScore;
use serde::{Deserialize, Serialize};

/// Largest accepted weight. Keeps a full population's fitness sum far from
/// `u64::MAX` for any realistic melody length.
pub const MAX_WEIGHT: FitnessScore = 1_000_000;

/// Weights of the four chord scoring terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Per gap wider than a semitone.
    pub weak: FitnessScore,
    /// Triad spacing reward, applied according to `triad_rule`.
    pub medium: FitnessScore,
    /// Per note inside the diatonic scales anchored two octaves below the melody pitch.
    pub strong: FitnessScore,
    /// Per note inside the global key. Must dominate the local terms for the
    /// population to converge on the key.
    pub key_match: FitnessScore,
    pub triad_rule: TriadRule,
}

/// How triad spacing (3+4 or 4+3 semitones) is rewarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriadRule {
    /// One `medium` award per spacing pattern, only when both gaps match.
    Joint,
    /// One `medium` per matching gap of each pattern, plus one more when both match.
    Independent,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weak: 1,
            medium: 2,
            strong: 3,
            key_match: 100,
            triad_rule: TriadRule::Joint,
        }
    }
}

impl ConfigSection for ScoringConfig {
    fn section_name() -> &'static str {
        "scoring"
    }

    fn validate(&self) -> Result<(), AccompanistError> {
        if self.weak == 0 && self.medium == 0 && self.strong == 0 && self.key_match == 0 {
            return Err(AccompanistError::Configuration(
                "At least one scoring weight must be positive".to_string(),
            ));
        }
        for (name, weight) in [
            ("weak", self.weak),
            ("medium", self.medium),
            ("strong", self.strong),
            ("key_match", self.key_match),
        ] {
            if weight > MAX_WEIGHT {
                return Err(AccompanistError::Configuration(format!(
                    "{} weight {} exceeds the maximum of {}",
                    name, weight, MAX_WEIGHT
                )));
            }
        }
        if self.key_match > 0 && self.key_match <= self.strong {
            log::warn!(
                "key_match weight {} does not exceed strong weight {}; key fit will not dominate",
                self.key_match,
                self.strong
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_zero_weights_rejected() {
        let config = ScoringConfig {
            weak: 0,
            medium: 0,
            strong: 0,
            key_match: 0,
            triad_rule: TriadRule::Joint,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ScoringConfig = toml::from_str("key_match = 6\ntriad_rule = \"independent\"").unwrap();
        assert_eq!(config.key_match, 6);
        assert_eq!(config.weak, 1);
        assert_eq!(config.triad_rule, TriadRule::Independent);
    }

    #[test]
    fn test_huge_weight_rejected() {
        let config = ScoringConfig {
            key_match: 9_000_000_000_000_000_000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AccompanistError::Configuration(_))
        ));
        let at_limit = ScoringConfig {
            key_match: MAX_WEIGHT,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }
}
