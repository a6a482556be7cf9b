use super::traits::ConfigSection;
use crate::error::AccompanistError;
use crate::types::PitchValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyConfig {
    pub boundary: BoundaryPolicy,
    /// Track holding the melody. When unset, track 1 is used for multi-track
    /// files (track 0 being the conductor track) and track 0 otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melody_track: Option<usize>,
    /// Chord sustained by the jitter generator before the first onset.
    pub seed_chord: [PitchValue; 3],
}

/// Whether a melody whose length is an exact multiple of the beat gets an
/// extra slot for the closing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// `duration / ticks_per_beat + 1` slots.
    Inclusive,
    /// `ceil(duration / ticks_per_beat)` slots.
    Exclusive,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::Inclusive,
            melody_track: None,
            seed_chord: [60, 64, 67],
        }
    }
}

impl ConfigSection for MelodyConfig {
    fn section_name() -> &'static str {
        "melody"
    }

    fn validate(&self) -> Result<(), AccompanistError> {
        if self.seed_chord.iter().any(|p| !(0..=127).contains(p)) {
            return Err(AccompanistError::Configuration(format!(
                "Seed chord {:?} is outside the MIDI key range",
                self.seed_chord
            )));
        }
        Ok(())
    }
}
