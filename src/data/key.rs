use crate::types::PitchValue;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Major or natural minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    Major,
    Minor,
}

impl ScaleMode {
    /// Semitone offsets from the tonic, octave included.
    pub fn offsets(self) -> [PitchValue; 8] {
        match self {
            ScaleMode::Major => [0, 2, 4, 5, 7, 9, 11, 12],
            ScaleMode::Minor => [0, 2, 3, 5, 7, 8, 10, 12],
        }
    }

    /// The eight scale pitches starting at `anchor`.
    pub fn scale_from(self, anchor: PitchValue) -> [PitchValue; 8] {
        self.offsets().map(|offset| anchor + offset)
    }
}

impl FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" | "ionian" => Ok(ScaleMode::Major),
            "minor" | "aeolian" => Ok(ScaleMode::Minor),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// Ordered, duplicate-free set of pitches the accompaniment should stay in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key {
    pitches: Vec<PitchValue>,
}

impl Key {
    /// Wrap an already computed pitch set.
    pub fn new(mut pitches: Vec<PitchValue>) -> Self {
        pitches.sort_unstable();
        pitches.dedup();
        Self { pitches }
    }

    /// Scale of `mode` on `tonic_pc`, placed two octaves below the octave of
    /// the melody's lowest note.
    pub fn from_tonic(tonic_pc: u8, mode: ScaleMode, lowest_note: PitchValue) -> Self {
        let octave = lowest_note.div_euclid(12);
        let first = (octave - 2) * 12 + (tonic_pc % 12) as PitchValue;
        Self::new(mode.scale_from(first).to_vec())
    }

    pub fn pitches(&self) -> &[PitchValue] {
        &self.pitches
    }

    pub fn contains(&self, pitch: PitchValue) -> bool {
        self.pitches.binary_search(&pitch).is_ok()
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

/// Parse a tonic name such as `C`, `F#`, `Bb` or `eb` into a pitch class.
pub fn parse_pitch_class(name: &str) -> Option<u8> {
    let mut chars = name.trim().chars();
    let natural = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let mut pc: i32 = natural;
    for accidental in chars {
        match accidental {
            '#' => pc += 1,
            'b' => pc -= 1,
            _ => return None,
        }
    }
    Some(pc.rem_euclid(12) as u8)
}
