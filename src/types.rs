use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic pitch. Only checked against the MIDI byte range at render time,
/// so chords may wander below 0 or above 127 during the search.
pub type PitchValue = i32;

/// Heuristic score of a chord or individual. Higher is better; only
/// comparable between candidates scored against the same melody and key.
pub type FitnessScore = u64;

/// Three pitches kept in ascending order.
///
/// Every constructor and every transformation re-sorts, so
/// `notes()[0] <= notes()[1] <= notes()[2]` holds for any `Chord` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[PitchValue; 3]", into = "[PitchValue; 3]")]
pub struct Chord {
    notes: [PitchValue; 3],
}

impl Chord {
    pub fn new(mut notes: [PitchValue; 3]) -> Self {
        notes.sort_unstable();
        Self { notes }
    }

    pub fn notes(&self) -> [PitchValue; 3] {
        self.notes
    }

    pub fn lowest(&self) -> PitchValue {
        self.notes[0]
    }

    pub fn highest(&self) -> PitchValue {
        self.notes[2]
    }

    /// Semitone gaps (middle - lowest, highest - middle).
    pub fn gaps(&self) -> (PitchValue, PitchValue) {
        (self.notes[1] - self.notes[0], self.notes[2] - self.notes[1])
    }

    /// Add one delta per note and re-sort.
    pub fn shifted(&self, deltas: [PitchValue; 3]) -> Self {
        Self::new([
            self.notes[0] + deltas[0],
            self.notes[1] + deltas[1],
            self.notes[2] + deltas[2],
        ])
    }

    /// True when every note fits a MIDI key number.
    pub fn is_renderable(&self) -> bool {
        self.lowest() >= 0 && self.highest() <= 127
    }

    pub fn iter(&self) -> impl Iterator<Item = PitchValue> + '_ {
        self.notes.iter().copied()
    }
}

impl From<[PitchValue; 3]> for Chord {
    fn from(notes: [PitchValue; 3]) -> Self {
        Chord::new(notes)
    }
}

impl From<Chord> for [PitchValue; 3] {
    fn from(chord: Chord) -> Self {
        chord.notes
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.notes[0], self.notes[1], self.notes[2])
    }
}

/// One full accompaniment candidate: one chord per beat slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Individual {
    chords: Vec<Chord>,
}

impl Individual {
    pub fn new(chords: Vec<Chord>) -> Self {
        Self { chords }
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn chord(&self, slot: usize) -> Option<&Chord> {
        self.chords.get(slot)
    }

    /// Replace the chord at `slot`, returning the old one.
    pub fn set_chord(&mut self, slot: usize, chord: Chord) -> Option<Chord> {
        self.chords
            .get_mut(slot)
            .map(|existing| std::mem::replace(existing, chord))
    }
}

impl From<Vec<Chord>> for Individual {
    fn from(chords: Vec<Chord>) -> Self {
        Individual::new(chords)
    }
}

/// Per-beat reference pitches. `0` marks a beat with no new onset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuantizedMelody {
    slots: Vec<PitchValue>,
}

impl QuantizedMelody {
    pub fn new(slots: Vec<PitchValue>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[PitchValue] {
        &self.slots
    }

    pub fn onset_count(&self) -> usize {
        self.slots.iter().filter(|&&p| p != 0).count()
    }
}

impl From<Vec<PitchValue>> for QuantizedMelody {
    fn from(slots: Vec<PitchValue>) -> Self {
        QuantizedMelody::new(slots)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MelodyEventKind {
    Onset(PitchValue),
    Other,
}

/// A melody track event: delta ticks since the previous event plus its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MelodyEvent {
    pub delta: u32,
    pub kind: MelodyEventKind,
}

impl MelodyEvent {
    pub fn onset(delta: u32, pitch: PitchValue) -> Self {
        Self {
            delta,
            kind: MelodyEventKind::Onset(pitch),
        }
    }

    pub fn other(delta: u32) -> Self {
        Self {
            delta,
            kind: MelodyEventKind::Other,
        }
    }
}
