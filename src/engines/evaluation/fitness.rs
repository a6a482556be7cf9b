use crate::config::{ScoringConfig, TriadRule};
use crate::data::key::{Key, ScaleMode};
use crate::engines::generation::population::Population;
use crate::types::{Chord, FitnessScore, Individual, PitchValue, QuantizedMelody};

const MINOR_TRIAD: (PitchValue, PitchValue) = (3, 4);
const MAJOR_TRIAD: (PitchValue, PitchValue) = (4, 3);

/// Interval between a melody pitch and the anchor of its local scale.
pub const LOCAL_SCALE_DROP: PitchValue = 24;

/// Scores chords against per-beat melody pitches and an optional global key.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    weights: ScoringConfig,
    key: Option<Key>,
}

impl FitnessEvaluator {
    /// An empty key disables key-aware scoring.
    pub fn new(weights: ScoringConfig, key: Option<Key>) -> Self {
        Self {
            weights,
            key: key.filter(|k| !k.is_empty()),
        }
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Score one chord against the melody pitch of its beat.
    ///
    /// Silent beats (`melody_pitch == 0`) are scored like any other slot,
    /// against the scales anchored at -24.
    pub fn chord_fitness(&self, chord: &Chord, melody_pitch: PitchValue) -> FitnessScore {
        let mut fitness = self
            .spacing_fitness(chord)
            .saturating_add(self.triad_fitness(chord))
            .saturating_add(self.local_scale_fitness(chord, melody_pitch));

        if let Some(key) = &self.key {
            let matches = chord.iter().filter(|&note| key.contains(note)).count() as FitnessScore;
            fitness = fitness.saturating_add(matches.saturating_mul(self.weights.key_match));
        }

        fitness
    }

    /// Sum of chord scores, slot by slot.
    pub fn individual_fitness(&self, individual: &Individual, melody: &QuantizedMelody) -> FitnessScore {
        debug_assert_eq!(individual.len(), melody.len());
        individual
            .chords()
            .iter()
            .zip(melody.slots())
            .map(|(chord, &pitch)| self.chord_fitness(chord, pitch))
            .fold(0, FitnessScore::saturating_add)
    }

    /// Fitness of every member, in population order.
    pub fn population_fitness(&self, population: &Population, melody: &QuantizedMelody) -> Vec<FitnessScore> {
        self.batch_fitness(population.members(), melody)
    }

    pub fn batch_fitness(&self, individuals: &[Individual], melody: &QuantizedMelody) -> Vec<FitnessScore> {
        individuals
            .iter()
            .map(|individual| self.individual_fitness(individual, melody))
            .collect()
    }

    fn spacing_fitness(&self, chord: &Chord) -> FitnessScore {
        let (lower, upper) = chord.gaps();
        let wide = [lower, upper].iter().filter(|&&gap| gap > 1).count() as FitnessScore;
        wide.saturating_mul(self.weights.weak)
    }

    fn triad_fitness(&self, chord: &Chord) -> FitnessScore {
        let gaps = chord.gaps();
        let medium = self.weights.medium;
        match self.weights.triad_rule {
            TriadRule::Joint => {
                let hits = [MINOR_TRIAD, MAJOR_TRIAD]
                    .iter()
                    .filter(|&&triad| gaps == triad)
                    .count() as FitnessScore;
                hits.saturating_mul(medium)
            }
            TriadRule::Independent => [MINOR_TRIAD, MAJOR_TRIAD]
                .iter()
                .map(|&(lower, upper)| {
                    let lower_hit = gaps.0 == lower;
                    let upper_hit = gaps.1 == upper;
                    let awards = lower_hit as FitnessScore
                        + upper_hit as FitnessScore
                        + (lower_hit && upper_hit) as FitnessScore;
                    awards.saturating_mul(medium)
                })
                .fold(0, FitnessScore::saturating_add),
        }
    }

    fn local_scale_fitness(&self, chord: &Chord, melody_pitch: PitchValue) -> FitnessScore {
        let anchor = melody_pitch - LOCAL_SCALE_DROP;
        let major = ScaleMode::Major.scale_from(anchor);
        let minor = ScaleMode::Minor.scale_from(anchor);
        let in_scale = chord
            .iter()
            .filter(|note| major.contains(note) || minor.contains(note))
            .count() as FitnessScore;
        in_scale.saturating_mul(self.weights.strong)
    }
}
