use crate::config::RenderConfig;
use crate::types::Individual;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordEventKind {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8 },
}

/// Timed accompaniment event; `delta` is in ticks since the previous event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordEvent {
    pub delta: u32,
    pub kind: ChordEventKind,
}

/// Turn a chord sequence into note-on/note-off pairs, one chord per beat.
///
/// Chords with a note outside the MIDI key range are not played; their beat
/// becomes silence so the following chords stay aligned with the melody.
pub fn render_accompaniment(
    individual: &Individual,
    ticks_per_beat: u32,
    config: &RenderConfig,
) -> Vec<ChordEvent> {
    let mut events = Vec::with_capacity(individual.len() * 6);
    let mut pending_rest: u32 = 0;

    for (beat, chord) in individual.chords().iter().enumerate() {
        if !chord.is_renderable() {
            log::warn!("Skipping unplayable chord {} at beat {}", chord, beat);
            pending_rest += ticks_per_beat;
            continue;
        }

        for (i, note) in chord.iter().enumerate() {
            events.push(ChordEvent {
                delta: if i == 0 { pending_rest } else { 0 },
                kind: ChordEventKind::NoteOn {
                    key: note as u8,
                    velocity: config.velocity,
                },
            });
        }
        pending_rest = 0;

        for (i, note) in chord.iter().enumerate() {
            events.push(ChordEvent {
                delta: if i == 0 { ticks_per_beat } else { 0 },
                kind: ChordEventKind::NoteOff { key: note as u8 },
            });
        }
    }

    events
}
