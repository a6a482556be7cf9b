use crate::config::BoundaryPolicy;
use crate::error::{AccompanistError, Result};
use crate::types::{MelodyEvent, MelodyEventKind, QuantizedMelody};

/// Total length of the melody in ticks.
pub fn melody_duration(events: &[MelodyEvent]) -> u64 {
    events.iter().map(|e| e.delta as u64).sum()
}

/// Number of beat slots for a melody of `duration` ticks.
pub fn slot_count(duration: u64, ticks_per_beat: u32, boundary: BoundaryPolicy) -> usize {
    let tpb = ticks_per_beat as u64;
    let slots = match boundary {
        BoundaryPolicy::Inclusive => duration / tpb + 1,
        BoundaryPolicy::Exclusive => duration.div_ceil(tpb),
    };
    slots as usize
}

/// Reduce a melody to one reference pitch per beat.
///
/// The first onset inside a beat wins; beats without an onset stay at 0.
/// An onset landing exactly on the closing boundary has no slot under
/// [`BoundaryPolicy::Exclusive`] and is dropped.
pub fn quantize(
    events: &[MelodyEvent],
    ticks_per_beat: u32,
    boundary: BoundaryPolicy,
) -> Result<QuantizedMelody> {
    if ticks_per_beat == 0 {
        return Err(AccompanistError::InvalidMelody(
            "ticks per beat must be positive".to_string(),
        ));
    }

    let duration = melody_duration(events);
    let mut slots = vec![0; slot_count(duration, ticks_per_beat, boundary)];

    let mut current_time: u64 = 0;
    for event in events {
        current_time += event.delta as u64;
        let MelodyEventKind::Onset(pitch) = event.kind else {
            continue;
        };
        let beat = (current_time / ticks_per_beat as u64) as usize;
        match slots.get_mut(beat) {
            Some(slot) if *slot == 0 => *slot = pitch,
            Some(_) => {}
            None => log::debug!(
                "Dropping onset {} at tick {}: past the last beat slot",
                pitch,
                current_time
            ),
        }
    }

    Ok(QuantizedMelody::new(slots))
}
