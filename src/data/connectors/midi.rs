use crate::config::{MelodyConfig, RenderConfig};
use crate::data::renderer::{ChordEvent, ChordEventKind};
use crate::error::{AccompanistError, Result};
use crate::types::{MelodyEvent, MelodyEventKind, PitchValue};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u28, u4, u7},
};
use std::path::Path;

/// Melody track extracted from a Standard MIDI File.
#[derive(Debug, Clone)]
pub struct MelodySource {
    pub ticks_per_beat: u32,
    pub events: Vec<MelodyEvent>,
    pub lowest_pitch: Option<PitchValue>,
    pub melody_track: usize,
    pub track_count: usize,
}

pub struct MidiConnector;

impl MidiConnector {
    /// Read the melody track of a MIDI file.
    pub fn load_melody<P: AsRef<Path>>(path: P, config: &MelodyConfig) -> Result<MelodySource> {
        let bytes = std::fs::read(path.as_ref())?;
        let source = Self::parse_melody(&bytes, config)?;
        log::info!(
            "Loaded {}: track {} of {}, {} events, {} ticks per beat",
            path.as_ref().display(),
            source.melody_track,
            source.track_count,
            source.events.len(),
            source.ticks_per_beat
        );
        Ok(source)
    }

    pub fn parse_melody(bytes: &[u8], config: &MelodyConfig) -> Result<MelodySource> {
        let smf = Smf::parse(bytes)
            .map_err(|e| AccompanistError::MidiParse(format!("Failed to read MIDI: {}", e)))?;
        let ticks_per_beat = Self::ticks_per_beat(&smf.header)?;
        let melody_track = Self::select_track(&smf, config)?;

        let events: Vec<MelodyEvent> = smf.tracks[melody_track]
            .iter()
            .map(|event| {
                let delta = event.delta.as_int();
                match event.kind {
                    // NoteOn with velocity 0 is the running-status form of NoteOff
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { key, vel },
                        ..
                    } if vel.as_int() > 0 => MelodyEvent::onset(delta, key.as_int() as PitchValue),
                    _ => MelodyEvent::other(delta),
                }
            })
            .collect();

        let lowest_pitch = events
            .iter()
            .filter_map(|e| match e.kind {
                MelodyEventKind::Onset(pitch) => Some(pitch),
                MelodyEventKind::Other => None,
            })
            .min();

        Ok(MelodySource {
            ticks_per_beat,
            events,
            lowest_pitch,
            melody_track,
            track_count: smf.tracks.len(),
        })
    }

    /// Build a new file holding the conductor track (when the melody was not
    /// track 0), the untouched melody track and the accompaniment track.
    pub fn build_accompaniment(
        source_bytes: &[u8],
        source: &MelodySource,
        chords: &[ChordEvent],
        render: &RenderConfig,
    ) -> Result<Vec<u8>> {
        let smf = Smf::parse(source_bytes)
            .map_err(|e| AccompanistError::MidiParse(format!("Failed to read MIDI: {}", e)))?;
        let melody = smf.tracks.get(source.melody_track).ok_or_else(|| {
            AccompanistError::UnsupportedMidi(format!(
                "melody track {} missing from source file",
                source.melody_track
            ))
        })?;

        let mut out = Smf::new(Header::new(Format::Parallel, smf.header.timing));
        if source.melody_track > 0 {
            out.tracks.push(smf.tracks[0].clone());
        }
        out.tracks.push(melody.clone());
        out.tracks.push(Self::chord_track(melody, chords, render)?);

        let mut buf = Vec::new();
        out.write(&mut buf)
            .map_err(|e| AccompanistError::Render(format!("Failed to encode MIDI: {}", e)))?;
        Ok(buf)
    }

    pub fn write_accompaniment<P: AsRef<Path>, Q: AsRef<Path>>(
        source_path: P,
        source: &MelodySource,
        chords: &[ChordEvent],
        render: &RenderConfig,
        out_path: Q,
    ) -> Result<()> {
        let source_bytes = std::fs::read(source_path)?;
        let buf = Self::build_accompaniment(&source_bytes, source, chords, render)?;
        std::fs::write(out_path.as_ref(), &buf)?;
        log::info!(
            "Wrote {} bytes to {}",
            buf.len(),
            out_path.as_ref().display()
        );
        Ok(())
    }

    fn ticks_per_beat(header: &Header) -> Result<u32> {
        match header.timing {
            Timing::Metrical(ticks) if ticks.as_int() > 0 => Ok(ticks.as_int() as u32),
            Timing::Metrical(_) => Err(AccompanistError::UnsupportedMidi(
                "zero ticks per beat".to_string(),
            )),
            Timing::Timecode(..) => Err(AccompanistError::UnsupportedMidi(
                "timecode (SMPTE) timing has no beat grid".to_string(),
            )),
        }
    }

    fn select_track(smf: &Smf, config: &MelodyConfig) -> Result<usize> {
        let track_count = smf.tracks.len();
        let index = config
            .melody_track
            .unwrap_or(if track_count > 1 { 1 } else { 0 });
        if index >= track_count {
            return Err(AccompanistError::UnsupportedMidi(format!(
                "melody track {} requested but file has {} track(s)",
                index, track_count
            )));
        }
        Ok(index)
    }

    fn chord_track<'a>(
        melody: &Track<'a>,
        chords: &[ChordEvent],
        render: &RenderConfig,
    ) -> Result<Track<'a>> {
        let channel = u4::try_from(render.channel).ok_or_else(|| {
            AccompanistError::Render(format!("invalid MIDI channel {}", render.channel))
        })?;

        // Leading metadata (track name, instrument, ...) is shared with the melody
        let mut track: Track<'a> = melody
            .iter()
            .take_while(|e| e.delta.as_int() == 0 && matches!(e.kind, TrackEventKind::Meta(_)))
            .filter(|e| !matches!(e.kind, TrackEventKind::Meta(MetaMessage::EndOfTrack)))
            .cloned()
            .collect();

        for event in chords {
            let message = match event.kind {
                ChordEventKind::NoteOn { key, velocity } => MidiMessage::NoteOn {
                    key: Self::u7(key)?,
                    vel: Self::u7(velocity)?,
                },
                ChordEventKind::NoteOff { key } => MidiMessage::NoteOff {
                    key: Self::u7(key)?,
                    vel: u7::new(0),
                },
            };
            let delta = u28::try_from(event.delta).ok_or_else(|| {
                AccompanistError::Render(format!("delta {} does not fit a MIDI event", event.delta))
            })?;
            track.push(TrackEvent {
                delta,
                kind: TrackEventKind::Midi { channel, message },
            });
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        Ok(track)
    }

    fn u7(value: u8) -> Result<u7> {
        u7::try_from(value)
            .ok_or_else(|| AccompanistError::Render(format!("{} exceeds the MIDI data range", value)))
    }
}
