pub mod connectors;
pub mod key;
pub mod quantizer;
pub mod renderer;

pub use connectors::{MelodySource, MidiConnector};
pub use key::{Key, ScaleMode};
pub use quantizer::quantize;
pub use renderer::{render_accompaniment, ChordEvent, ChordEventKind};
