mod midi;

pub use midi::{MelodySource, MidiConnector};
