use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccompanistError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid population state: {0}")]
    InvalidPopulationState(String),

    #[error("Insufficient offspring: {requested} replacements requested, {available} offspring available")]
    InsufficientOffspring { requested: usize, available: usize },

    #[error("Invalid melody: {0}")]
    InvalidMelody(String),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error("Unsupported MIDI: {0}")]
    UnsupportedMidi(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AccompanistError>;
