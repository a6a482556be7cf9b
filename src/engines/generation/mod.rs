pub mod evolution_engine;
pub mod generator;
pub mod operators;
pub mod population;
pub mod progress;

pub use evolution_engine::{
    EvolutionEngine, EvolutionOutcome, EvolutionPhase, GenerationStats, ProgressCallback, RunReport,
};
pub use generator::IndividualGenerator;
pub use population::Population;
pub use progress::{ConsoleProgressCallback, RecordingProgressCallback, SilentProgressCallback};
