pub mod traits;
pub mod evolution;
pub mod scoring;
pub mod melody;
pub mod render;
pub mod manager;

pub use manager::AppConfig;
pub use evolution::{EvolutionConfig, GeneratorPolicy, JitterRange};
pub use scoring::{ScoringConfig, TriadRule};
pub use melody::{BoundaryPolicy, MelodyConfig};
pub use render::RenderConfig;
pub use traits::ConfigSection;
