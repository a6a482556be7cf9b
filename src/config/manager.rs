use super::{
    evolution::EvolutionConfig,
    melody::MelodyConfig,
    render::RenderConfig,
    scoring::ScoringConfig,
    traits::ConfigSection,
};
use crate::error::AccompanistError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `ACCOMPANIST__EVOLUTION__GENERATIONS=50`.
pub const ENV_PREFIX: &str = "ACCOMPANIST";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub scoring: ScoringConfig,
    pub melody: MelodyConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), AccompanistError> {
        validate_section(&self.evolution)?;
        validate_section(&self.scoring)?;
        validate_section(&self.melody)?;
        validate_section(&self.render)?;
        Ok(())
    }

    /// Load a TOML file, layer environment overrides on top, then validate.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AccompanistError> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        let builder = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    /// Parse TOML text with the same layering as [`AppConfig::load_from_file`].
    pub fn from_toml_str(contents: &str) -> Result<Self, AccompanistError> {
        let builder = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AccompanistError> {
        let config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AccompanistError::Configuration(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, AccompanistError> {
        toml::to_string_pretty(self)
            .map_err(|e| AccompanistError::Configuration(format!("Failed to serialize: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), AccompanistError> {
        let toml_str = self.to_toml_string()?;

        std::fs::write(path, toml_str)
            .map_err(|e| AccompanistError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}

/// Tag configuration errors with the TOML table they came from.
fn validate_section<S: ConfigSection>(section: &S) -> Result<(), AccompanistError> {
    section.validate().map_err(|e| match e {
        AccompanistError::Configuration(msg) => {
            AccompanistError::Configuration(format!("[{}] {}", S::section_name(), msg))
        }
        other => other,
    })
}
