use super::traits::ConfigSection;
use crate::error::AccompanistError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub channel: u8,
    pub velocity: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            velocity: 50,
        }
    }
}

impl ConfigSection for RenderConfig {
    fn section_name() -> &'static str {
        "render"
    }

    fn validate(&self) -> Result<(), AccompanistError> {
        if self.channel > 15 {
            return Err(AccompanistError::Configuration(
                "MIDI channel must be between 0 and 15".to_string(),
            ));
        }
        if self.velocity == 0 || self.velocity > 127 {
            return Err(AccompanistError::Configuration(
                "Velocity must be between 1 and 127".to_string(),
            ));
        }
        Ok(())
    }
}
