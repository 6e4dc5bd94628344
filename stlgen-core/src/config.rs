use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use stldata::Quotas;

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub quotas: Quotas,
    /// Fresh search roots tried before giving up.
    pub max_attempts: u32,
    /// Search steps allowed per attempt.
    pub max_steps: u32,
    /// Fixed seed for reproducible runs. Drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            quotas: Quotas::default(),
            max_attempts: 25,
            max_steps: 20_000,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.max_attempts == 0 {
            return Err(GenerateError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(GenerateError::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }
        if self.quotas.max_civics <= 0 || self.quotas.max_ethic_points <= 0 {
            return Err(GenerateError::InvalidConfig(format!(
                "quotas must be positive, got {} civics and {} ethic points",
                self.quotas.max_civics, self.quotas.max_ethic_points
            )));
        }
        Ok(())
    }
}
