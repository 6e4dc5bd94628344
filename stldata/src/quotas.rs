use serde::{Deserialize, Serialize};

/// Budgets a bundle must exhaust exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quotas {
    /// Number of civic slots.
    pub max_civics: i32,
    /// Ethic points to spend.
    pub max_ethic_points: i32,
}

impl Default for Quotas {
    fn default() -> Self {
        Quotas {
            max_civics: 2,
            max_ethic_points: 3,
        }
    }
}
