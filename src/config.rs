use serde::{Deserialize, Serialize};
use std::fs;

use crate::core_types::{Amount, DurationMs, ScopeId};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// Escrow engine policy knobs
    #[serde(default)]
    pub escrow: EscrowConfig,
}

/// Escrow engine policy configuration.
///
/// The three boolean flags settle behaviors the source designs disagreed
/// on; they are configuration on purpose, not code.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EscrowConfig {
    /// Ledger instance tag, bound into every derived identifier
    pub scope: ScopeId,
    /// Initial per-transfer fee
    pub fee: Amount,
    /// Minimum reclaim-eligibility duration (ms)
    pub min_duration_ms: DurationMs,
    /// Maximum reclaim-eligibility duration (ms)
    pub max_duration_ms: DurationMs,
    /// Permit configuring a zero fee
    #[serde(default)]
    pub allow_zero_fee: bool,
    /// Charge the fee a second time on the reclaim path
    #[serde(default)]
    pub charge_fee_on_reclaim: bool,
    /// Keep the read-only query surface available while paused
    #[serde(default = "default_true")]
    pub queries_while_paused: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            scope: 1,
            fee: 5,
            min_duration_ms: 3_600_000,            // 1 hour
            max_duration_ms: 30 * 86_400_000,      // 30 days
            allow_zero_fee: false,
            charge_fee_on_reclaim: false,
            queries_while_paused: true,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
