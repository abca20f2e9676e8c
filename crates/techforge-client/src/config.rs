use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Endpoints and socket tuning. Every value has a CLI flag; the two endpoints
/// can also come from the environment.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the catalog API (`<api>/tech_tree/<ship>`, `<api>/platforms`)
    #[arg(long, env = "TECHFORGE_API_URL", default_value = "http://localhost:8016/api/")]
    pub api_url: String,

    /// Solver address, `host:port`
    #[arg(long, env = "TECHFORGE_SOLVER_ADDR", default_value = "127.0.0.1:8016")]
    pub solver_addr: String,

    #[arg(long, default_value_t = 5)]
    pub reconnection_attempts: u32,
    #[arg(long, default_value_t = 1_000)]
    pub reconnection_delay_ms: u64,
    #[arg(long, default_value_t = 5_000)]
    pub reconnection_delay_max_ms: u64,
    #[arg(long, default_value_t = 20_000)]
    pub connect_timeout_ms: u64,
    #[arg(long, default_value_t = 10_000)]
    pub catalog_timeout_ms: u64,

    /// Give up on an optimization after this long without a frame from the solver
    #[arg(long, default_value_t = 120_000)]
    pub optimize_idle_timeout_ms: u64,

    /// Ask the solver to stream best-so-far grids with its progress
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub send_grid_updates: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8016/api/".to_string(),
            solver_addr: "127.0.0.1:8016".to_string(),
            reconnection_attempts: 5,
            reconnection_delay_ms: 1_000,
            reconnection_delay_max_ms: 5_000,
            connect_timeout_ms: 20_000,
            catalog_timeout_ms: 10_000,
            optimize_idle_timeout_ms: 120_000,
            send_grid_updates: true,
        }
    }
}

impl ClientConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(&path).map_err(|e| format!("Failed to read config file: {}", e))?;
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config JSON: {}", e))
    }

    pub fn reconnection_delay(&self) -> Duration {
        Duration::from_millis(self.reconnection_delay_ms)
    }

    pub fn reconnection_delay_max(&self) -> Duration {
        Duration::from_millis(self.reconnection_delay_max_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }

    pub fn optimize_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.optimize_idle_timeout_ms)
    }
}
