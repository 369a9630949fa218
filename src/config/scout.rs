// src/config/scout.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, time::Duration};

pub const ENV_SCOUT_CONFIG_PATH: &str = "SCOUT_CONFIG_PATH";
pub const DEFAULT_SCOUT_CONFIG_PATH: &str = "config/scout.json";
pub const ENV_SCOUT_API_KEY: &str = "SCOUT_API_KEY";

pub const DEFAULT_ENDPOINT: &str = "https://mino.ai/v1/automation/run-sse";
pub const DEFAULT_TIMEOUT_SECS: u64 = 28;

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    concat!("delay-risk-scout/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// SSE endpoint of the hosted agent API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// "ENV" means: read from SCOUT_API_KEY.
    #[serde(default)]
    pub api_key: String,
    /// Per-source time budget.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ScoutConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: ScoutConfig = serde_json::from_str(data)?;

        // Resolve api key if "ENV"
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env::var(ENV_SCOUT_API_KEY)
                .map_err(|_| anyhow::anyhow!("Missing {ENV_SCOUT_API_KEY} env var"))?;
        }

        // Sanitize
        cfg.endpoint = cfg.endpoint.trim().to_string();
        if cfg.endpoint.is_empty() {
            cfg.endpoint = default_endpoint();
        }
        if cfg.timeout_secs == 0 {
            cfg.timeout_secs = default_timeout_secs();
        }

        Ok(cfg)
    }

    /// $SCOUT_CONFIG_PATH, then config/scout.json, then defaults.
    /// Without a file the API key still comes from SCOUT_API_KEY when set.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = env::var(ENV_SCOUT_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCOUT_CONFIG_PATH));
        if path.exists() {
            return Self::load_from_file(&path);
        }
        Ok(Self {
            api_key: env::var(ENV_SCOUT_API_KEY).unwrap_or_default(),
            ..Self::default()
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
