use std::env;
use std::time::Duration;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub panel_config: String,
    pub default_params: String,
    pub xip_reference: String,
    pub scorpion_timeout_secs: u64,
    pub xip_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            panel_config: get_env("PANEL_CONFIG", "/app/config/config.json"),
            default_params: get_env("DEFAULT_PARAMS", "/app/config/default_params.json"),
            xip_reference: get_env("XIP_REFERENCE", "/app/config/xip3901_parameters_reference.json"),
            scorpion_timeout_secs: get_env("SCORPION_TIMEOUT_SECS", "2")
                .parse()
                .unwrap_or(2),
            xip_timeout_secs: get_env("XIP_TIMEOUT_SECS", "3")
                .parse()
                .unwrap_or(3),
        }
    }

    pub fn scorpion_timeout(&self) -> Duration {
        Duration::from_secs(self.scorpion_timeout_secs)
    }

    pub fn xip_timeout(&self) -> Duration {
        Duration::from_secs(self.xip_timeout_secs)
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
