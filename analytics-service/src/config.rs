use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Trailing window for `detailed` switching analyses, in days.
    #[serde(default = "default_detailed_window_days")]
    pub detailed_window_days: i64,
    /// Bound on `history` reads.
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detailed_window_days: default_detailed_window_days(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_detailed_window_days() -> i64 {
    90
}

fn default_history_limit() -> i64 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("ANALYTICS_CONFIG").unwrap_or_else(|_| "analytics-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}
