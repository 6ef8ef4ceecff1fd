//! Configuration management: built-in defaults, optional TOML file, then environment

use crate::scoring::DEFAULT_MAE;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, read only if it exists
pub const DEFAULT_CONFIG_PATH: &str = "config/clvforge.toml";

/// Prefix for environment overrides, e.g. `CLVFORGE__SCORING__MAE=80`
pub const ENV_PREFIX: &str = "CLVFORGE";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub scoring: ScoringConfig,
    pub charts: ChartConfig,
    pub logging: LoggingConfig,
}

/// Model artifact location
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the JSON model artifact
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/clv_model.json"),
        }
    }
}

/// Confidence heuristic settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Mean absolute error plugged into the confidence formula
    pub mae: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { mae: DEFAULT_MAE }
    }
}

/// Chart output settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Directory the PNG charts are written to
    pub output_dir: PathBuf,
    /// Charts are skipped when false
    pub enabled: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path, if present
    pub fn load() -> Result<Self> {
        Self::build(
            File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false),
            environment(),
        )
    }

    /// Load configuration from a specific path, which must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::build(File::from(path).required(true), environment())
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    fn build<S>(file: S, env: Environment) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<()> {
        if !self.scoring.mae.is_finite() || self.scoring.mae < 0.0 {
            anyhow::bail!("scoring.mae must be a non-negative number, got {}", self.scoring.mae);
        }
        Ok(())
    }
}

/// `CLVFORGE__SECTION__KEY` variables, values parsed as numbers/bools where possible
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model.path, PathBuf::from("models/clv_model.json"));
        assert_eq!(config.scoring.mae, 74.0);
        assert_eq!(config.charts.output_dir, PathBuf::from("charts"));
        assert!(config.charts.enabled);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = toml_file(
            r#"
[model]
path = "artifacts/gbr.json"

[charts]
enabled = false
"#,
        );

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.model.path, PathBuf::from("artifacts/gbr.json"));
        assert!(!config.charts.enabled);
        assert_eq!(config.scoring.mae, 74.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_negative_mae() {
        let file = toml_file("[scoring]\nmae = -1.0\n");
        assert!(AppConfig::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file("[scoring]\nmae = 60.0\n\n[charts]\nenabled = true\n");
        let vars: config::Map<String, String> = [
            ("CLVFORGE__SCORING__MAE", "80"),
            ("CLVFORGE__CHARTS__ENABLED", "false"),
            ("CLVFORGE__MODEL__PATH", "env/model.json"),
            ("OTHER__SCORING__MAE", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = AppConfig::build(
            File::from(file.path()).required(true),
            environment().source(Some(vars)),
        )
        .unwrap();

        assert_eq!(config.scoring.mae, 80.0);
        assert!(!config.charts.enabled);
        assert_eq!(config.model.path, PathBuf::from("env/model.json"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_environment_value_is_validated() {
        let file = toml_file("");
        let vars: config::Map<String, String> =
            [("CLVFORGE__SCORING__MAE".to_string(), "-3".to_string())]
                .into_iter()
                .collect();

        let result = AppConfig::build(
            File::from(file.path()).required(true),
            environment().source(Some(vars)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(AppConfig::load_from_path("/nonexistent/clvforge.toml").is_err());
    }
}
