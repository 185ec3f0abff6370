use crate::error::Result;
use crate::utils::constants::{DEFAULT_WINDOW, ENV_PREFIX};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use validator::Validate;

/// Tunable analysis settings, layered from defaults, an optional TOML file and
/// `TEMPMON_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct AnalysisConfig {
    #[validate(range(min = 2))]
    pub window: usize,

    #[validate(range(min = 1))]
    pub max_workers: usize,
}

impl AnalysisConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("window", DEFAULT_WINDOW as i64)?
            .set_default("max_workers", num_cpus::get() as i64)?;

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let loaded: AnalysisConfig = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(mut self, window: Option<usize>, max_workers: Option<usize>) -> Result<Self> {
        if let Some(window) = window {
            self.window = window;
        }
        if let Some(max_workers) = max_workers {
            self.max_workers = max_workers;
        }
        self.validate()?;
        Ok(self)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_workers: num_cpus::get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_load_from_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "window = 15").unwrap();
        writeln!(file, "max_workers = 3").unwrap();

        let config = AnalysisConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.window, 15);
        assert_eq!(config.max_workers, 3);
    }

    #[test]
    fn test_invalid_window_in_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "window = 1").unwrap();

        assert!(AnalysisConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_overrides_are_validated() {
        let config = AnalysisConfig::default();
        assert_eq!(config.window, 30);

        let config = config.with_overrides(Some(7), Some(2)).unwrap();
        assert_eq!((config.window, config.max_workers), (7, 2));
        assert!(config.with_overrides(None, Some(0)).is_err());
    }
}
