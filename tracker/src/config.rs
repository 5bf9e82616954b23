use crate::{
    batch::BatchOptions,
    source::{SourceConfig, TleSource, DEFAULT_RETRIES, DEFAULT_RETRY_BACKOFF, DEFAULT_TIMEOUT},
};
use orbit_types::prelude::*;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::{fs, io, path::Path, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file")]
    Io(#[from] io::Error),

    #[error("Failed to parse config file")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// File path, URL or `-` for stdin
    pub source: Option<String>,
    #[serde(deserialize_with = "humantime_duration")]
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
    #[serde(deserialize_with = "humantime_duration")]
    pub retry_backoff: Option<Duration>,
    pub concurrency: Option<usize>,
    #[serde(deserialize_with = "humantime_duration")]
    pub deadline: Option<Duration>,
    /// Only objects whose name matches this regex are tracked
    pub include: Option<String>,
    pub window: Option<Window>,
}

#[derive(Copy, Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Window {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_str_checked(&content)
    }

    pub fn from_str_checked(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges, also after command line overrides have been applied
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source_config()?;
        self.query_window()?;
        self.include_pattern()?;
        if self.concurrency == Some(0) {
            return Err(ConfigError::Validation(
                "concurrency must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn source_config(&self) -> Result<SourceConfig, ConfigError> {
        let source = match &self.source {
            Some(s) => s.parse::<TleSource>().map_err(|e| {
                ConfigError::Validation(format!("Invalid source '{s}': {e}"))
            })?,
            None => TleSource::default(),
        };
        Ok(SourceConfig {
            source,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retries: self.retries.unwrap_or(DEFAULT_RETRIES),
            retry_backoff: self.retry_backoff.unwrap_or(DEFAULT_RETRY_BACKOFF),
        })
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            concurrency: self.concurrency,
            deadline: self.deadline,
        }
    }

    pub fn query_window(&self) -> Result<Option<QueryWindow>, ConfigError> {
        let Some(w) = self.window else {
            return Ok(None);
        };
        if !(0.0..=180.0).contains(&w.radius) {
            return Err(ConfigError::Validation(format!(
                "Window radius {} is outside of [0, 180] degrees",
                w.radius
            )));
        }
        QueryWindow::new(w.latitude, w.longitude, w.radius)
            .map(Some)
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    pub fn include_pattern(&self) -> Result<Option<Regex>, ConfigError> {
        self.include
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| ConfigError::Validation(format!("Invalid include pattern: {e}")))
    }
}

fn humantime_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use indoc::indoc;

    #[test]
    fn full_config() {
        let cfg = Config::from_str_checked(indoc! {r#"
            source = "https://example.com/gp.php?GROUP=active&FORMAT=tle"
            timeout = "10s"
            retries = 5
            retry-backoff = "500ms"
            concurrency = 4
            deadline = "1m 30s"
            include = "^STARLINK-\\d+$"

            [window]
            latitude = 51.5
            longitude = -0.1
            radius = 10.0
        "#})
        .unwrap();

        let src = cfg.source_config().unwrap();
        assert!(matches!(src.source, TleSource::Url(ref u) if u.host_str() == Some("example.com")));
        assert_eq!(src.timeout, Duration::from_secs(10));
        assert_eq!(src.retries, 5);
        assert_eq!(src.retry_backoff, Duration::from_millis(500));

        let opts = cfg.batch_options();
        assert_eq!(opts.concurrency, Some(4));
        assert_eq!(opts.deadline, Some(Duration::from_secs(90)));

        let w = cfg.query_window().unwrap().unwrap();
        assert_relative_eq!(w.latitude(), 51.5);
        assert_relative_eq!(w.longitude(), -0.1);
        assert_relative_eq!(w.radius(), 10.0);

        let re = cfg.include_pattern().unwrap().unwrap();
        assert!(re.is_match("STARLINK-1007"));
        assert!(!re.is_match("ISS (ZARYA)"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::from_str_checked("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.source_config().unwrap(), SourceConfig::default());
        assert_eq!(cfg.batch_options(), BatchOptions::default());
        assert_eq!(cfg.query_window().unwrap(), None);
    }

    #[test]
    fn file_and_stdin_sources() {
        let cfg = Config::from_str_checked(r#"source = "-""#).unwrap();
        assert_eq!(cfg.source_config().unwrap().source, TleSource::Stdin);
        let cfg = Config::from_str_checked(r#"source = "data/active.txt""#).unwrap();
        assert_eq!(
            cfg.source_config().unwrap().source,
            TleSource::File("data/active.txt".into())
        );
    }

    #[test]
    fn invalid_values() {
        let bad = [
            "timeout = \"soon\"",
            "concurrency = 0",
            "include = \"(unclosed\"",
            "source = \"https://\"",
            "[window]\nlatitude = 95.0\nlongitude = 0.0\nradius = 1.0",
            "[window]\nlatitude = 0.0\nlongitude = 200.0\nradius = 1.0",
            "[window]\nlatitude = 0.0\nlongitude = 0.0\nradius = 181.0",
            "[window]\nlatitude = 0.0\nlongitude = 0.0",
            "retries = -1",
        ];
        for s in bad {
            assert!(Config::from_str_checked(s).is_err(), "{s}");
        }
    }

    #[test]
    fn error_kinds() {
        assert!(matches!(
            Config::from_str_checked("concurrency = 0"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            Config::from_str_checked("concurrency = \"many\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            Config::load("/nonexistent/tracker.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
