use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;
use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub resampler: ResamplerConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    pub fn load() -> AnyResult<Self> {
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err("config.toml or config.default.toml not found".into());
        };

        let config_str = std::fs::read_to_string(config_path)?;
        if config_str.is_empty() {
            return Err(format!("{} is empty", config_path).into());
        }

        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(s: &str) -> AnyResult<Self> {
        let config: Config = toml::from_str(s)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.logging.is_none());
        assert_eq!(config.resampler, ResamplerConfig::default());
        assert_eq!(config.demo.frame_size, 1_024);
    }

    #[test]
    fn parses_resampler_section() {
        let config = Config::from_toml_str(
            r#"
            [logging]
            level = "debug"

            [resampler]
            quality = "low"
            min_factor = 0.5
            max_factor = 2.0
            interpolate = true
            "#,
        )
        .unwrap();

        let r = &config.resampler;
        assert_eq!(r.quality, Quality::Low);
        assert_eq!(r.min_factor, 0.5);
        assert_eq!(r.max_factor, 2.0);
        assert!(r.interpolate);
        assert_eq!(r.beta, 6.0);
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn rejects_unknown_quality() {
        assert!(Config::from_toml_str("[resampler]\nquality = \"ultra\"").is_err());
    }
}
