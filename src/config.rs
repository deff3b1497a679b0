//! Runtime configuration read from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_TAX_PERCENT: f64 = 12.0;
pub const DEFAULT_CURRENCY_PREFIX: &str = "₱";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Values every generated document depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSettings {
    pub currency_prefix: String,
    /// Tax percent applied when a line item has none, and to the marketing fee.
    pub default_tax_percent: f64,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            currency_prefix: DEFAULT_CURRENCY_PREFIX.to_string(),
            default_tax_percent: DEFAULT_TAX_PERCENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Where finished PDFs are written and served from.
    pub output_dir: PathBuf,
    pub typst_bin: String,
    pub documents: DocumentSettings,
}

impl AppConfig {
    /// Load from process environment. Call `dotenvy::dotenv()` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port_raw = get("TECHCHEF_PORT", "8080");
        let port = port_raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
            key: "TECHCHEF_PORT",
            expected: "port number",
            value: port_raw.clone(),
        })?;

        let tax_raw = get("TECHCHEF_DEFAULT_TAX_PERCENT", "12");
        let default_tax_percent = tax_raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or_else(|| ConfigError::Invalid {
                key: "TECHCHEF_DEFAULT_TAX_PERCENT",
                expected: "non-negative percentage",
                value: tax_raw.clone(),
            })?;

        Ok(Self {
            bind_addr: get("TECHCHEF_BIND_ADDR", "127.0.0.1"),
            port,
            output_dir: PathBuf::from(get("TECHCHEF_OUTPUT_DIR", "./downloads")),
            typst_bin: get("TECHCHEF_TYPST_BIN", "typst"),
            documents: DocumentSettings {
                currency_prefix: get("TECHCHEF_CURRENCY_PREFIX", DEFAULT_CURRENCY_PREFIX),
                default_tax_percent,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.typst_bin, "typst");
        assert_eq!(config.documents, DocumentSettings::default());
    }

    #[test]
    fn overrides_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TECHCHEF_PORT", "9090"),
            ("TECHCHEF_DEFAULT_TAX_PERCENT", "7.5"),
            ("TECHCHEF_CURRENCY_PREFIX", "$"),
            ("TECHCHEF_OUTPUT_DIR", "/tmp/pdfs"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.documents.default_tax_percent, 7.5);
        assert_eq!(config.documents.currency_prefix, "$");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/pdfs"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("TECHCHEF_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TECHCHEF_PORT", .. }));

        let err = AppConfig::from_lookup(lookup(&[("TECHCHEF_DEFAULT_TAX_PERCENT", "-3")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "TECHCHEF_DEFAULT_TAX_PERCENT",
                ..
            }
        ));
    }
}
