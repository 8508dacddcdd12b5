//! Runtime configuration from environment variables.
//!
//! | Variable                   | Default   |
//! |----------------------------|-----------|
//! | `HOST`                     | `0.0.0.0` |
//! | `PORT`                     | `8080`    |
//! | `REGISTRY_DATA_DIR`        | `data`    |
//! | `RATING_CONFIDENCE_FACTOR` | `100`     |

use crate::rating::DEFAULT_CONFIDENCE_FACTOR;
use crate::registry::RegistrySettings;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory of the file-backed store.
    pub data_dir: PathBuf,
    pub confidence_factor: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            confidence_factor: DEFAULT_CONFIDENCE_FACTOR,
        }
    }
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT", defaults.port),
            data_dir: lookup("REGISTRY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            confidence_factor: parsed(
                &lookup,
                "RATING_CONFIDENCE_FACTOR",
                defaults.confidence_factor,
            ),
        }
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            confidence_factor: self.confidence_factor,
            ..RegistrySettings::default()
        }
    }
}

fn parsed<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {name}={raw:?}");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(Config::from_lookup(lookup_from(&[])), Config::default());
    }

    #[test]
    fn values_are_read_and_bad_numbers_ignored() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("REGISTRY_DATA_DIR", "/tmp/registry"),
            ("RATING_CONFIDENCE_FACTOR", "lots"),
        ]));
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/registry"));
        assert_eq!(config.confidence_factor, DEFAULT_CONFIDENCE_FACTOR);
        assert_eq!(config.registry_settings().confidence_factor, DEFAULT_CONFIDENCE_FACTOR);
    }
}
