use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// Top-level configuration, one struct per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub seed: SeedConfig,
    pub features: FeatureFlags,
}

// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Database settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Sample data settings
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Titles removed from the catalogue on startup, along with their
    /// showtimes and bookings.
    pub retired_titles: Vec<String>,
}

// Feature flags
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub seed_sample_data: bool,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                environment: "development".to_string(),
                rust_log: "cinema_booking=debug,tower_http=debug".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://cinema.db".to_string(),
                pool_size: 5,
            },
            seed: SeedConfig {
                retired_titles: Vec::new(),
            },
            features: FeatureFlags {
                seed_sample_data: true,
                static_dir: None,
            },
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment, falling back to
    /// [`Config::default`] for anything that is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Ok(Config {
            app: AppConfig {
                host: lookup("HOST").unwrap_or(defaults.app.host),
                port: parse_or(&lookup, "PORT", defaults.app.port)?,
                environment: lookup("ENVIRONMENT").unwrap_or(defaults.app.environment),
                rust_log: lookup("RUST_LOG").unwrap_or(defaults.app.rust_log),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or(defaults.database.url),
                pool_size: parse_or(&lookup, "DB_POOL_SIZE", defaults.database.pool_size)?,
            },
            seed: SeedConfig {
                retired_titles: lookup("RETIRED_MOVIE_TITLES")
                    .map(|raw| split_list(&raw))
                    .unwrap_or(defaults.seed.retired_titles),
            },
            features: FeatureFlags {
                seed_sample_data: parse_or(
                    &lookup,
                    "SEED_SAMPLE_DATA",
                    defaults.features.seed_sample_data,
                )?,
                static_dir: lookup("STATIC_DIR")
                    .filter(|dir| !dir.trim().is_empty())
                    .map(PathBuf::from),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.environment.eq_ignore_ascii_case("production")
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.app.port, 3000);
        assert_eq!(config.database.url, "sqlite://cinema.db");
        assert!(config.features.seed_sample_data);
        assert!(config.features.static_dir.is_none());
        assert!(config.seed.retired_titles.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("SEED_SAMPLE_DATA", "false"),
            ("STATIC_DIR", "public"),
            ("RETIRED_MOVIE_TITLES", "Joker, Parasite ,,"),
            ("ENVIRONMENT", "Production"),
        ]))
        .unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert!(!config.features.seed_sample_data);
        assert_eq!(config.features.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.seed.retired_titles, vec!["Joker", "Parasite"]);
        assert!(config.is_production());
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
