//! Runtime settings loaded from environment variables.
//!
//! `main` loads `.env` through `dotenvy` first, so every value here can come
//! from either the process environment or the `.env` file.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::core::ledger::RewardPolicy;
use crate::errors::{Error, Result};
use std::{env::VarError, net::SocketAddr};

/// Default listen address, matching the port the shop has always used.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Default location of the service catalog file.
pub const DEFAULT_CATALOG_PATH: &str = "config.toml";

/// Application settings shared with every request handler.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// Whether reward redemptions are checked against the loyalty threshold
    pub reward_policy: RewardPolicy,
    /// Path of the TOML file holding the default service catalog
    pub catalog_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            reward_policy: RewardPolicy::default(),
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
        }
    }
}

impl Settings {
    /// Reads `DATABASE_URL`, `BIND_ADDR`, `REWARD_POLICY` and `CATALOG_PATH`,
    /// falling back to defaults for any that are unset.
    ///
    /// A variable that is set but not valid Unicode is an [`Error::EnvVar`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(e) => Err(e.into()),
        })
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Option<String>>,
    {
        let database_url =
            lookup("DATABASE_URL")?.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_raw = lookup("BIND_ADDR")?.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e| Error::Config {
            message: format!("Invalid BIND_ADDR '{bind_raw}': {e}"),
        })?;

        let reward_policy = match lookup("REWARD_POLICY")? {
            Some(raw) => raw.parse()?,
            None => RewardPolicy::default(),
        };

        let catalog_path =
            lookup("CATALOG_PATH")?.unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string());

        Ok(Self {
            database_url,
            bind_addr,
            reward_policy,
            catalog_path,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::{collections::HashMap, ffi::OsString};

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<Option<String>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| Ok(map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.bind_addr.port(), 5000);
        assert_eq!(settings.reward_policy, RewardPolicy::Strict);
        assert_eq!(settings.catalog_path, "config.toml");
    }

    #[test]
    fn test_overrides_are_applied() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("REWARD_POLICY", "lenient"),
            ("CATALOG_PATH", "/etc/safiwash/catalog.toml"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.bind_addr.port(), 8080);
        assert_eq!(settings.reward_policy, RewardPolicy::Lenient);
        assert_eq!(settings.catalog_path, "/etc/safiwash/catalog.toml");
    }

    #[test]
    fn test_bad_bind_addr_is_a_config_error() {
        let result = Settings::from_lookup(lookup_from(&[("BIND_ADDR", "not-an-address")]));
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_unknown_reward_policy_is_a_config_error() {
        let result = Settings::from_lookup(lookup_from(&[("REWARD_POLICY", "generous")]));
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_non_unicode_variable_is_an_env_error() {
        let result = Settings::from_lookup(|key| {
            if key == "DATABASE_URL" {
                Err(VarError::NotUnicode(OsString::from("sqlite://bad")).into())
            } else {
                Ok(None)
            }
        });
        assert!(matches!(
            result.unwrap_err(),
            Error::EnvVar(VarError::NotUnicode(_))
        ));
    }
}
