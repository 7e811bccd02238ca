//! Service catalog loading from config.toml
//!
//! The services listed in config.toml seed the catalog on first run, when the
//! `services` table is still empty. Without a config file the built-in catalog
//! of six washes is used.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    /// Services to seed
    pub services: Vec<ServiceConfig>,
}

/// Configuration for a single catalog entry
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Name of the service
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Price of a paid visit
    pub price: f64,
    /// Nominal duration in minutes
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
}

const fn default_duration() -> i32 {
    30
}

impl ServiceConfig {
    fn builtin(name: &str, description: &str, price: f64, duration_minutes: i32) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            price,
            duration_minutes,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            services: vec![
                ServiceConfig::builtin("Basic Exterior Wash", "Quick exterior rinse and dry", 200.0, 15),
                ServiceConfig::builtin("Standard Wash", "Exterior wash with interior vacuum", 350.0, 30),
                ServiceConfig::builtin(
                    "Full Service Wash",
                    "Complete exterior and interior cleaning",
                    500.0,
                    45,
                ),
                ServiceConfig::builtin("Premium Detail", "Full wash plus wax and tire shine", 800.0, 60),
                ServiceConfig::builtin(
                    "Interior Deep Clean",
                    "Seats, dashboard, and carpet cleaning",
                    600.0,
                    50,
                ),
                ServiceConfig::builtin(
                    "Engine Bay Cleaning",
                    "Engine compartment wash and degrease",
                    400.0,
                    25,
                ),
            ],
        }
    }
}

/// Parses a catalog from TOML text.
pub fn parse_catalog(contents: &str) -> Result<CatalogConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse service catalog: {e}"),
    })
}

/// Loads the catalog from `path`.
///
/// A missing file yields the built-in catalog; an unreadable or malformed one
/// is an error.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        warn!(
            "Catalog file {} not found, using built-in services",
            path_ref.display()
        );
        return Ok(CatalogConfig::default());
    }

    debug!("Loading service catalog from {}", path_ref.display());
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {}: {e}", path_ref.display()),
    })?;
    parse_catalog(&contents)
}
