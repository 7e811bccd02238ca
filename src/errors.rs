//! Unified error types for `SafiWash`.
//!
//! Every core operation returns [`Result`]. The variants fall into three
//! families: duplicate identity (`DuplicatePhone`), missing records
//! (`CustomerNotFound`, `ServiceNotFound`) and rejected input (`InvalidInput`,
//! `InvalidAmount`). Ledger rule violations and infrastructure failures sit
//! alongside them.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any failure reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (config file, socket bind)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable present but unusable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A monetary amount that is negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A required field is missing or malformed
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// No customer with this id
    #[error("Customer not found: {id}")]
    CustomerNotFound {
        /// Requested customer id
        id: i64,
    },

    /// No service with this id
    #[error("Service not found: {id}")]
    ServiceNotFound {
        /// Requested service id
        id: i64,
    },

    /// The service exists but is not offered for new check-ins
    #[error("Service '{name}' is inactive")]
    ServiceInactive {
        /// Service name
        name: String,
    },

    /// The service cannot be deleted while visits reference it
    #[error("Service '{name}' is referenced by {visits} visit(s); deactivate it instead")]
    ServiceInUse {
        /// Service name
        name: String,
        /// Number of referencing visits
        visits: u64,
    },

    /// Another customer already uses this phone number
    #[error("A customer with phone number {phone} already exists")]
    DuplicatePhone {
        /// The conflicting phone number
        phone: String,
    },

    /// Reward redemption attempted below the loyalty threshold
    #[error("Insufficient loyalty points: have {points}, need {required}")]
    InsufficientPoints {
        /// Points the customer currently holds
        points: i32,
        /// Points a redemption requires
        required: i32,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
