/// Customer registration, profile edits, lookup and deletion
pub mod customer;

/// Visit recording, charging and the loyalty rules
pub mod ledger;

/// Dashboard and reporting aggregates
pub mod report;

/// Service catalog management
pub mod service;

/// Visit history queries
pub mod visit;
