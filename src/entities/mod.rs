//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod customer;
pub mod service;
pub mod visit;

// Re-export specific types to avoid conflicts
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use visit::{Column as VisitColumn, Entity as Visit, Model as VisitModel};
