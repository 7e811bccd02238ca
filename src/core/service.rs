//! Service catalog business logic - Handles all service-related operations.
//!
//! Services are catalog entries with a fixed price that customers check in for.
//! A service is never removed while visits still reference it; it is deactivated
//! instead so it drops out of check-in while history stays intact.

use crate::{
    config::catalog::CatalogConfig,
    entities::{Service, Visit, service, visit},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, warn};

/// Fields required to create or replace a catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInput {
    /// Service name
    pub name: String,
    /// Optional description
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

fn validate(input: &ServiceInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::invalid("name", "Service name cannot be empty"));
    }

    if input.price < 0.0 || !input.price.is_finite() {
        return Err(Error::InvalidAmount {
            amount: input.price,
        });
    }

    if input.duration_minutes <= 0 {
        return Err(Error::invalid(
            "duration_minutes",
            format!("Duration must be positive, got {}", input.duration_minutes),
        ));
    }

    Ok(())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Retrieves every service, cheapest first.
pub async fn list_services(db: &DatabaseConnection) -> Result<Vec<service::Model>> {
    Service::find()
        .order_by_asc(service::Column::Price)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the services offered at check-in, cheapest first.
pub async fn list_active_services(db: &DatabaseConnection) -> Result<Vec<service::Model>> {
    Service::find()
        .filter(service::Column::IsActive.eq(true))
        .order_by_asc(service::Column::Price)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a service by its unique ID.
pub async fn get_service_by_id(
    db: &DatabaseConnection,
    service_id: i64,
) -> Result<Option<service::Model>> {
    Service::find_by_id(service_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new, active service after validating name, price and duration.
pub async fn create_service(db: &DatabaseConnection, input: ServiceInput) -> Result<service::Model> {
    validate(&input)?;

    let service = service::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(clean_description(input.description)),
        price: Set(input.price),
        duration_minutes: Set(input.duration_minutes),
        is_active: Set(true),
        ..Default::default()
    };

    let created = service.insert(db).await?;
    info!("Created service '{}' at {:.2}", created.name, created.price);
    Ok(created)
}

/// Replaces the name, description, price and duration of an existing service.
///
/// Past visits keep the amount they were charged; only future check-ins see
/// the new price.
pub async fn update_service(
    db: &DatabaseConnection,
    service_id: i64,
    input: ServiceInput,
) -> Result<service::Model> {
    validate(&input)?;

    let mut service: service::ActiveModel = Service::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or(Error::ServiceNotFound { id: service_id })?
        .into();

    service.name = Set(input.name.trim().to_string());
    service.description = Set(clean_description(input.description));
    service.price = Set(input.price);
    service.duration_minutes = Set(input.duration_minutes);

    service.update(db).await.map_err(Into::into)
}

/// Activates or deactivates a service for new check-ins.
pub async fn set_service_active(
    db: &DatabaseConnection,
    service_id: i64,
    active: bool,
) -> Result<service::Model> {
    let mut service: service::ActiveModel = Service::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or(Error::ServiceNotFound { id: service_id })?
        .into();

    service.is_active = Set(active);
    let updated = service.update(db).await?;
    info!(
        "Service '{}' is now {}",
        updated.name,
        if active { "active" } else { "inactive" }
    );
    Ok(updated)
}

/// Permanently removes a service that no visit references.
pub async fn delete_service(db: &DatabaseConnection, service_id: i64) -> Result<()> {
    let service = Service::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or(Error::ServiceNotFound { id: service_id })?;

    let visits = Visit::find()
        .filter(visit::Column::ServiceId.eq(service_id))
        .count(db)
        .await?;

    if visits > 0 {
        warn!(
            "Refusing to delete service '{}' referenced by {visits} visits",
            service.name
        );
        return Err(Error::ServiceInUse {
            name: service.name,
            visits,
        });
    }

    service.delete(db).await?;
    Ok(())
}

/// Inserts the catalog when the services table is empty.
///
/// Returns the number of services inserted (zero if a catalog already exists).
pub async fn seed_services(db: &DatabaseConnection, catalog: &CatalogConfig) -> Result<usize> {
    let existing = Service::find().count(db).await?;
    if existing > 0 {
        info!("Service catalog already holds {existing} entries, skipping seed");
        return Ok(0);
    }

    for entry in &catalog.services {
        create_service(
            db,
            ServiceInput {
                name: entry.name.clone(),
                description: entry.description.clone(),
                price: entry.price,
                duration_minutes: entry.duration_minutes,
            },
        )
        .await?;
    }

    info!("Seeded {} services", catalog.services.len());
    Ok(catalog.services.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn input(name: &str, price: f64, duration_minutes: i32) -> ServiceInput {
        ServiceInput {
            name: name.to_string(),
            description: None,
            price,
            duration_minutes,
        }
    }

    #[tokio::test]
    async fn test_create_service_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_service(&db, input("   ", 100.0, 30)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { field: "name", .. }
        ));

        let result = create_service(&db, input("Wash", -1.0, 30)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1.0 }
        ));

        let result = create_service(&db, input("Wash", f64::NAN, 30)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let result = create_service(&db, input("Wash", 100.0, 0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput {
                field: "duration_minutes",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_service_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let service = create_service(
            &db,
            ServiceInput {
                name: "  Premium Detail ".to_string(),
                description: Some("  ".to_string()),
                price: 800.0,
                duration_minutes: 60,
            },
        )
        .await?;

        assert_eq!(service.name, "Premium Detail");
        assert_eq!(service.description, None);
        assert_eq!(service.price, 800.0);
        assert!(service.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_services_ordered_by_price() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_service(&db, "Premium", 800.0).await?;
        create_custom_service(&db, "Basic", 200.0).await?;
        create_custom_service(&db, "Standard", 350.0).await?;

        let names: Vec<String> = list_services(&db)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Basic", "Standard", "Premium"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_services_hidden_from_active_list() -> Result<()> {
        let db = setup_test_db().await?;
        let basic = create_custom_service(&db, "Basic", 200.0).await?;
        create_custom_service(&db, "Standard", 350.0).await?;

        let updated = set_service_active(&db, basic.id, false).await?;
        assert!(!updated.is_active);

        let active = list_active_services(&db).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Standard");
        assert_eq!(list_services(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_service_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let service = create_test_service(&db, "Standard Wash").await?;

        let updated = update_service(&db, service.id, input("Standard Plus", 400.0, 35)).await?;
        assert_eq!(updated.id, service.id);
        assert_eq!(updated.name, "Standard Plus");
        assert_eq!(updated.price, 400.0);
        assert_eq!(updated.duration_minutes, 35);

        let missing = update_service(&db, 999, input("Ghost", 1.0, 10)).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::ServiceNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unused_service() -> Result<()> {
        let db = setup_test_db().await?;
        let service = create_test_service(&db, "Unused").await?;

        delete_service(&db, service.id).await?;
        assert!(get_service_by_id(&db, service.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_referenced_service_is_refused() -> Result<()> {
        let (db, customer, service) = setup_with_customer_and_service().await?;
        record_test_visit(&db, customer.id, service.id).await?;

        let result = delete_service(&db, service.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ServiceInUse { visits: 1, .. }
        ));
        assert!(get_service_by_id(&db, service.id).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_services_only_into_empty_catalog() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = CatalogConfig::default();

        assert_eq!(seed_services(&db, &catalog).await?, 6);
        assert_eq!(seed_services(&db, &catalog).await?, 0);
        assert_eq!(list_services(&db).await?.len(), 6);

        Ok(())
    }
}
