//! Keeps the stored schema in step with the entity catalog.
//!
//! The `versions` row named `"database"` records which [`SCHEMA_VERSION`] has been
//! applied. Migration only runs when that marker is missing or behind; applying the
//! catalog is idempotent, so the marker exists to skip needless work.

use crate::error::DbError;
use crate::store::CatalogStore;
use core_types::{CATALOG, DATABASE_VERSION_NAME, Entity, SCHEMA_VERSION, Version};

/// What [`verify_and_update_schema`] found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// There was no schema marker. The catalog was applied and the marker created.
    Initialized,
    /// The marker was behind. The catalog was applied and the marker moved forward.
    Upgraded { from: i64 },
    /// The marker was current (or ahead); nothing was changed.
    Current { version: i64 },
}

/// Applies every table of the catalog, in dependency order.
pub async fn apply_catalog<S>(store: &mut S) -> Result<(), DbError>
where
    S: CatalogStore + ?Sized,
{
    tracing::info!("Creating/updating schema...");
    for table in CATALOG {
        store
            .apply_table(table)
            .await
            .map_err(|source| DbError::MigrationError { table: table.name, source })?;
    }
    Ok(())
}

async fn create_marker<S>(store: &mut S) -> Result<(), DbError>
where
    S: CatalogStore + ?Sized,
{
    tracing::info!(version = SCHEMA_VERSION, "Storing schema version...");
    store
        .insert_version(DATABASE_VERSION_NAME, SCHEMA_VERSION)
        .await
        .map_err(DbError::VersionWriteError)?;
    Ok(())
}

/// Verifies the stored schema against the catalog and migrates it when needed.
///
/// A failure to write the marker is returned as [`DbError::VersionWriteError`]; a
/// stale marker would make later runs skip needed migrations, so callers should not
/// carry on past it.
pub async fn verify_and_update_schema<S>(store: &mut S) -> Result<SchemaOutcome, DbError>
where
    S: CatalogStore + ?Sized,
{
    tracing::info!("Verifying schema...");

    let marker: Option<Version> = if store.has_table(Version::TABLE.name).await? {
        store.find_version(DATABASE_VERSION_NAME).await?
    } else {
        None
    };

    let outcome = match marker {
        None => {
            apply_catalog(store).await?;
            create_marker(store).await?;
            SchemaOutcome::Initialized
        }
        Some(marker) if marker.version < SCHEMA_VERSION => {
            tracing::info!(found = marker.version, "Found older schema.");
            apply_catalog(store).await?;
            tracing::info!(version = SCHEMA_VERSION, "Updating schema version...");
            store
                .update_version(marker.id, SCHEMA_VERSION)
                .await
                .map_err(DbError::VersionWriteError)?;
            SchemaOutcome::Upgraded { from: marker.version }
        }
        Some(marker) => {
            if marker.version > SCHEMA_VERSION {
                tracing::warn!(
                    found = marker.version,
                    expected = SCHEMA_VERSION,
                    "Stored schema is newer than this build; leaving it untouched."
                );
            }
            SchemaOutcome::Current { version: marker.version }
        }
    };

    tracing::info!(?outcome, "Schema verified.");
    Ok(outcome)
}
