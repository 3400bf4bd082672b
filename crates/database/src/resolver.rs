//! Look-up-or-create for reference entities, and pool address resolution.
//!
//! The find-then-insert sequences here are not atomic on their own. Run them
//! inside a transaction (see [`crate::DbRepository`]); the unique index on the
//! natural key turns a lost race into [`DbError::Duplicate`] instead of a second row.

use crate::error::DbError;
use crate::store::CatalogStore;

/// Returns the id of the miner called `name`, creating the miner if it is new.
pub async fn resolve_miner<S>(store: &mut S, name: &str) -> Result<i64, DbError>
where
    S: CatalogStore + ?Sized,
{
    if let Some(miner) = store.find_miner_by_name(name).await? {
        tracing::debug!(miner = name, id = miner.id, "Found existing miner.");
        return Ok(miner.id);
    }

    tracing::info!(miner = name, "Creating miner...");
    let miner = store
        .insert_miner(name)
        .await
        .map_err(|e| DbError::from_insert(e, "miner", name))?;
    Ok(miner.id)
}

/// Returns the id of the algorithm called `name`, creating it on first sighting.
pub async fn resolve_algorithm<S>(store: &mut S, name: &str) -> Result<i64, DbError>
where
    S: CatalogStore + ?Sized,
{
    if let Some(algorithm) = store.find_algorithm_by_name(name).await? {
        return Ok(algorithm.id);
    }

    tracing::info!(algorithm = name, "Creating algorithm...");
    let algorithm = store
        .insert_algorithm(name)
        .await
        .map_err(|e| DbError::from_insert(e, "algorithm", name))?;
    Ok(algorithm.id)
}

/// Renders the stratum URL of a pool serving `algorithm_id`.
///
/// When several pools serve the algorithm the one with the lowest id is used.
/// Having none is an error naming the algorithm.
pub async fn resolve_pool_url<S>(store: &mut S, algorithm_id: i64) -> Result<String, DbError>
where
    S: CatalogStore + ?Sized,
{
    match store.first_pool_for_algorithm(algorithm_id).await? {
        Some(pool) => Ok(pool.stratum_url()),
        None => {
            // Only needed for the message.
            let algorithm = store
                .find_algorithm(algorithm_id)
                .await?
                .map(|a| a.name)
                .unwrap_or_else(|| "<unknown>".to_string());
            tracing::error!(algorithm_id, %algorithm, "No pool found for this algorithm.");
            Err(DbError::NoPoolForAlgorithm { algorithm_id, algorithm })
        }
    }
}
