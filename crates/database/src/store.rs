//! The storage capability the schema lifecycle and the resolvers are written against.

use crate::migrator::table_ddl;
use async_trait::async_trait;
use core_types::{Algorithm, Miner, Pool, TableDef, Version};
use sqlx::PgConnection;

/// Row-level operations the core needs from storage.
///
/// Lookups return `Ok(None)` when nothing matches; an `Err` always means the
/// storage itself failed. Implemented for [`PgConnection`], so the same code runs
/// on a pooled connection or inside a transaction (`&mut *tx`).
#[async_trait]
pub trait CatalogStore: Send {
    async fn has_table(&mut self, table: &str) -> Result<bool, sqlx::Error>;

    /// Ensures the stored table matches its declared shape. Must be idempotent and additive.
    async fn apply_table(&mut self, table: &TableDef) -> Result<(), sqlx::Error>;

    async fn find_version(&mut self, name: &str) -> Result<Option<Version>, sqlx::Error>;

    async fn insert_version(&mut self, name: &str, version: i64) -> Result<Version, sqlx::Error>;

    async fn update_version(&mut self, id: i64, version: i64) -> Result<(), sqlx::Error>;

    async fn find_miner_by_name(&mut self, name: &str) -> Result<Option<Miner>, sqlx::Error>;

    async fn insert_miner(&mut self, name: &str) -> Result<Miner, sqlx::Error>;

    async fn find_algorithm(&mut self, id: i64) -> Result<Option<Algorithm>, sqlx::Error>;

    async fn find_algorithm_by_name(&mut self, name: &str) -> Result<Option<Algorithm>, sqlx::Error>;

    async fn insert_algorithm(&mut self, name: &str) -> Result<Algorithm, sqlx::Error>;

    /// The pool with the lowest id among those serving `algorithm_id`.
    async fn first_pool_for_algorithm(&mut self, algorithm_id: i64) -> Result<Option<Pool>, sqlx::Error>;
}

#[async_trait]
impl CatalogStore for PgConnection {
    async fn has_table(&mut self, table: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(&mut *self)
        .await
    }

    async fn apply_table(&mut self, table: &TableDef) -> Result<(), sqlx::Error> {
        for statement in table_ddl(table) {
            tracing::debug!(table = table.name, %statement, "Applying DDL.");
            sqlx::query(&statement).execute(&mut *self).await?;
        }
        Ok(())
    }

    async fn find_version(&mut self, name: &str) -> Result<Option<Version>, sqlx::Error> {
        sqlx::query_as::<_, Version>(
            "SELECT id, name, version FROM versions WHERE name = $1 ORDER BY id ASC LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut *self)
        .await
    }

    async fn insert_version(&mut self, name: &str, version: i64) -> Result<Version, sqlx::Error> {
        sqlx::query_as::<_, Version>(
            "INSERT INTO versions (name, version) VALUES ($1, $2) RETURNING id, name, version",
        )
        .bind(name)
        .bind(version)
        .fetch_one(&mut *self)
        .await
    }

    async fn update_version(&mut self, id: i64, version: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("UPDATE versions SET version = $2 WHERE id = $1")
            .bind(id)
            .bind(version)
            .execute(&mut *self)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn find_miner_by_name(&mut self, name: &str) -> Result<Option<Miner>, sqlx::Error> {
        sqlx::query_as::<_, Miner>(
            "SELECT id, name, miner_software_algo_id FROM miners WHERE name = $1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut *self)
        .await
    }

    async fn insert_miner(&mut self, name: &str) -> Result<Miner, sqlx::Error> {
        sqlx::query_as::<_, Miner>(
            "INSERT INTO miners (name) VALUES ($1) RETURNING id, name, miner_software_algo_id",
        )
        .bind(name)
        .fetch_one(&mut *self)
        .await
    }

    async fn find_algorithm(&mut self, id: i64) -> Result<Option<Algorithm>, sqlx::Error> {
        sqlx::query_as::<_, Algorithm>("SELECT id, name FROM algorithms WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self)
            .await
    }

    async fn find_algorithm_by_name(&mut self, name: &str) -> Result<Option<Algorithm>, sqlx::Error> {
        sqlx::query_as::<_, Algorithm>("SELECT id, name FROM algorithms WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(&mut *self)
            .await
    }

    async fn insert_algorithm(&mut self, name: &str) -> Result<Algorithm, sqlx::Error> {
        sqlx::query_as::<_, Algorithm>("INSERT INTO algorithms (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&mut *self)
            .await
    }

    async fn first_pool_for_algorithm(&mut self, algorithm_id: i64) -> Result<Option<Pool>, sqlx::Error> {
        sqlx::query_as::<_, Pool>(
            r#"
            SELECT id, provider_id, algorithm_id, name, url, port, mh_factor
            FROM pools
            WHERE algorithm_id = $1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(algorithm_id)
        .fetch_optional(&mut *self)
        .await
    }
}
