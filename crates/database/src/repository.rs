use crate::DbError;
use crate::resolver;
use crate::schema::{self, SchemaOutcome};
use core_types::{MinerSoftwareAlgo, NewCoinPrice, NewMinerStats, NewPoolStats};
use sqlx::postgres::PgPool;

/// Key of the advisory lock serialising concurrent schema checks.
const SCHEMA_LOCK_KEY: i64 = 0x6d69_6e69_6e67;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Brings the stored schema up to the catalog's version.
    ///
    /// Runs in one transaction under an advisory lock, so two processes starting
    /// together cannot both create a schema marker. DDL is transactional in
    /// PostgreSQL; a failure leaves the schema as it was.
    pub async fn verify_and_update_schema(&self) -> Result<SchemaOutcome, DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let outcome = schema::verify_and_update_schema(&mut *tx).await?;

        tx.commit().await.map_err(DbError::VersionWriteError)?;
        Ok(outcome)
    }

    /// Returns the id of the miner called `name`, creating it if needed.
    pub async fn resolve_miner(&self, name: &str) -> Result<i64, DbError> {
        let mut tx = self.pool.begin().await?;
        let id = resolver::resolve_miner(&mut *tx, name).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::from_insert(e, "miner", name))?;
        Ok(id)
    }

    /// Returns the id of the algorithm called `name`, creating it if needed.
    pub async fn resolve_algorithm(&self, name: &str) -> Result<i64, DbError> {
        let mut tx = self.pool.begin().await?;
        let id = resolver::resolve_algorithm(&mut *tx, name).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::from_insert(e, "algorithm", name))?;
        Ok(id)
    }

    /// Renders the stratum URL of a pool for the given algorithm.
    pub async fn resolve_pool_url(&self, algorithm_id: i64) -> Result<String, DbError> {
        let mut conn = self.pool.acquire().await?;
        resolver::resolve_pool_url(&mut *conn, algorithm_id).await
    }

    /// Records which software/algorithm pairing is now active on a miner.
    /// `None` clears it.
    pub async fn set_active_pairing(
        &self,
        miner_id: i64,
        miner_software_algo_id: Option<i64>,
    ) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE miners SET miner_software_algo_id = $2 WHERE id = $1")
            .bind(miner_id)
            .bind(miner_software_algo_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Lists the pairings of a miner software package that automated
    /// optimisation may pick, i.e. the ones not flagged as excluded.
    pub async fn selectable_algorithms(
        &self,
        miner_software_id: i64,
    ) -> Result<Vec<MinerSoftwareAlgo>, DbError> {
        let pairings = sqlx::query_as::<_, MinerSoftwareAlgo>(
            r#"
            SELECT id, miner_software_id, algorithm_id, name, extra_params, excluded
            FROM miner_software_algos
            WHERE miner_software_id = $1 AND NOT excluded
            ORDER BY id ASC
            "#,
        )
        .bind(miner_software_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pairings)
    }

    // ==============================================================================
    // Append-only observations
    // ==============================================================================

    /// Stores a coin price sample and returns its id.
    pub async fn record_coin_price(&self, price: &NewCoinPrice) -> Result<i64, DbError> {
        price.validate()?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO coin_prices (coin_id, instant, price) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(price.coin_id)
        .bind(price.instant)
        .bind(price.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Stores a pool observation and returns its id.
    pub async fn record_pool_stats(&self, stats: &NewPoolStats) -> Result<i64, DbError> {
        stats.validate()?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO pool_stats (
                pool_id, instant, current_hashrate, workers,
                profit_estimate, profit_actual_24h, coin_price_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(stats.pool_id)
        .bind(stats.instant)
        .bind(stats.current_hashrate)
        .bind(stats.workers)
        .bind(stats.profit_estimate)
        .bind(stats.profit_actual_24h)
        .bind(stats.coin_price_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Stores a miner hash-rate observation and returns its id.
    pub async fn record_miner_stats(&self, stats: &NewMinerStats) -> Result<i64, DbError> {
        stats.validate()?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO miner_stats (
                miner_id, miner_software_id, algorithm_id, instant, work_per_second, mh_factor
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(stats.miner_id)
        .bind(stats.miner_software_id)
        .bind(stats.algorithm_id)
        .bind(stats.instant)
        .bind(stats.work_per_second)
        .bind(stats.mh_factor)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
