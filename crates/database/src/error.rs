use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection configuration: {0}")]
    ConnectionConfigError(String),

    #[error("Database operation failed: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Failed to migrate table `{table}`: {source}")]
    MigrationError {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to store the schema version: {0}")]
    VersionWriteError(#[source] sqlx::Error),

    #[error("A {entity} named `{key}` already exists.")]
    Duplicate { entity: &'static str, key: String },

    #[error("No pool found for this algorithm: {algorithm} (id {algorithm_id})")]
    NoPoolForAlgorithm { algorithm_id: i64, algorithm: String },

    #[error("Rejected invalid record: {0}")]
    InvalidRecord(#[from] core_types::CoreError),

    #[error("The requested data was not found in the database.")]
    NotFound,
}

impl DbError {
    /// Maps a unique-constraint violation on a natural key to [`DbError::Duplicate`].
    pub(crate) fn from_insert(e: sqlx::Error, entity: &'static str, key: &str) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DbError::Duplicate {
                entity,
                key: key.to_string(),
            },
            _ => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::UniqueViolation;

    #[test]
    fn unique_violation_becomes_duplicate() {
        let e = sqlx::Error::Database(Box::new(UniqueViolation { constraint: "ux_miners_name" }));

        let err = DbError::from_insert(e, "miner", "rig-01");

        assert!(matches!(err, DbError::Duplicate { entity: "miner", ref key } if key == "rig-01"));
        assert_eq!(err.to_string(), "A miner named `rig-01` already exists.");
    }

    #[test]
    fn other_insert_failures_pass_through() {
        let err = DbError::from_insert(sqlx::Error::PoolClosed, "miner", "rig-01");

        assert!(matches!(err, DbError::ConnectionError(sqlx::Error::PoolClosed)));
    }
}
