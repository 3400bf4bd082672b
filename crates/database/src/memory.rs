//! In-memory `CatalogStore` used by the unit tests.

use crate::store::CatalogStore;
use async_trait::async_trait;
use core_types::{Algorithm, Miner, Pool, TableDef, Version};
use sqlx::error::{DatabaseError, ErrorKind};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A unique-constraint violation as the server would report it.
#[derive(Debug)]
pub(crate) struct UniqueViolation {
    pub constraint: &'static str,
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate key value violates unique constraint \"{}\"", self.constraint)
    }
}

impl std::error::Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    /// Table name to its column names.
    pub tables: BTreeMap<String, BTreeSet<String>>,
    pub versions: Vec<Version>,
    pub miners: Vec<Miner>,
    pub algorithms: Vec<Algorithm>,
    pub pools: Vec<Pool>,
    /// Number of `apply_table` calls.
    pub table_applications: usize,
    pub fail_version_writes: bool,
    pub fail_lookups: bool,
    /// Lookups miss existing names, as when another writer inserts between
    /// the find and the insert; the insert then hits the unique index.
    pub hide_existing_names: bool,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_lookup(&self) -> Result<(), sqlx::Error> {
        if self.fail_lookups {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }

    fn unique_violation(table: &str) -> sqlx::Error {
        let constraint = match table {
            "miners" => "ux_miners_name",
            _ => "ux_algorithms_name",
        };
        sqlx::Error::Database(Box::new(UniqueViolation { constraint }))
    }

    pub fn add_algorithm(&mut self, name: &str) -> i64 {
        let id = self.next_id();
        self.algorithms.push(Algorithm { id, name: name.to_string() });
        id
    }

    pub fn add_pool(&mut self, algorithm_id: i64, url: &str, port: i32) -> i64 {
        let id = self.next_id();
        self.pools.push(Pool {
            id,
            provider_id: 1,
            algorithm_id,
            name: format!("pool-{id}"),
            url: url.to_string(),
            port,
            mh_factor: 1.0,
        });
        id
    }

    pub fn add_version(&mut self, name: &str, version: i64) {
        self.tables.entry("versions".to_string()).or_default();
        let id = self.next_id();
        self.versions.push(Version { id, name: name.to_string(), version });
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn has_table(&mut self, table: &str) -> Result<bool, sqlx::Error> {
        self.check_lookup()?;
        Ok(self.tables.contains_key(table))
    }

    async fn apply_table(&mut self, table: &TableDef) -> Result<(), sqlx::Error> {
        self.table_applications += 1;
        let columns = self.tables.entry(table.name.to_string()).or_default();
        columns.insert("id".to_string());
        columns.extend(table.columns.iter().map(|c| c.name.to_string()));
        Ok(())
    }

    async fn find_version(&mut self, name: &str) -> Result<Option<Version>, sqlx::Error> {
        self.check_lookup()?;
        Ok(self.versions.iter().find(|v| v.name == name).cloned())
    }

    async fn insert_version(&mut self, name: &str, version: i64) -> Result<Version, sqlx::Error> {
        if self.fail_version_writes {
            return Err(sqlx::Error::PoolClosed);
        }
        let row = Version { id: self.next_id(), name: name.to_string(), version };
        self.versions.push(row.clone());
        Ok(row)
    }

    async fn update_version(&mut self, id: i64, version: i64) -> Result<(), sqlx::Error> {
        if self.fail_version_writes {
            return Err(sqlx::Error::PoolClosed);
        }
        let row = self
            .versions
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(sqlx::Error::RowNotFound)?;
        row.version = version;
        Ok(())
    }

    async fn find_miner_by_name(&mut self, name: &str) -> Result<Option<Miner>, sqlx::Error> {
        self.check_lookup()?;
        if self.hide_existing_names {
            return Ok(None);
        }
        Ok(self.miners.iter().find(|m| m.name == name).cloned())
    }

    async fn insert_miner(&mut self, name: &str) -> Result<Miner, sqlx::Error> {
        if self.miners.iter().any(|m| m.name == name) {
            return Err(Self::unique_violation("miners"));
        }
        let row = Miner { id: self.next_id(), name: name.to_string(), miner_software_algo_id: None };
        self.miners.push(row.clone());
        Ok(row)
    }

    async fn find_algorithm(&mut self, id: i64) -> Result<Option<Algorithm>, sqlx::Error> {
        self.check_lookup()?;
        Ok(self.algorithms.iter().find(|a| a.id == id).cloned())
    }

    async fn find_algorithm_by_name(&mut self, name: &str) -> Result<Option<Algorithm>, sqlx::Error> {
        self.check_lookup()?;
        if self.hide_existing_names {
            return Ok(None);
        }
        Ok(self.algorithms.iter().find(|a| a.name == name).cloned())
    }

    async fn insert_algorithm(&mut self, name: &str) -> Result<Algorithm, sqlx::Error> {
        if self.algorithms.iter().any(|a| a.name == name) {
            return Err(Self::unique_violation("algorithms"));
        }
        let id = self.add_algorithm(name);
        Ok(Algorithm { id, name: name.to_string() })
    }

    async fn first_pool_for_algorithm(&mut self, algorithm_id: i64) -> Result<Option<Pool>, sqlx::Error> {
        self.check_lookup()?;
        Ok(self
            .pools
            .iter()
            .filter(|p| p.algorithm_id == algorithm_id)
            .min_by_key(|p| p.id)
            .cloned())
    }
}
