pub mod catalog;
pub mod entities;
pub mod enums;
pub mod error;

// Re-export the core types to provide a clean public API.
pub use catalog::{CATALOG, Column, DATABASE_VERSION_NAME, Entity, SCHEMA_VERSION, TableDef};
pub use entities::{
    Algorithm, Coin, CoinPrice, Miner, MinerMinerSoftware, MinerSoftware, MinerSoftwareAlgo,
    MinerStats, NewCoinPrice, NewMinerStats, NewPoolStats, Pool, PoolStats, Provider, Version,
};
pub use enums::ColumnType;
pub use error::CoreError;
