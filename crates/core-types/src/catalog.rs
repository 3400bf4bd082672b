//! Declared table shapes for every persisted entity.
//!
//! The shapes here are the single source of truth for the stored structure. The
//! database crate renders them into additive, idempotent DDL; whenever a shape
//! changes in a way that needs migrating, bump [`SCHEMA_VERSION`].

use crate::entities::{
    Algorithm, Coin, CoinPrice, Miner, MinerMinerSoftware, MinerSoftware, MinerSoftwareAlgo,
    MinerStats, Pool, PoolStats, Provider, Version,
};
use crate::enums::ColumnType;

/// The schema version the code in this workspace expects.
pub const SCHEMA_VERSION: i64 = 5;

/// The `versions.name` value that holds the schema marker.
pub const DATABASE_VERSION_NAME: &str = "database";

/// A single declared column. The `id` primary key is implicit and not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    /// Table whose `id` this column references.
    pub references: Option<&'static str>,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            unique: false,
            references: None,
        }
    }

    pub const fn nullable(self) -> Self {
        Self { nullable: true, ..self }
    }

    pub const fn unique(self) -> Self {
        Self { unique: true, ..self }
    }

    /// Makes the column a foreign key to `table (id)`.
    ///
    /// A non-nullable reference gets no `DEFAULT`, so it can only be added
    /// together with its table. A reference added to an existing table in a
    /// later schema version must be marked [`Column::nullable`], otherwise
    /// `ADD COLUMN` fails on populated tables.
    pub const fn references(self, table: &'static str) -> Self {
        Self {
            references: Some(table),
            ..self
        }
    }
}

/// The declared shape of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Ties a row struct to its declared table.
pub trait Entity {
    const TABLE: TableDef;
}

use ColumnType::*;

impl Entity for Version {
    const TABLE: TableDef = TableDef {
        name: "versions",
        columns: &[
            Column::new("name", Text).unique(),
            Column::new("version", BigInt),
        ],
    };
}

impl Entity for Provider {
    const TABLE: TableDef = TableDef {
        name: "providers",
        columns: &[
            Column::new("name", Text).unique(),
            Column::new("website", Text),
            Column::new("fee", Numeric),
        ],
    };
}

impl Entity for Algorithm {
    const TABLE: TableDef = TableDef {
        name: "algorithms",
        columns: &[Column::new("name", Text).unique()],
    };
}

impl Entity for Coin {
    const TABLE: TableDef = TableDef {
        name: "coins",
        columns: &[
            Column::new("coingecko_id", Text),
            Column::new("name", Text),
            Column::new("symbol", Text),
            Column::new("added", Timestamp),
        ],
    };
}

impl Entity for CoinPrice {
    const TABLE: TableDef = TableDef {
        name: "coin_prices",
        columns: &[
            Column::new("coin_id", BigInt).references("coins"),
            Column::new("instant", Timestamp),
            Column::new("price", Numeric),
        ],
    };
}

impl Entity for Pool {
    const TABLE: TableDef = TableDef {
        name: "pools",
        columns: &[
            Column::new("provider_id", BigInt).references("providers"),
            Column::new("algorithm_id", BigInt).references("algorithms"),
            Column::new("name", Text),
            Column::new("url", Text),
            Column::new("port", Integer),
            Column::new("mh_factor", Double),
        ],
    };
}

impl Entity for PoolStats {
    const TABLE: TableDef = TableDef {
        name: "pool_stats",
        columns: &[
            Column::new("pool_id", BigInt).references("pools"),
            Column::new("instant", Timestamp),
            Column::new("current_hashrate", BigInt),
            Column::new("workers", Integer),
            Column::new("profit_estimate", Numeric),
            Column::new("profit_actual_24h", Numeric),
            Column::new("coin_price_id", BigInt)
                .nullable()
                .references("coin_prices"),
        ],
    };
}

impl Entity for MinerSoftware {
    const TABLE: TableDef = TableDef {
        name: "miner_softwares",
        columns: &[
            Column::new("name", Text).unique(),
            Column::new("website", Text),
            Column::new("executable_prefix", Text),
            Column::new("algo_param", Text),
            Column::new("pool_param", Text),
            Column::new("wallet_param", Text),
            Column::new("password_param", Text),
            Column::new("log_file_param", Text),
            Column::new("other_params", Text),
            Column::new("discard_lines", Integer),
        ],
    };
}

impl Entity for MinerSoftwareAlgo {
    const TABLE: TableDef = TableDef {
        name: "miner_software_algos",
        columns: &[
            Column::new("miner_software_id", BigInt).references("miner_softwares"),
            Column::new("algorithm_id", BigInt).references("algorithms"),
            Column::new("name", Text),
            Column::new("extra_params", Text),
            Column::new("excluded", Boolean),
        ],
    };
}

impl Entity for Miner {
    const TABLE: TableDef = TableDef {
        name: "miners",
        columns: &[
            Column::new("name", Text).unique(),
            Column::new("miner_software_algo_id", BigInt)
                .nullable()
                .references("miner_software_algos"),
        ],
    };
}

impl Entity for MinerMinerSoftware {
    const TABLE: TableDef = TableDef {
        name: "miner_miner_softwares",
        columns: &[
            Column::new("miner_id", BigInt).references("miners"),
            Column::new("miner_software_id", BigInt).references("miner_softwares"),
            Column::new("file_path", Text),
        ],
    };
}

impl Entity for MinerStats {
    const TABLE: TableDef = TableDef {
        name: "miner_stats",
        columns: &[
            Column::new("miner_id", BigInt).references("miners"),
            Column::new("miner_software_id", BigInt).references("miner_softwares"),
            Column::new("algorithm_id", BigInt).references("algorithms"),
            Column::new("instant", Timestamp),
            Column::new("work_per_second", Double),
            Column::new("mh_factor", Double),
        ],
    };
}

/// Every table, ordered so that a referenced table always precedes the tables
/// referencing it.
pub const CATALOG: &[TableDef] = &[
    Version::TABLE,
    Provider::TABLE,
    Algorithm::TABLE,
    Coin::TABLE,
    CoinPrice::TABLE,
    Pool::TABLE,
    PoolStats::TABLE,
    MinerSoftware::TABLE,
    MinerSoftwareAlgo::TABLE,
    Miner::TABLE,
    MinerMinerSoftware::TABLE,
    MinerStats::TABLE,
];
