//! Renders declared table shapes into additive, idempotent PostgreSQL DDL.
//!
//! Every statement is guarded with `IF NOT EXISTS`, so applying a table twice
//! leaves the stored structure unchanged. Nothing is ever dropped or altered in
//! place; a shape change only ever adds tables, columns and indexes.

use core_types::{Column, TableDef};

/// Column definition as it appears after the column name.
fn column_definition(column: &Column) -> String {
    let mut def = column.ty.sql_type().to_string();
    if !column.nullable {
        def.push_str(" NOT NULL");
        // References have no sensible zero value.
        if column.references.is_none() {
            def.push_str(" DEFAULT ");
            def.push_str(column.ty.default_literal());
        }
    }
    if let Some(target) = column.references {
        def.push_str(&format!(" REFERENCES {target} (id)"));
    }
    def
}

/// Renders all statements needed to bring `table` up to its declared shape, in
/// execution order.
pub fn table_ddl(table: &TableDef) -> Vec<String> {
    let mut statements = Vec::with_capacity(1 + table.columns.len() * 2);

    let mut columns = vec!["id BIGSERIAL PRIMARY KEY".to_string()];
    columns.extend(
        table
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, column_definition(c))),
    );
    statements.push(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table.name,
        columns.join(", ")
    ));

    // Tables created by an older schema version pick up new columns here.
    for column in table.columns {
        statements.push(format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {}",
            table.name,
            column.name,
            column_definition(column)
        ));
    }

    for column in table.columns {
        if column.unique {
            statements.push(format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS ux_{table}_{column} ON {table} ({column})",
                table = table.name,
                column = column.name
            ));
        } else if column.references.is_some() {
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS ix_{table}_{column} ON {table} ({column})",
                table = table.name,
                column = column.name
            ));
        }
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CATALOG, Entity, Miner, PoolStats, Version};

    #[test]
    fn every_statement_is_guarded() {
        for table in CATALOG {
            for statement in table_ddl(table) {
                assert!(statement.contains("IF NOT EXISTS"), "unguarded: {statement}");
                assert!(!statement.to_uppercase().contains("DROP"), "destructive: {statement}");
            }
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        for table in CATALOG {
            assert_eq!(table_ddl(table), table_ddl(table));
        }
    }

    #[test]
    fn versions_table_has_unique_name() {
        let ddl = table_ddl(&Version::TABLE);
        assert_eq!(
            ddl[0],
            "CREATE TABLE IF NOT EXISTS versions (id BIGSERIAL PRIMARY KEY, \
             name TEXT NOT NULL DEFAULT '', version BIGINT NOT NULL DEFAULT 0)"
        );
        assert!(ddl.contains(
            &"CREATE UNIQUE INDEX IF NOT EXISTS ux_versions_name ON versions (name)".to_string()
        ));
    }

    #[test]
    fn nullable_reference_has_no_default() {
        let ddl = table_ddl(&PoolStats::TABLE);
        assert!(ddl.contains(
            &"ALTER TABLE pool_stats ADD COLUMN IF NOT EXISTS coin_price_id BIGINT REFERENCES coin_prices (id)"
                .to_string()
        ));
        assert!(ddl.contains(
            &"ALTER TABLE pool_stats ADD COLUMN IF NOT EXISTS pool_id BIGINT NOT NULL REFERENCES pools (id)"
                .to_string()
        ));
        assert!(ddl.contains(
            &"CREATE INDEX IF NOT EXISTS ix_pool_stats_pool_id ON pool_stats (pool_id)".to_string()
        ));
    }

    #[test]
    fn miners_are_unique_by_name() {
        let ddl = table_ddl(&Miner::TABLE);
        assert!(ddl.iter().any(|s| s == "CREATE UNIQUE INDEX IF NOT EXISTS ux_miners_name ON miners (name)"));
    }
}
