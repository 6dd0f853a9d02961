//! Schema deployer
//!
//! Materializes the mock tables against a connected store:
//! 1. Order tables so every referenced table is created before its dependents
//! 2. Run `CREATE TABLE IF NOT EXISTS` for each, inside one transaction
//!
//! Re-running against a store that already has the tables is a no-op.

use crate::error::{FixtureError, Result};
use crate::schema::definition::{quote_ident, TableDef};
use crate::schema::registry::TABLES;
use deadpool_postgres::Pool;
use std::collections::HashMap;
use tracing::{debug, info};

pub struct SchemaDeployer {
    tables: Vec<TableDef>,
}

impl SchemaDeployer {
    /// Deployer for the full mock warehouse
    pub fn new() -> Self {
        Self::with_tables(TABLES.to_vec())
    }

    pub fn with_tables(tables: Vec<TableDef>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    /// Create every table that does not exist yet. Either all are created or
    /// none are; store errors come back unchanged.
    pub async fn create_all(&self, pool: &Pool) -> Result<()> {
        let ordered = order_by_dependencies(&self.tables)?;

        let mut client = pool.get().await?;
        let tx = client.transaction().await?;

        for table in &ordered {
            debug!("Creating table {} if absent", table.name);
            tx.batch_execute(&table.create_sql()).await?;
        }

        tx.commit().await?;

        info!("Schema materialized: {} tables", ordered.len());
        Ok(())
    }

    /// Drop every table, dependents first.
    pub async fn drop_all(&self, pool: &Pool) -> Result<()> {
        let mut ordered = order_by_dependencies(&self.tables)?;
        ordered.reverse();

        let mut client = pool.get().await?;
        let tx = client.transaction().await?;

        for table in &ordered {
            tx.batch_execute(&table.drop_sql()).await?;
        }

        tx.commit().await?;

        info!("Dropped {} tables", ordered.len());
        Ok(())
    }

    /// Empty every table and reset their key sequences, leaving the tables
    /// in place.
    pub async fn truncate_all(&self, pool: &Pool) -> Result<()> {
        if self.tables.is_empty() {
            return Ok(());
        }

        let names: Vec<String> = self.tables.iter().map(|t| quote_ident(t.name)).collect();
        let sql = format!("TRUNCATE TABLE {} RESTART IDENTITY", names.join(", "));

        let client = pool.get().await?;
        client.batch_execute(&sql).await?;

        debug!("Truncated {} tables", names.len());
        Ok(())
    }

    /// Tables in the connection's current schema, sorted by name
    pub async fn list_tables(&self, pool: &Pool) -> Result<Vec<String>> {
        let client = pool.get().await?;

        let rows = client.query(LIST_TABLES_SQL, &[]).await?;

        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    pub async fn row_count(&self, pool: &Pool, table: &str) -> Result<i64> {
        let client = pool.get().await?;
        let row = client
            .query_one(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)), &[])
            .await?;
        Ok(row.get(0))
    }
}

impl Default for SchemaDeployer {
    fn default() -> Self {
        Self::new()
    }
}

/// Order tables by their foreign keys (topological sort). Ties are broken
/// by name so the order is stable.
pub fn order_by_dependencies(tables: &[TableDef]) -> Result<Vec<TableDef>> {
    let name_to_idx: HashMap<&str, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name, i))
        .collect();

    let mut in_degree: Vec<usize> = vec![0; tables.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];

    for (idx, table) in tables.iter().enumerate() {
        for dep_name in table.depends_on() {
            // References outside the set are assumed to exist already
            if let Some(&dep_idx) = name_to_idx.get(dep_name) {
                dependents[dep_idx].push(idx);
                in_degree[idx] += 1;
            }
        }
    }

    // Kahn's algorithm; the queue is kept sorted descending so pop() yields
    // the alphabetically first ready table
    let by_name_desc = |a: &usize, b: &usize| tables[*b].name.cmp(tables[*a].name);

    let mut queue: Vec<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| i)
        .collect();
    queue.sort_by(by_name_desc);

    let mut ordered_indices = Vec::with_capacity(tables.len());

    while let Some(idx) = queue.pop() {
        ordered_indices.push(idx);

        for &dependent_idx in &dependents[idx] {
            in_degree[dependent_idx] -= 1;
            if in_degree[dependent_idx] == 0 {
                queue.push(dependent_idx);
                queue.sort_by(by_name_desc);
            }
        }
    }

    if ordered_indices.len() != tables.len() {
        let remaining: Vec<&str> = tables
            .iter()
            .enumerate()
            .filter(|(i, _)| !ordered_indices.contains(i))
            .map(|(_, t)| t.name)
            .collect();

        return Err(FixtureError::CircularDependency {
            tables: remaining.join(", "),
        });
    }

    Ok(ordered_indices.into_iter().map(|i| tables[i]).collect())
}

// Unqualified CREATE TABLE lands in current_schema(), so list from there too
const LIST_TABLES_SQL: &str = r#"
    SELECT table_name
    FROM information_schema.tables
    WHERE table_schema = current_schema()
    AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;
