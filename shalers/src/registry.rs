//! Dialect lookup by engine name.
//!
//! The builtin set is closed: every engine ships as a unit struct compiled
//! into this crate, so `lookup` can hand out `'static` references and adding
//! an engine means adding a struct and one map entry here.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::dialect::{BigQueryDialect, Dialect, DuckDbDialect, PostgresDialect};
use crate::error::{Result, ShaleError};

static BIGQUERY: BigQueryDialect = BigQueryDialect;
static DUCKDB: DuckDbDialect = DuckDbDialect;
static POSTGRES: PostgresDialect = PostgresDialect;

static DIALECTS: Lazy<BTreeMap<&'static str, &'static dyn Dialect>> = Lazy::new(|| {
    let mut map: BTreeMap<&'static str, &'static dyn Dialect> = BTreeMap::new();
    map.insert(BIGQUERY.name(), &BIGQUERY);
    map.insert(DUCKDB.name(), &DUCKDB);
    map.insert(POSTGRES.name(), &POSTGRES);
    // Common alternate spelling
    map.insert("postgresql", &POSTGRES);
    map
});

/// Look up a dialect by engine name (case-insensitive).
///
/// Unknown names are a recoverable error whose message lists the valid
/// engines, so callers can prompt with the supported set.
pub fn lookup(name: &str) -> Result<&'static dyn Dialect> {
    let key = name.to_ascii_lowercase();
    match DIALECTS.get(key.as_str()) {
        Some(dialect) => Ok(*dialect),
        None => {
            tracing::debug!(dialect = %name, "dialect lookup miss");
            Err(ShaleError::UnknownDialect {
                name: name.to_string(),
                known: dialect_names().join(", "),
            })
        }
    }
}

/// Canonical names of the builtin dialects, sorted.
pub fn dialect_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = DIALECTS.values().map(|d| d.name()).collect();
    names.sort_unstable();
    names.dedup();
    names
}
