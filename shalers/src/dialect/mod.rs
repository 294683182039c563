//! SQL dialect abstractions for the supported engines.
//!
//! Each dialect is implemented in its own file. Dialect implementations are
//! pure text generators with no engine dependencies, so all of them are
//! always compiled; only the execution harness is feature-gated.

use crate::fields::{FieldList, GroupSet, OrderBy};

/// Engine-specific rendering of the multi-granularity aggregation plan.
///
/// The planner assigns group sets and hands over raw expression text; the
/// dialect maps each logical construct to engine-correct SQL. Every method
/// must be implemented, there are no partial dialects. Implementations hold
/// no state and are shared freely across threads.
///
/// Structural contract violations (an empty field list where a struct has to
/// be built) panic: the caller is expected to validate external input before
/// reaching the dialect boundary.
pub trait Dialect: std::fmt::Debug + Send + Sync {
    /// Registry key, e.g. `"duckdb"`.
    fn name(&self) -> &'static str;

    /// Quote a possibly dot-qualified table path.
    fn quote_table_name(&self, table: &str) -> String;

    /// Quote a single identifier (output aliases, column names).
    fn quote_ident(&self, ident: &str) -> String;

    /// Side table with a single `group_set` column holding the dense values
    /// `0..=group_set_count` (one row per group set, `count + 1` rows total).
    /// Returns a table expression; the emitter attaches it with `CROSS JOIN`.
    fn sql_group_set_table(&self, group_set_count: u32) -> String;

    /// Extract a single value from rows tagged with `group_set`; rows tagged
    /// with any other set never contribute.
    fn sql_any_value(&self, group_set: GroupSet, field_expr: &str) -> String;

    /// Collect one struct per qualifying row of `group_set` into an ordered
    /// collection. Rows outside the set are excluded, never padded with NULL
    /// entries. `order_by` is spliced as literal text; `limit` caps the
    /// collection length.
    fn sql_aggregate_turtle(
        &self,
        group_set: GroupSet,
        fields: &FieldList,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
    ) -> String;

    /// Build a single struct from `fields` within one group set.
    fn sql_any_value_turtle(&self, group_set: GroupSet, fields: &FieldList) -> String;

    /// Re-expose the group-set-0 result column `{name}__0` under the output
    /// name `sql_name`. Returns a full select item including the alias.
    fn sql_any_value_last_turtle(&self, name: &str, sql_name: &str) -> String;

    /// Struct of measures for one group set, falling back to a struct with
    /// the same field names and order but all-NULL members when the set
    /// produced no rows. Downstream consumers rely on the shape never
    /// changing between the populated and empty cases.
    fn sql_coalesce_measures_inline(&self, group_set: GroupSet, fields: &FieldList) -> String;

    /// Flatten an array-valued `source` expression into rows aliased as
    /// `alias`. The returned text is the right-hand side of
    /// `LEFT JOIN {expr} ON true`; the emitter owns the join keywords.
    /// With `need_distinct_key` a synthesized per-row unique
    /// `__distinct_key` column is injected after flattening, so every
    /// flattened row carries its own key.
    fn sql_unnest_alias(
        &self,
        source: &str,
        alias: &str,
        fields: &FieldList,
        need_distinct_key: bool,
    ) -> String;

    /// Deterministic numeric hash of a distinct key's text representation,
    /// built from two fixed-width segments of an MD5 digest combined with
    /// multiplier 4294967296 and scaled by 0.000000001. Equal keys always
    /// produce equal numbers, and sums over large distinct-key populations
    /// stay inside the engine's decimal range.
    fn sql_sum_distinct_hashed_key(&self, sql_distinct_key: &str) -> String;

    /// Engine-native UUID generator, distinct per evaluated row.
    fn sql_generate_uuid(&self) -> String;
}

/// Shared structural checks for the struct-building operations.
pub(crate) fn expect_struct_fields(operation: &str, fields: &FieldList) {
    assert!(
        !fields.is_empty(),
        "{operation}: field list must not be empty"
    );
    assert!(
        fields.names_unique(),
        "{operation}: field output names must be unique"
    );
}

mod bigquery;
pub use bigquery::BigQueryDialect;

mod duckdb;
pub use duckdb::DuckDbDialect;

mod postgres;
pub use postgres::PostgresDialect;
