pub mod config;
pub mod dialect;
pub mod emitter;
pub mod error;
pub mod executor;
pub mod fields;
pub mod fragment;
pub mod plan;
pub mod registry;
pub mod runner;

use crate::error::Result;

/// Look up a dialect by name and render the segment's SQL with it.
pub fn generate_sql(plan: &SegmentPlan, dialect_name: &str) -> Result<String> {
    let dialect = registry::lookup(dialect_name)?;
    SqlEmitter::new(dialect).emit_segment(plan)
}

pub use config::ShaleConfig;
pub use dialect::{BigQueryDialect, Dialect, DuckDbDialect, PostgresDialect};
pub use emitter::{SqlEmitter, SOURCE_ALIAS};
pub use error::ShaleError;
pub use executor::QueryResult;
pub use fields::{FieldDescriptor, FieldList, GroupSet, OrderBy};
pub use plan::{PlanCatalog, SegmentPlan, SourceRef, TurtlePlan, TurtleShape, UnnestPlan};
pub use registry::{dialect_names, lookup};
#[cfg(feature = "duckdb")]
pub use runner::DuckDbRunner;
pub use runner::SqlRunner;
