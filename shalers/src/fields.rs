//! Planner hand-off types for dialect rendering.
//!
//! The planner describes what to render as plain SQL text plus structural
//! metadata: field expressions with output names, group-set ids, pre-rendered
//! ORDER BY text and numeric limits. Dialects consume these types and never
//! parse the embedded SQL.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column name of the fan-out side table produced by `sql_group_set_table`.
pub const GROUP_SET_COLUMN: &str = "group_set";

/// Column name injected by `sql_unnest_alias` when a distinct key is needed.
pub const DISTINCT_KEY_COLUMN: &str = "__distinct_key";

/// One projected field: a raw SQL expression and the output column name it
/// should be exposed under. The expression is opaque text; the output name is
/// an identifier and gets quoted by the dialect at the rendering boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub sql_expression: String,
    pub sql_output_name: String,
}

impl FieldDescriptor {
    pub fn new(sql_expression: impl Into<String>, sql_output_name: impl Into<String>) -> Self {
        FieldDescriptor {
            sql_expression: sql_expression.into(),
            sql_output_name: sql_output_name.into(),
        }
    }
}

/// An ordered list of fields. Order is meaningful: struct and object values
/// built from the list keep it. Output names must be unique within a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldList(Vec<FieldDescriptor>);

impl FieldList {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        FieldList(fields)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, field: FieldDescriptor) {
        self.0.push(field);
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|f| f.sql_output_name.as_str())
    }

    /// True when every output name appears exactly once.
    pub fn names_unique(&self) -> bool {
        let mut seen = std::collections::BTreeSet::new();
        self.0.iter().all(|f| seen.insert(f.sql_output_name.as_str()))
    }
}

impl FromIterator<FieldDescriptor> for FieldList {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        FieldList(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Identifier of one aggregation granularity. Ids are dense, starting at 0
/// for the outermost grain; a query plan with `group_set_count = n` tags rows
/// with values `0..=n`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct GroupSet(pub u32);

impl fmt::Display for GroupSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A complete, pre-rendered `ORDER BY ...` clause. The planner renders it;
/// dialects splice it into aggregate calls as literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBy(String);

impl OrderBy {
    pub fn new(clause: impl Into<String>) -> Self {
        OrderBy(clause.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
