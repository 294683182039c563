//! Planner-supplied segment plans.
//!
//! A segment plan is the hand-off format from the upstream query planner:
//! group sets are already assigned, measure expressions are already gated,
//! and everything SQL-shaped is plain text. Plans deserialize from YAML or
//! JSON so they can cross a process boundary.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glob::glob;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShaleError};
use crate::fields::{FieldList, GroupSet, OrderBy};

/// Row source of a segment: a table reference or an inline subquery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRef {
    /// Possibly dot-qualified table path, quoted by the dialect.
    Table(String),
    /// Raw subquery text, spliced verbatim inside parentheses.
    Sql(String),
}

/// How a turtle's result is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurtleShape {
    /// Ordered collection of one struct per qualifying row.
    List,
    /// A single struct extracted from the group set.
    Struct,
    /// A struct of measures with a NULL-membered fallback of the same shape.
    InlineMeasures,
}

/// One nested sub-aggregation, bound to its own group set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurtlePlan {
    pub name: String,
    pub group_set: GroupSet,
    pub shape: TurtleShape,
    pub fields: FieldList,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// One array-valued expression to flatten into the row source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnnestPlan {
    pub source_expr: String,
    pub alias: String,
    #[serde(default)]
    pub fields: FieldList,
    #[serde(default)]
    pub need_distinct_key: bool,
}

/// A complete aggregation segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub name: String,
    pub source: SourceRef,
    /// Group-set-0 dimensions; the segment groups by their raw expressions.
    #[serde(default)]
    pub dimensions: FieldList,
    /// Measure expressions, already aggregated and gated by the planner.
    #[serde(default)]
    pub measures: FieldList,
    #[serde(default)]
    pub unnests: Vec<UnnestPlan>,
    #[serde(default)]
    pub turtles: Vec<TurtlePlan>,
    /// Highest group set id; the fan-out covers `0..=group_set_count`.
    #[serde(default)]
    pub group_set_count: u32,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl SegmentPlan {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}

/// Named plans loaded from a directory of YAML files.
#[derive(Debug, Default, Clone)]
pub struct PlanCatalog {
    plans: BTreeMap<String, SegmentPlan>,
}

impl PlanCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_plans(plans: Vec<SegmentPlan>) -> Self {
        let mut catalog = PlanCatalog::new();
        for plan in plans {
            catalog.plans.insert(plan.name.clone(), plan);
        }
        catalog
    }

    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(ShaleError::Validation(format!(
                "plan directory not found: {}",
                dir.display()
            )));
        }
        let mut catalog = PlanCatalog::new();
        for pattern in ["*.yml", "*.yaml"] {
            for entry in glob(&format!("{}/{pattern}", dir.display()))
                .map_err(|e| ShaleError::Other(e.into()))?
                .flatten()
            {
                catalog.load_plan_file(&entry)?;
            }
        }
        tracing::debug!(count = catalog.plans.len(), dir = %dir.display(), "loaded plans");
        Ok(catalog)
    }

    fn load_plan_file(&mut self, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path)?;
        let plan = SegmentPlan::from_yaml_str(&contents)?;
        self.plans.insert(plan.name.clone(), plan);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SegmentPlan> {
        self.plans.get(name)
    }

    pub fn plan_names(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
