//! Segment SQL assembly.
//!
//! The emitter walks a planner-supplied `SegmentPlan` and calls only the
//! `Dialect` contract to build one complete SELECT. It owns the statement
//! skeleton (select list, FROM, join keywords, GROUP BY); every
//! engine-specific spelling comes from the dialect.

use crate::dialect::Dialect;
use crate::error::{Result, ShaleError};
use crate::fields::GroupSet;
use crate::plan::{SegmentPlan, SourceRef, TurtlePlan, TurtleShape};

/// Alias under which the segment's row source is visible to plan
/// expressions (`base.state`, `base.children`, ...).
pub const SOURCE_ALIAS: &str = "base";

pub struct SqlEmitter<'d> {
    dialect: &'d dyn Dialect,
}

impl<'d> SqlEmitter<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Render the complete SELECT for one aggregation segment.
    pub fn emit_segment(&self, plan: &SegmentPlan) -> Result<String> {
        self.validate(plan)?;
        tracing::debug!(
            dialect = self.dialect.name(),
            plan = %plan.name,
            group_sets = plan.group_set_count + 1,
            "emitting segment sql"
        );

        // Select list: dimensions, then measures, then turtles. Dimensions
        // are extracted per group set 0; measures arrive pre-gated.
        let mut items: Vec<String> = Vec::new();
        for dim in &plan.dimensions {
            items.push(format!(
                "{} AS {}",
                self.dialect.sql_any_value(GroupSet(0), &dim.sql_expression),
                self.dialect.quote_ident(&dim.sql_output_name)
            ));
        }
        for measure in &plan.measures {
            items.push(format!(
                "{} AS {}",
                measure.sql_expression,
                self.dialect.quote_ident(&measure.sql_output_name)
            ));
        }
        for turtle in &plan.turtles {
            items.push(format!(
                "{} AS {}",
                self.turtle_expr(turtle),
                self.dialect.quote_ident(&turtle.name)
            ));
        }

        let mut sql = format!(
            "SELECT {} FROM {} AS {SOURCE_ALIAS}",
            items.join(", "),
            self.render_source(&plan.source)
        );

        // Unnests widen the row source before the fan-out multiplies it
        for unnest in &plan.unnests {
            sql.push_str(&format!(
                " LEFT JOIN {} ON true",
                self.dialect.sql_unnest_alias(
                    &unnest.source_expr,
                    &unnest.alias,
                    &unnest.fields,
                    unnest.need_distinct_key
                )
            ));
        }

        sql.push_str(&format!(
            " CROSS JOIN {}",
            self.dialect.sql_group_set_table(plan.group_set_count)
        ));

        if !plan.dimensions.is_empty() {
            let groups: Vec<&str> = plan
                .dimensions
                .iter()
                .map(|d| d.sql_expression.as_str())
                .collect();
            sql.push_str(&format!(" GROUP BY {}", groups.join(", ")));
        }

        if let Some(order_by) = &plan.order_by {
            sql.push(' ');
            sql.push_str(order_by.as_str());
        }
        if let Some(limit) = plan.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        Ok(sql)
    }

    fn turtle_expr(&self, turtle: &TurtlePlan) -> String {
        match turtle.shape {
            TurtleShape::List => self.dialect.sql_aggregate_turtle(
                turtle.group_set,
                &turtle.fields,
                turtle.order_by.as_ref(),
                turtle.limit,
            ),
            TurtleShape::Struct => self
                .dialect
                .sql_any_value_turtle(turtle.group_set, &turtle.fields),
            TurtleShape::InlineMeasures => self
                .dialect
                .sql_coalesce_measures_inline(turtle.group_set, &turtle.fields),
        }
    }

    fn render_source(&self, source: &SourceRef) -> String {
        match source {
            SourceRef::Table(table) => self.dialect.quote_table_name(table),
            SourceRef::Sql(sql) => format!("({sql})"),
        }
    }

    /// Plans arrive from files or other processes, so structural problems
    /// are reported as errors rather than panics.
    fn validate(&self, plan: &SegmentPlan) -> Result<()> {
        let check = |condition: bool, message: String| -> Result<()> {
            if condition {
                Ok(())
            } else {
                Err(ShaleError::Validation(message))
            }
        };

        check(
            !(plan.dimensions.is_empty() && plan.measures.is_empty() && plan.turtles.is_empty()),
            format!("plan '{}' selects nothing", plan.name),
        )?;

        let mut seen = std::collections::BTreeSet::new();
        for name in plan
            .dimensions
            .output_names()
            .chain(plan.measures.output_names())
            .chain(plan.turtles.iter().map(|t| t.name.as_str()))
        {
            check(
                seen.insert(name),
                format!("plan '{}' has duplicate output name '{name}'", plan.name),
            )?;
        }

        for turtle in &plan.turtles {
            check(
                !turtle.fields.is_empty(),
                format!("turtle '{}' has no fields", turtle.name),
            )?;
            check(
                turtle.fields.names_unique(),
                format!("turtle '{}' has duplicate field names", turtle.name),
            )?;
            check(
                turtle.group_set.0 <= plan.group_set_count,
                format!(
                    "turtle '{}' uses group set {} outside 0..={}",
                    turtle.name, turtle.group_set, plan.group_set_count
                ),
            )?;
        }

        let mut aliases = std::collections::BTreeSet::new();
        for unnest in &plan.unnests {
            check(
                !unnest.alias.is_empty(),
                format!("unnest of '{}' is missing an alias", unnest.source_expr),
            )?;
            check(
                aliases.insert(unnest.alias.as_str()),
                format!("duplicate unnest alias '{}'", unnest.alias),
            )?;
        }

        Ok(())
    }
}
