//! PostgreSQL dialect implementation.
//!
//! Postgres has no struct values, so turtles are built as JSONB objects and
//! any-value extraction uses `(ARRAY_AGG(..) FILTER (..))[1]` (9.4+ FILTER).

use crate::fields::{FieldList, GroupSet, OrderBy};
use crate::fragment;

use super::{expect_struct_fields, Dialect};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// `'name', expr, ...` argument body for JSONB_BUILD_OBJECT.
    fn object_body(&self, fields: &FieldList) -> String {
        fragment::comma_list(fields.iter().map(|f| {
            format!(
                "{}, {}",
                fragment::string_literal(&f.sql_output_name),
                f.sql_expression
            )
        }))
    }

    fn null_object_body(&self, fields: &FieldList) -> String {
        fragment::comma_list(
            fields
                .iter()
                .map(|f| format!("{}, NULL", fragment::string_literal(&f.sql_output_name))),
        )
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_table_name(&self, table: &str) -> String {
        fragment::quote_table_path(table, fragment::quote_double)
    }

    fn quote_ident(&self, ident: &str) -> String {
        fragment::quote_double(ident)
    }

    fn sql_group_set_table(&self, group_set_count: u32) -> String {
        // The set-returning function's alias names both the table and its
        // single column
        format!("GENERATE_SERIES(0,{group_set_count},1) AS group_set")
    }

    fn sql_any_value(&self, group_set: GroupSet, field_expr: &str) -> String {
        format!(
            "(ARRAY_AGG({field_expr}) FILTER (WHERE group_set={group_set} \
             AND ({field_expr}) IS NOT NULL))[1]"
        )
    }

    fn sql_aggregate_turtle(
        &self,
        group_set: GroupSet,
        fields: &FieldList,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
    ) -> String {
        expect_struct_fields("sql_aggregate_turtle", fields);
        let mut element = format!("JSONB_BUILD_OBJECT({})", self.object_body(fields));
        if let Some(order_by) = order_by {
            element.push(' ');
            element.push_str(order_by.as_str());
        }
        let aggregate = format!("ARRAY_AGG({element}) FILTER (WHERE group_set={group_set})");
        let collected = match limit {
            // Array slices are 1-based and inclusive: [1:n] keeps n entries
            Some(limit) => format!("({aggregate})[1:{limit}]"),
            None => aggregate,
        };
        format!("COALESCE(TO_JSONB({collected}), '[]'::JSONB)")
    }

    fn sql_any_value_turtle(&self, group_set: GroupSet, fields: &FieldList) -> String {
        expect_struct_fields("sql_any_value_turtle", fields);
        format!(
            "(ARRAY_AGG(JSONB_BUILD_OBJECT({})) FILTER (WHERE group_set={group_set}))[1]",
            self.object_body(fields)
        )
    }

    fn sql_any_value_last_turtle(&self, name: &str, sql_name: &str) -> String {
        format!(
            "(ARRAY_AGG({name}__0) FILTER (WHERE group_set=0 AND {name}__0 IS NOT NULL))[1] \
             AS {}",
            self.quote_ident(sql_name)
        )
    }

    fn sql_coalesce_measures_inline(&self, group_set: GroupSet, fields: &FieldList) -> String {
        expect_struct_fields("sql_coalesce_measures_inline", fields);
        format!(
            "COALESCE((ARRAY_AGG(JSONB_BUILD_OBJECT({})) \
             FILTER (WHERE group_set={group_set}))[1], JSONB_BUILD_OBJECT({}))",
            self.object_body(fields),
            self.null_object_body(fields)
        )
    }

    fn sql_unnest_alias(
        &self,
        source: &str,
        alias: &str,
        _fields: &FieldList,
        need_distinct_key: bool,
    ) -> String {
        let alias = self.quote_ident(alias);
        if need_distinct_key {
            // GEN_RANDOM_UUID() is volatile, so the outer select evaluates
            // it once per flattened element
            format!(
                "LATERAL (SELECT GEN_RANDOM_UUID() AS __distinct_key, __row.value \
                 FROM JSONB_ARRAY_ELEMENTS({source}) AS __row(value)) AS {alias}"
            )
        } else {
            format!("LATERAL JSONB_ARRAY_ELEMENTS({source}) AS {alias}")
        }
    }

    fn sql_sum_distinct_hashed_key(&self, sql_distinct_key: &str) -> String {
        let key = format!("CAST({sql_distinct_key} AS VARCHAR)");
        // Hex segments become integers through the ('x' || hex)::bit(n)
        // trick; 60 + 32 bits combined under DECIMAL(65,0)
        let upper = format!(
            "CAST(('x' || SUBSTR(MD5({key}), 1, 15))::bit(60)::bigint AS DECIMAL(65,0)) \
             * 4294967296"
        );
        let lower =
            format!("CAST(('x' || SUBSTR(MD5({key}), 16, 8))::bit(32)::bigint AS DECIMAL(65,0))");
        format!("({upper} + {lower}) * 0.000000001")
    }

    fn sql_generate_uuid(&self) -> String {
        "GEN_RANDOM_UUID()".to_string()
    }
}
