//! DuckDB dialect implementation.
//!
//! DuckDB aggregates accept `FILTER (WHERE ...)`, which replaces the CASE
//! gating other engines need for group-set isolation.

use crate::fields::{FieldList, GroupSet, OrderBy};
use crate::fragment;

use super::{expect_struct_fields, Dialect};

#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbDialect;

impl DuckDbDialect {
    /// `{'name': expr, ...}` struct literal body.
    fn struct_literal(&self, fields: &FieldList) -> String {
        let body = fragment::comma_list(fields.iter().map(|f| {
            format!(
                "{}: {}",
                fragment::string_literal(&f.sql_output_name),
                f.sql_expression
            )
        }));
        format!("{{{body}}}")
    }

    fn null_struct_literal(&self, fields: &FieldList) -> String {
        let body = fragment::comma_list(
            fields
                .iter()
                .map(|f| format!("{}: NULL", fragment::string_literal(&f.sql_output_name))),
        );
        format!("{{{body}}}")
    }
}

impl Dialect for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_table_name(&self, table: &str) -> String {
        fragment::quote_table_path(table, fragment::quote_double)
    }

    fn quote_ident(&self, ident: &str) -> String {
        fragment::quote_double(ident)
    }

    fn sql_group_set_table(&self, group_set_count: u32) -> String {
        // generate_series(0, n, 1) is inclusive of n: n + 1 dense values
        format!(
            "(SELECT UNNEST(generate_series(0,{group_set_count},1)) AS group_set) AS group_sets"
        )
    }

    fn sql_any_value(&self, group_set: GroupSet, field_expr: &str) -> String {
        format!("any_value({field_expr}) FILTER (WHERE group_set={group_set})")
    }

    fn sql_aggregate_turtle(
        &self,
        group_set: GroupSet,
        fields: &FieldList,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
    ) -> String {
        expect_struct_fields("sql_aggregate_turtle", fields);
        let mut element = self.struct_literal(fields);
        if let Some(order_by) = order_by {
            element.push(' ');
            element.push_str(order_by.as_str());
        }
        let aggregate = format!("list({element}) FILTER (WHERE group_set={group_set})");
        match limit {
            // List slices are 1-based and inclusive: [1:n] keeps n entries
            Some(limit) => format!("({aggregate})[1:{limit}]"),
            None => aggregate,
        }
    }

    fn sql_any_value_turtle(&self, group_set: GroupSet, fields: &FieldList) -> String {
        expect_struct_fields("sql_any_value_turtle", fields);
        format!(
            "any_value({}) FILTER (WHERE group_set={group_set})",
            self.struct_literal(fields)
        )
    }

    fn sql_any_value_last_turtle(&self, name: &str, sql_name: &str) -> String {
        format!(
            "any_value({name}__0) FILTER (WHERE group_set=0) AS {}",
            self.quote_ident(sql_name)
        )
    }

    fn sql_coalesce_measures_inline(&self, group_set: GroupSet, fields: &FieldList) -> String {
        expect_struct_fields("sql_coalesce_measures_inline", fields);
        format!(
            "coalesce(any_value({}) FILTER (WHERE group_set={group_set}), {})",
            self.struct_literal(fields),
            self.null_struct_literal(fields)
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
            // The key is generated in a select over the already-flattened
            // rows; generating it next to the UNNEST would be evaluated once
            // per source row and repeated across the flattened copies
            format!(
                "LATERAL (SELECT gen_random_uuid() AS __distinct_key, __flat.* \
                 FROM (SELECT UNNEST({source}, recursive := true)) AS __flat) AS {alias}"
            )
        } else {
            format!("LATERAL (SELECT UNNEST({source}, recursive := true)) AS {alias}")
        }
    }

    fn sql_sum_distinct_hashed_key(&self, sql_distinct_key: &str) -> String {
        let key = format!("CAST({sql_distinct_key} AS VARCHAR)");
        // DuckDB decimals cap at 38 digits, so the segments are sized for
        // sum headroom: 60 high bits shifted up by 2^32 plus 32 low bits,
        // scaled to 9 decimal places
        let upper = format!("CAST(md5_number_upper({key}) // 16 AS DECIMAL(38,0)) * 4294967296");
        let lower = format!("CAST(md5_number_lower({key}) % 4294967296 AS DECIMAL(38,0))");
        format!("({upper} + {lower}) * 0.000000001")
    }

    fn sql_generate_uuid(&self) -> String {
        "gen_random_uuid()".to_string()
    }
}
