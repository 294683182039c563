//! BigQuery dialect implementation.

use crate::fields::{FieldList, GroupSet, OrderBy};
use crate::fragment;

use super::{expect_struct_fields, Dialect};

#[derive(Debug, Default, Clone, Copy)]
pub struct BigQueryDialect;

impl BigQueryDialect {
    /// `expr AS name, ...` body for STRUCT(...) construction.
    fn struct_body(&self, fields: &FieldList) -> String {
        fragment::comma_list(
            fields
                .iter()
                .map(|f| format!("{} AS {}", f.sql_expression, self.quote_ident(&f.sql_output_name))),
        )
    }

    fn null_struct_body(&self, fields: &FieldList) -> String {
        fragment::comma_list(
            fields
                .iter()
                .map(|f| format!("NULL AS {}", self.quote_ident(&f.sql_output_name))),
        )
    }
}

impl Dialect for BigQueryDialect {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn quote_table_name(&self, table: &str) -> String {
        // BigQuery accepts a whole dotted path inside one pair of backticks
        fragment::quote_backtick(table)
    }

    fn quote_ident(&self, ident: &str) -> String {
        fragment::quote_backtick(ident)
    }

    fn sql_group_set_table(&self, group_set_count: u32) -> String {
        // GENERATE_ARRAY(0, n, 1) has n + 1 elements; the window numbering
        // turns them into dense group_set values 0..=n
        format!(
            "(SELECT ROW_NUMBER() OVER() - 1 AS group_set \
             FROM UNNEST(GENERATE_ARRAY(0,{group_set_count},1)))"
        )
    }

    fn sql_any_value(&self, group_set: GroupSet, field_expr: &str) -> String {
        format!("ANY_VALUE(CASE WHEN group_set={group_set} THEN {field_expr} END)")
    }

    fn sql_aggregate_turtle(
        &self,
        group_set: GroupSet,
        fields: &FieldList,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
    ) -> String {
        expect_struct_fields("sql_aggregate_turtle", fields);
        let body = self.struct_body(fields);
        let mut tail = String::new();
        if let Some(order_by) = order_by {
            tail.push(' ');
            tail.push_str(order_by.as_str());
        }
        if let Some(limit) = limit {
            tail.push_str(&format!(" LIMIT {limit}"));
        }
        // The CASE yields NULL for rows outside the set and IGNORE NULLS
        // drops them, so the collection holds qualifying rows only
        format!(
            "ARRAY_AGG(CASE WHEN group_set={group_set} THEN STRUCT({body}) END IGNORE NULLS{tail})"
        )
    }

    fn sql_any_value_turtle(&self, group_set: GroupSet, fields: &FieldList) -> String {
        expect_struct_fields("sql_any_value_turtle", fields);
        let body = self.struct_body(fields);
        format!("ANY_VALUE(CASE WHEN group_set={group_set} THEN STRUCT({body}) END)")
    }

    fn sql_any_value_last_turtle(&self, name: &str, sql_name: &str) -> String {
        format!(
            "ANY_VALUE(CASE WHEN group_set=0 THEN {name}__0 END) AS {}",
            self.quote_ident(sql_name)
        )
    }

    fn sql_coalesce_measures_inline(&self, group_set: GroupSet, fields: &FieldList) -> String {
        expect_struct_fields("sql_coalesce_measures_inline", fields);
        let body = self.struct_body(fields);
        let nulls = self.null_struct_body(fields);
        format!(
            "COALESCE(ANY_VALUE(CASE WHEN group_set={group_set} THEN STRUCT({body}) END), \
             STRUCT({nulls}))"
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
            // Inject the key while re-packing the array so each flattened
            // row gets its own GENERATE_UUID() value
            format!(
                "UNNEST(ARRAY((SELECT AS STRUCT GENERATE_UUID() AS __distinct_key, * \
                 FROM UNNEST({source})))) AS {alias}"
            )
        } else {
            format!("UNNEST({source}) AS {alias}")
        }
    }

    fn sql_sum_distinct_hashed_key(&self, sql_distinct_key: &str) -> String {
        let key = format!("CAST({sql_distinct_key} AS STRING)");
        // 15 hex chars (60 bits) shifted up by 2^32, plus 8 more hex chars
        // (32 bits); scaled so sums stay inside NUMERIC(38,9)
        let upper = format!(
            "CAST(CAST(CONCAT('0x', SUBSTR(TO_HEX(MD5({key})), 1, 15)) AS INT64) AS NUMERIC) \
             * 4294967296"
        );
        let lower =
            format!("CAST(CAST(CONCAT('0x', SUBSTR(TO_HEX(MD5({key})), 16, 8)) AS INT64) AS NUMERIC)");
        format!("({upper} + {lower}) * 0.000000001")
    }

    fn sql_generate_uuid(&self) -> String {
        "GENERATE_UUID()".to_string()
    }
}
