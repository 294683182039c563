//! Integration tests for segment SQL assembly.
//!
//! These exercise the public API: SegmentPlan in, one complete SELECT out,
//! with the statement skeleton checked piece by piece.

use shale::{
    BigQueryDialect, Dialect, DuckDbDialect, FieldDescriptor, FieldList, GroupSet, OrderBy,
    PostgresDialect, SegmentPlan, ShaleError, SourceRef, SqlEmitter, TurtlePlan, TurtleShape,
    UnnestPlan,
};

fn field(expr: &str, name: &str) -> FieldDescriptor {
    FieldDescriptor::new(expr, name)
}

fn states_plan() -> SegmentPlan {
    SegmentPlan {
        name: "by_state".to_string(),
        source: SourceRef::Table("aircraft".to_string()),
        dimensions: vec![field("base.state", "state")].into_iter().collect(),
        measures: vec![field(
            "COUNT(DISTINCT CASE WHEN group_set=0 THEN base.tail_num END)",
            "aircraft_count",
        )]
        .into_iter()
        .collect(),
        unnests: vec![],
        turtles: vec![],
        group_set_count: 0,
        order_by: None,
        limit: None,
    }
}

fn nested_plan() -> SegmentPlan {
    SegmentPlan {
        name: "totals_with_detail".to_string(),
        source: SourceRef::Table("aircraft".to_string()),
        dimensions: FieldList::default(),
        measures: vec![field(
            "COUNT(DISTINCT CASE WHEN group_set=0 THEN base.tail_num END)",
            "aircraft_count",
        )]
        .into_iter()
        .collect(),
        unnests: vec![],
        turtles: vec![TurtlePlan {
            name: "by_tail".to_string(),
            group_set: GroupSet(1),
            shape: TurtleShape::List,
            fields: vec![field("base.tail_num", "tail_num"), field("base.state", "state")]
                .into_iter()
                .collect(),
            order_by: Some(OrderBy::new("ORDER BY base.tail_num")),
            limit: Some(10),
        }],
        group_set_count: 1,
        order_by: None,
        limit: None,
    }
}

#[test]
fn grouped_segment_selects_gated_dimensions() {
    let sql = SqlEmitter::new(&DuckDbDialect)
        .emit_segment(&states_plan())
        .unwrap();
    assert!(sql.starts_with("SELECT "));
    assert!(sql.contains("any_value(base.state) FILTER (WHERE group_set=0) AS \"state\""));
    // measure expressions are spliced verbatim, already gated by the planner
    assert!(sql.contains(
        "COUNT(DISTINCT CASE WHEN group_set=0 THEN base.tail_num END) AS \"aircraft_count\""
    ));
    assert!(sql.contains("FROM \"aircraft\" AS base"));
    assert!(sql.contains(
        "CROSS JOIN (SELECT UNNEST(generate_series(0,0,1)) AS group_set) AS group_sets"
    ));
    assert!(sql.ends_with("GROUP BY base.state"));
}

#[test]
fn turtle_segment_collects_into_aliased_column() {
    let sql = SqlEmitter::new(&DuckDbDialect)
        .emit_segment(&nested_plan())
        .unwrap();
    assert!(sql.contains(
        "(list({'tail_num': base.tail_num, 'state': base.state} ORDER BY base.tail_num) \
         FILTER (WHERE group_set=1))[1:10] AS \"by_tail\""
    ));
    assert!(sql.contains("generate_series(0,1,1)"));
    assert!(!sql.contains("GROUP BY"));
}

#[test]
fn turtle_segment_renders_for_bigquery() {
    let sql = SqlEmitter::new(&BigQueryDialect)
        .emit_segment(&nested_plan())
        .unwrap();
    assert!(sql.contains("ARRAY_AGG(CASE WHEN group_set=1 THEN STRUCT("));
    assert!(sql.contains("END IGNORE NULLS ORDER BY base.tail_num LIMIT 10) AS `by_tail`"));
    assert!(sql.contains(
        "CROSS JOIN (SELECT ROW_NUMBER() OVER() - 1 AS group_set \
         FROM UNNEST(GENERATE_ARRAY(0,1,1)))"
    ));
}

#[test]
fn subquery_sources_are_parenthesized() {
    let mut plan = states_plan();
    plan.source = SourceRef::Sql("SELECT * FROM staging.aircraft".to_string());
    let sql = SqlEmitter::new(&PostgresDialect).emit_segment(&plan).unwrap();
    assert!(sql.contains("FROM (SELECT * FROM staging.aircraft) AS base"));
}

#[test]
fn unnest_joins_come_before_the_fan_out() {
    let mut plan = nested_plan();
    plan.unnests.push(UnnestPlan {
        source_expr: "base.children".to_string(),
        alias: "child".to_string(),
        fields: FieldList::default(),
        need_distinct_key: true,
    });
    let sql = SqlEmitter::new(&DuckDbDialect).emit_segment(&plan).unwrap();
    let unnest_at = sql.find("LEFT JOIN LATERAL (SELECT gen_random_uuid()").unwrap();
    let fan_out_at = sql.find("CROSS JOIN (SELECT UNNEST(generate_series").unwrap();
    assert!(unnest_at < fan_out_at);
    assert!(sql.contains(") AS \"child\" ON true"));
}

#[test]
fn segment_order_and_limit_trail_the_statement() {
    let mut plan = states_plan();
    plan.order_by = Some(OrderBy::new("ORDER BY 2 DESC"));
    plan.limit = Some(5);
    let sql = SqlEmitter::new(&DuckDbDialect).emit_segment(&plan).unwrap();
    assert!(sql.ends_with("GROUP BY base.state ORDER BY 2 DESC LIMIT 5"));
}

#[test]
fn every_dialect_renders_the_same_plan() {
    let plan = nested_plan();
    let dialects: [&dyn Dialect; 3] = [&BigQueryDialect, &DuckDbDialect, &PostgresDialect];
    for dialect in dialects {
        let sql = SqlEmitter::new(dialect).emit_segment(&plan).unwrap();
        assert!(sql.starts_with("SELECT "), "{}: {sql}", dialect.name());
        assert!(sql.contains("CROSS JOIN "), "{}: {sql}", dialect.name());
    }
}

#[test]
fn yaml_plans_reach_the_emitter_unchanged() {
    let yaml = r#"
name: raw
source:
  table: events
measures:
  - sql_expression: SUM(CASE WHEN group_set=0 THEN base.amount END)
    sql_output_name: total
"#;
    let plan = SegmentPlan::from_yaml_str(yaml).unwrap();
    let sql = SqlEmitter::new(&DuckDbDialect).emit_segment(&plan).unwrap();
    assert!(sql.contains("SUM(CASE WHEN group_set=0 THEN base.amount END) AS \"total\""));
}

// ============================================================================
// Validation
// ============================================================================

fn expect_validation(plan: &SegmentPlan, needle: &str) {
    let err = SqlEmitter::new(&DuckDbDialect).emit_segment(plan).unwrap_err();
    match err {
        ShaleError::Validation(msg) => assert!(msg.contains(needle), "message was: {msg}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn empty_plan_is_rejected() {
    let mut plan = states_plan();
    plan.dimensions = FieldList::default();
    plan.measures = FieldList::default();
    expect_validation(&plan, "selects nothing");
}

#[test]
fn duplicate_output_names_are_rejected() {
    let mut plan = states_plan();
    plan.measures.push(field("COUNT(1)", "state"));
    expect_validation(&plan, "duplicate output name 'state'");
}

#[test]
fn turtle_name_clashing_with_dimension_is_rejected() {
    let mut plan = nested_plan();
    plan.dimensions.push(field("base.tail_num", "by_tail"));
    expect_validation(&plan, "duplicate output name 'by_tail'");
}

#[test]
fn turtle_without_fields_is_rejected() {
    let mut plan = nested_plan();
    plan.turtles[0].fields = FieldList::default();
    expect_validation(&plan, "has no fields");
}

#[test]
fn turtle_group_set_outside_fan_out_is_rejected() {
    let mut plan = nested_plan();
    plan.turtles[0].group_set = GroupSet(2);
    expect_validation(&plan, "uses group set 2 outside 0..=1");
}

#[test]
fn unnest_without_alias_is_rejected() {
    let mut plan = states_plan();
    plan.unnests.push(UnnestPlan {
        source_expr: "base.children".to_string(),
        alias: String::new(),
        fields: FieldList::default(),
        need_distinct_key: false,
    });
    expect_validation(&plan, "missing an alias");
}

#[test]
fn duplicate_unnest_aliases_are_rejected() {
    let mut plan = states_plan();
    for _ in 0..2 {
        plan.unnests.push(UnnestPlan {
            source_expr: "base.children".to_string(),
            alias: "child".to_string(),
            fields: FieldList::default(),
            need_distinct_key: false,
        });
    }
    expect_validation(&plan, "duplicate unnest alias 'child'");
}
