use shale::{DuckDbRunner, PlanCatalog, ShaleConfig, SqlEmitter, SqlRunner};

const SEED_SQL: &str = "CREATE TABLE aircraft AS
SELECT * FROM (VALUES
    ('N10XY', 'CA'),
    ('N20XY', 'CA'),
    ('N30XY', 'NV')) AS t(tail_num, state);";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ShaleConfig::load_default();
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("demo.duckdb");

    let runner =
        DuckDbRunner::new(&db_path).with_max_concurrency(config.duckdb.max_concurrency);
    runner.run_batch(SEED_SQL).await?;

    let catalog = PlanCatalog::load_from_dir("demos/plans")?;
    let plan = catalog
        .get("states")
        .ok_or_else(|| anyhow::anyhow!("demo plan 'states' not found"))?;

    let sql = SqlEmitter::new(runner.dialect()).emit_segment(plan)?;
    println!("-- generated SQL\n{sql}\n");

    let result = runner.run_sql(&sql).await?;
    println!("-- {} row(s)", result.len());
    for row in &result.rows {
        println!("{}", serde_json::Value::Object(row.clone()));
    }
    Ok(())
}
