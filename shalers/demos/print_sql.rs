use std::{env, path::PathBuf};

use shale::{generate_sql, PlanCatalog, ShaleConfig};

fn usage() {
    eprintln!("Usage: print_sql <plans_dir> <plan_name> [dialect]");
    eprintln!("Example: cargo run --example print_sql -- demos/plans states bigquery");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }
    let plans_dir = PathBuf::from(args.remove(0));
    let plan_name = args.remove(0);
    let dialect = if args.is_empty() {
        ShaleConfig::load_default().default_dialect
    } else {
        args.remove(0)
    };

    let catalog = PlanCatalog::load_from_dir(&plans_dir)?;
    let plan = catalog.get(&plan_name).ok_or_else(|| {
        anyhow::anyhow!("plan '{plan_name}' not found in {}", plans_dir.display())
    })?;

    println!("{}", generate_sql(plan, &dialect)?);
    Ok(())
}
