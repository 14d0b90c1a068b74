//! CLI helper functions

use crate::{
    client::WarehouseClient,
    config::EtlConfig,
    load::{CopyLoader, copy_statement},
    pipeline::Pipeline,
    schema,
    transform::TransformRule,
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;

/// Load pipeline configuration from the environment.
pub fn load_config() -> Result<EtlConfig> {
    EtlConfig::from_env().context("Failed to load pipeline configuration")
}

fn connect(config: &EtlConfig) -> Result<WarehouseClient> {
    log::info!(
        "Connecting to warehouse at {}",
        config.warehouse_url.as_str().bright_black()
    );
    WarehouseClient::try_new(config.warehouse_url.clone(), config.auth.clone())
        .context("Failed to create warehouse client")
}

fn build_pipeline(config: &EtlConfig) -> Result<Pipeline<WarehouseClient, CopyLoader<WarehouseClient>>> {
    let engine = connect(config)?;
    let loader = CopyLoader::new(engine.clone(), config.copy_config());
    Ok(Pipeline::new(engine, loader))
}

/// Run the full rebuild: drop → create → load → transform.
pub async fn run_pipeline() -> Result<()> {
    let config = load_config()?;
    let sources = config.sources();
    let mut pipeline = build_pipeline(&config)?;

    pipeline.run(&sources).await?;

    log::info!("✓ Warehouse rebuilt: staging loaded and star schema populated");
    Ok(())
}

/// Drop and recreate all seven tables, leaving them empty.
pub async fn reset_schema() -> Result<()> {
    let config = load_config()?;
    let pipeline = build_pipeline(&config)?;

    let dropped = pipeline.drop_all().await?;
    let created = pipeline.create_all().await?;

    log::info!(
        "✓ Schema reset: {} table(s) dropped, {} created",
        dropped.to_string().cyan(),
        created.to_string().cyan()
    );
    Ok(())
}

/// Bulk-load both staging tables from object storage.
pub async fn load_staging() -> Result<()> {
    let config = load_config()?;
    let sources = config.sources();
    let pipeline = build_pipeline(&config)?;

    let rows = pipeline.load_staging(&sources).await?;

    log::info!("✓ Staging loaded: {} row(s)", rows.to_string().cyan());
    Ok(())
}

/// Populate the dimension and fact tables from staging.
pub async fn run_transforms() -> Result<()> {
    let config = load_config()?;
    let pipeline = build_pipeline(&config)?;

    let rows = pipeline.run_transforms().await?;

    log::info!(
        "✓ Star schema populated: {} row(s) across 5 table(s)",
        rows.to_string().cyan()
    );
    Ok(())
}

/// Verify connectivity and authorization to the warehouse.
pub async fn ping() -> Result<()> {
    let config = load_config()?;
    let client = connect(&config)?;

    client.ping().await.context("Warehouse ping failed")?;

    log::info!("✓ Warehouse connection OK: {}", client);
    Ok(())
}

/// Print every statement the pipeline would execute, in run order.
///
/// The copy statements need configuration (region, role, source URIs); if
/// none is available they are skipped with a note rather than failing the
/// whole preview.
pub fn print_sql() {
    println!("{}", "-- drop tables".bright_black());
    for table in schema::all_tables() {
        println!("{}\n", table.drop_sql());
    }

    println!("{}", "-- create tables".bright_black());
    for table in schema::all_tables() {
        println!("{}\n", table.create_sql());
    }

    println!("{}", "-- load staging".bright_black());
    match EtlConfig::from_env() {
        Ok(config) => {
            let copy = config.copy_config();
            for source in config.sources() {
                println!("{}\n", copy_statement(&copy, &source));
            }
        }
        Err(_) => {
            println!(
                "{}\n",
                "-- (no configuration in environment; copy statements omitted)".bright_black()
            );
        }
    }

    println!("{}", "-- transform".bright_black());
    for rule in TransformRule::ALL {
        println!("{}\n", rule.sql());
    }
}

/// Print the jsonpaths mapping document for the event staging load.
pub fn print_jsonpaths() -> Result<()> {
    let doc = schema::events_jsonpaths();
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
