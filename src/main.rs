use std::env;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use warehouse_fixtures::{FixtureConfig, FixtureDatabase, ReadinessGate};

const USAGE: &str = "\
Usage: warehouse-fixtures [COMMAND]

Commands:
  create   Wait for the store and query service, then create the mock tables (default)
  wait     Only wait for the store and query service
  reset    Empty every mock table
  drop     Drop every mock table
  tables   List tables with their row counts";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_logging();

    // Load environment from .env file if present
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let command = env::args().nth(1).unwrap_or_else(|| "create".to_string());
    if command == "-h" || command == "--help" {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = FixtureConfig::from_env()?;
    info!(
        "Retry timeout {:?}, poll interval {:?}",
        config.retry_timeout, config.retry_interval
    );

    match command.as_str() {
        "create" => {
            FixtureDatabase::make_database(&config).await?;
            info!("Mock warehouse ready");
        }
        "wait" => {
            FixtureDatabase::connect(&config).await?;
            info!("Store and query service are ready");
        }
        "reset" => {
            let database = FixtureDatabase::connect(&config).await?;
            database.reset().await?;
            info!("All mock tables emptied");
        }
        "drop" => {
            let database = FixtureDatabase::connect(&config).await?;
            database.drop_all().await?;
            info!("All mock tables dropped");
        }
        "tables" => {
            // Store only; listing tables does not need the query service
            let params = warehouse_fixtures::store::StoreParams::from_url(&config.datasource_url)?;
            let pool = ReadinessGate::from_config(&config)
                .wait_for_store(&params, config.pool_max_size)
                .await?;
            let deployer = warehouse_fixtures::schema::SchemaDeployer::new();
            for table in deployer.list_tables(&pool).await? {
                let rows = deployer.row_count(&pool, &table).await?;
                println!("{:<24} {}", table, rows);
            }
        }
        other => {
            warn!("Unknown command: {}", other);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Console logging, plus a JSON file per day when `LOG_DIR` is set.
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,warehouse_fixtures=debug"));

    let console = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let (file_layer, guard) = match env::var("LOG_DIR") {
        Ok(log_dir) => {
            if let Err(e) = std::fs::create_dir_all(&log_dir) {
                eprintln!("Warning: Could not create log directory {}: {}", log_dir, e);
            }
            let file_appender =
                RollingFileAppender::new(Rotation::DAILY, &log_dir, "warehouse-fixtures.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    guard
}
