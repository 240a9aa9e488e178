use anyhow::Context;
use log::{error, warn};
use station_readings::commands::{self, AppCommand, USAGE};
use station_readings::config::AppConfig;
use station_readings::reading::ReadingService;
use station_readings::storage::Store;
use std::sync::Arc;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // a missing .env is fine, the process environment still applies
    let _ = dotenv::dotenv();
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_logging(&config)?;

    let command = AppCommand::from_args(std::env::args().skip(1));
    match command {
        AppCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        AppCommand::Unknown(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            std::process::exit(2);
        }
        _ => {}
    }

    let store = Arc::new(
        Store::init(&config.database_url)
            .await
            .with_context(|| format!("cannot open database {}", config.database_url))?,
    );
    let service = ReadingService::new(store.clone(), config.service.clone());

    let outcome = commands::execute(command, &service, &store).await;

    drop(service);
    if let Ok(store) = Arc::try_unwrap(store) {
        if let Err(e) = store.teardown().await {
            warn!("Closing the database failed: {}", e);
        }
    }

    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            if e.is_client_error() {
                warn!("Request rejected: {}", e);
            } else {
                error!("Request failed: {}", e);
            }
            println!("{}", serde_json::to_string_pretty(&e.payload())?);
            std::process::exit(if e.is_client_error() { 2 } else { 1 });
        }
    }
}

fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_level(log::LevelFilter::Warn)
        .filter_module("station_readings", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error);

    // stdout carries the JSON result, logs go to stderr unless redirected
    if let Some(path) = &config.log_file {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let log_file = std::fs::File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}
