#![allow(non_snake_case)]

use std::env;

use tracing_subscriber::EnvFilter;

use calendarBot::cli;
use calendarBot::config::AppConfig;
use calendarBot::runtime;

const DEFAULT_RUN_MODE: &str = "cli";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let run_mode = config.prop_or("RUN_MODE", DEFAULT_RUN_MODE);
    if run_mode == "api" {
        runtime::run_api(config).await;
    } else if run_mode == "cli" {
        cli::cli(config).await;
    } else {
        println!("Invalid run mode {}", run_mode);
    }
}
