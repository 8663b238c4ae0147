#![allow(non_snake_case)]

use std::env;
use std::process;

use calendarBot::cli;
use calendarBot::config::{AppConfig, DispatchConfig, TelegramConfig};
use calendarBot::runtime;

const DEFAULT_RUN_MODE: &str = "bot";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => match AppConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config file: {}", e);
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    };
    let get_prop = |key: &str| config.lookup(key);

    let dispatch = DispatchConfig::from_lookup(get_prop).unwrap_or_else(|e| exit_with(e));
    let run_mode = get_prop("RUN_MODE").unwrap_or(DEFAULT_RUN_MODE.to_string());
    if run_mode == "bot" {
        let telegram = TelegramConfig::from_lookup(get_prop).unwrap_or_else(|e| exit_with(e));
        if let Err(e) = runtime::run_bot(dispatch, telegram).await {
            exit_with(e);
        }
    } else if run_mode == "cli" {
        if let Err(e) = cli::cli(dispatch).await {
            exit_with(e);
        }
    } else {
        exit_with(format!("Invalid run mode {}", run_mode));
    }
}

fn exit_with(err: impl std::fmt::Display) -> ! {
    log::error!("{}", err);
    process::exit(1);
}
