use std::sync::Arc;

use chrono_tz::Tz;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::clients::telegram_client::TelegramClient;
use crate::clients::webhook_client::HttpWebhookClient;
use crate::config::{DispatchConfig, TelegramConfig};
use crate::handlers::dispatcher::Dispatcher;
use crate::service::date_parser::NaturalDateParser;
use crate::tasks::polling_loop;

pub fn build_dispatcher(config: &DispatchConfig) -> Result<Dispatcher, reqwest::Error> {
    let parser = Arc::new(NaturalDateParser::new(config.timezone));
    let webhook = Arc::new(HttpWebhookClient::new(
        config.webhook_url.clone(),
        config.webhook_timeout,
    )?);
    Ok(Dispatcher::new(parser, webhook))
}

pub async fn run_bot(
    dispatch: DispatchConfig,
    telegram: TelegramConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let dispatcher = Arc::new(build_dispatcher(&dispatch)?);
    let client = Arc::new(TelegramClient::new(&telegram)?);
    log_timezone(dispatch.timezone);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = tokio::spawn(polling_loop::run_polling_loop(client, dispatcher, shutdown_rx));

    match telegram.poll_window {
        Some(window) => {
            log::info!("Polling for {}s", window.as_secs());
            tokio::select! {
                _ = sleep(window) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
            }
        }
    }

    let _ = shutdown_tx.send(true);
    poller.await?;
    Ok(())
}

fn log_timezone(timezone: Tz) {
    log::info!("Resolving dates in {}", timezone.name());
}
