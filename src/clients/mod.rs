pub mod telegram_client;
pub mod webhook_client;
