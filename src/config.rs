use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub telegram_bot_token: String,
    pub webhook_url: String,
    pub finnhub_api_key: String,

    pub scan_interval: Duration,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "tickerwatch".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(10000);

    let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
    let webhook_url = env::var("WEBHOOK_URL").unwrap_or_default();
    let finnhub_api_key = env::var("FINNHUB_API_KEY").unwrap_or_default();

    let scan_interval = env::var("SCAN_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(10));

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        telegram_bot_token,
        webhook_url,
        finnhub_api_key,
        scan_interval,
    }
}
