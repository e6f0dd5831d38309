use std::net::SocketAddr;
use std::sync::Arc;

use mongodb::Client;

use tickerwatch::services::alert_monitor;
use tickerwatch::services::quotes::FinnhubQuotes;
use tickerwatch::services::telegram::TelegramClient;
use tickerwatch::services::watch_store::MongoWatchStore;
use tickerwatch::{config, routes, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    let store = MongoWatchStore::new(db);
    store
        .ensure_indexes()
        .await
        .expect("Failed to create watch indexes");

    let telegram = TelegramClient::new(settings.telegram_bot_token.clone());
    if telegram.is_configured() && !settings.webhook_url.is_empty() {
        if let Err(e) = telegram.set_webhook(&settings.webhook_url).await {
            tracing::warn!(error = %e, "webhook registration failed");
        }
    } else {
        tracing::warn!("bot token or webhook url missing, skipping webhook registration");
    }

    let state = AppState {
        settings: settings.clone(),
        store: Arc::new(store),
        oracle: Arc::new(FinnhubQuotes::new(settings.finnhub_api_key.clone())),
        notifier: Arc::new(telegram),
    };

    let monitor = alert_monitor::spawn_price_alert_monitor(state.clone());

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>().unwrap(), settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    monitor.abort();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
