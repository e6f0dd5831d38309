#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use tickerwatch::config::Settings;
use tickerwatch::models::Watch;
use tickerwatch::services::quotes::{PriceOracle, QuoteError};
use tickerwatch::services::telegram::{Notifier, NotifyError};
use tickerwatch::services::watch_store::{StoreError, WatchStore};
use tickerwatch::AppState;

/// In-memory watch table with the same per-call atomicity the real store
/// guarantees (every operation holds the table lock for its duration).
/// Can be switched into a failing mode to exercise storage-error paths.
#[derive(Default)]
pub struct MemoryWatchStore {
    rows: Mutex<Vec<Watch>>,
    failing: AtomicBool,
}

impl MemoryWatchStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io("memory store set to fail".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WatchStore for MemoryWatchStore {
    async fn create(
        &self,
        user_id: i64,
        symbol: &str,
        target_price: f64,
    ) -> Result<Watch, StoreError> {
        self.check()?;

        let watch = Watch {
            id: ObjectId::new(),
            user_id,
            symbol: symbol.to_uppercase(),
            target_price,
            active: true,
            created_at: chrono::Utc::now().timestamp(),
            deactivated_at: None,
        };

        self.rows.lock().unwrap().push(watch.clone());
        Ok(watch)
    }

    async fn deactivate(&self, user_id: i64, symbol: &str) -> Result<(), StoreError> {
        self.check()?;

        let now = chrono::Utc::now().timestamp();
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.user_id == user_id && row.symbol == symbol && row.active {
                row.active = false;
                row.deactivated_at = Some(now);
            }
        }
        Ok(())
    }

    async fn list_active(&self, user_id: i64) -> Result<Vec<Watch>, StoreError> {
        self.check()?;

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.active)
            .cloned()
            .collect())
    }

    async fn list_active_users(&self) -> Result<Vec<i64>, StoreError> {
        self.check()?;

        let mut users: Vec<i64> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.active)
            .map(|r| r.user_id)
            .collect();
        users.sort_unstable();
        users.dedup();
        Ok(users)
    }
}

impl MemoryWatchStore {
    /// Total row count, inactive history included.
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

/// Scripted price source. Symbols without an entry answer `NotFound`.
#[derive(Default)]
pub struct StaticOracle {
    prices: Mutex<HashMap<String, Result<f64, QuoteError>>>,
}

impl StaticOracle {
    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices
            .lock()
            .unwrap()
            .insert(symbol.to_string(), Ok(price));
    }

    pub fn set_error(&self, symbol: &str, err: QuoteError) {
        self.prices
            .lock()
            .unwrap()
            .insert(symbol.to_string(), Err(err));
    }
}

#[async_trait]
impl PriceOracle for StaticOracle {
    async fn current_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        self.prices
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or(Err(QuoteError::NotFound))
    }
}

/// Captures outbound messages; can be switched into a failing mode.
#[derive(Default)]
pub struct RecordingNotifier {
    plain: Mutex<Vec<(i64, String)>>,
    monospace: Mutex<Vec<(i64, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn plain_messages(&self) -> Vec<(i64, String)> {
        self.plain.lock().unwrap().clone()
    }

    pub fn monospace_messages(&self) -> Vec<(i64, String)> {
        self.monospace.lock().unwrap().clone()
    }

    pub fn plain_for(&self, user_id: i64) -> Vec<String> {
        self.plain
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.plain.lock().unwrap().clear();
        self.monospace.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: i64, text: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("recording notifier set to fail".into()));
        }
        self.plain.lock().unwrap().push((user_id, text.to_string()));
        Ok(())
    }

    async fn notify_monospace(&self, user_id: i64, body: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("recording notifier set to fail".into()));
        }
        self.monospace
            .lock()
            .unwrap()
            .push((user_id, body.to_string()));
        Ok(())
    }
}

pub fn test_settings() -> Settings {
    Settings {
        mongodb_uri: "mongodb://localhost:27017".to_string(),
        mongodb_db: "tickerwatch_test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        telegram_bot_token: String::new(),
        webhook_url: String::new(),
        finnhub_api_key: String::new(),
        scan_interval: Duration::from_secs(10),
    }
}

pub fn test_state() -> (
    AppState,
    Arc<MemoryWatchStore>,
    Arc<StaticOracle>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(MemoryWatchStore::default());
    let oracle = Arc::new(StaticOracle::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let state = AppState {
        settings: test_settings(),
        store: store.clone(),
        oracle: oracle.clone(),
        notifier: notifier.clone(),
    };

    (state, store, oracle, notifier)
}
