use futures_util::{stream, StreamExt};
use tokio::task::JoinHandle;

use crate::models::Watch;
use crate::services::quotes::QuoteError;
use crate::services::watch_store::StoreError;
use crate::AppState;

/// Quote fetches in flight at once within a single owner's batch.
const MAX_INFLIGHT_QUOTES: usize = 8;

/// Spawns the perpetual scan loop. The delay runs from the end of one
/// cycle to the start of the next; a slow cycle stretches the period
/// rather than piling up ticks. Abort the handle on shutdown.
pub fn spawn_price_alert_monitor(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = run_cycle(&state).await {
                tracing::error!(error = %e, "scan cycle aborted");
            }

            tokio::time::sleep(state.settings.scan_interval).await;
        }
    })
}

/// One full pass over all owners with active watches. Only a store failure
/// aborts the cycle; quote and delivery failures are logged and skipped at
/// the single-watch granularity.
pub async fn run_cycle(state: &AppState) -> Result<(), StoreError> {
    let users = state.store.list_active_users().await?;

    for user_id in users {
        let watches = state.store.list_active(user_id).await?;

        let quotes: Vec<(Watch, Result<f64, QuoteError>)> = stream::iter(watches)
            .map(|watch| async move {
                let price = state.oracle.current_price(&watch.symbol).await;
                (watch, price)
            })
            .buffer_unordered(MAX_INFLIGHT_QUOTES)
            .collect()
            .await;

        for (watch, quote) in quotes {
            let price = match quote {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(user_id, symbol = %watch.symbol, error = %e, "quote failed, skipping");
                    continue;
                }
            };

            let update = format!("{} is now at {:.2}", watch.symbol, price);
            if let Err(e) = state.notifier.notify(user_id, &update).await {
                tracing::warn!(user_id, symbol = %watch.symbol, error = %e, "price update delivery failed");
            }

            if price >= watch.target_price {
                let alert = format!("Target reached! {} is now at {:.2}", watch.symbol, price);
                if let Err(e) = state.notifier.notify(user_id, &alert).await {
                    tracing::warn!(user_id, symbol = %watch.symbol, error = %e, "trigger alert delivery failed");
                }

                // Notify first, then retire. Losing the deactivation can only
                // repeat the alert next cycle, never swallow it.
                state.store.deactivate(user_id, &watch.symbol).await?;

                tracing::info!(user_id, symbol = %watch.symbol, price, target = watch.target_price, "target reached");
            }
        }
    }

    Ok(())
}
