use crate::services::telegram::Update;
use crate::services::watch_store::StoreError;
use crate::AppState;

const USAGE: &str = "Welcome! Use /settarget SYMBOL PRICE to set a target.";

/// Outbound reply produced by a command handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Plain(String),
    Monospace(String),
}

/// Entry point for one inbound transport push. Never returns an error:
/// store failures degrade to a generic reply, delivery failures are logged.
pub async fn handle_update(state: &AppState, update: Update) {
    let Some(message) = update.message else {
        return;
    };
    let Some(text) = message.text.as_deref() else {
        return;
    };
    let Some(from) = message.from else {
        return;
    };

    // Watches are scoped to the sender; the reply goes back into the chat
    // the command came from (they differ in group chats).
    let chat_id = message.chat.id;

    let Some((command, args)) = parse_command(text) else {
        return;
    };

    let reply = match dispatch(state, from.id, &command, &args).await {
        Ok(Some(reply)) => reply,
        Ok(None) => return,
        Err(e) => {
            tracing::error!(user_id = from.id, command = %command, error = %e, "command failed");
            Reply::Plain("Something went wrong, please try again later.".to_string())
        }
    };

    let sent = match &reply {
        Reply::Plain(text) => state.notifier.notify(chat_id, text).await,
        Reply::Monospace(body) => state.notifier.notify_monospace(chat_id, body).await,
    };

    if let Err(e) = sent {
        tracing::warn!(chat_id, error = %e, "reply delivery failed");
    }
}

/// Routes a parsed command to its handler. `Ok(None)` means no reply
/// (unrecognized commands are ignored, as the transport expects).
pub async fn dispatch(
    state: &AppState,
    user_id: i64,
    command: &str,
    args: &[String],
) -> Result<Option<Reply>, StoreError> {
    match command {
        "start" => Ok(Some(Reply::Plain(USAGE.to_string()))),
        "settarget" => set_target(state, user_id, args).await,
        "deactivatetarget" => deactivate_target(state, user_id, args).await,
        "listtargets" => list_targets(state, user_id).await,
        other => {
            tracing::debug!(user_id, command = other, "ignoring unknown command");
            Ok(None)
        }
    }
}

async fn set_target(
    state: &AppState,
    user_id: i64,
    args: &[String],
) -> Result<Option<Reply>, StoreError> {
    if args.len() != 2 {
        return Ok(Some(Reply::Plain("Usage: /settarget SYMBOL PRICE".to_string())));
    }

    let symbol = args[0].to_uppercase();

    let target_price = match args[1].parse::<f64>() {
        Ok(p) if p.is_finite() => p,
        Ok(_) | Err(_) => {
            return Ok(Some(Reply::Plain("Invalid price format.".to_string())));
        }
    };

    if target_price <= 0.0 {
        return Ok(Some(Reply::Plain(
            "Price must be greater than zero.".to_string(),
        )));
    }

    let watch = state.store.create(user_id, &symbol, target_price).await?;

    Ok(Some(Reply::Plain(format!(
        "Target set for {} at {}.",
        watch.symbol, watch.target_price
    ))))
}

async fn deactivate_target(
    state: &AppState,
    user_id: i64,
    args: &[String],
) -> Result<Option<Reply>, StoreError> {
    if args.len() != 1 {
        return Ok(Some(Reply::Plain(
            "Usage: /deactivatetarget SYMBOL".to_string(),
        )));
    }

    let symbol = args[0].to_uppercase();

    // Idempotent from the caller's side: deactivating nothing is fine.
    state.store.deactivate(user_id, &symbol).await?;

    Ok(Some(Reply::Plain(format!("Target deactivated for {symbol}."))))
}

async fn list_targets(state: &AppState, user_id: i64) -> Result<Option<Reply>, StoreError> {
    let watches = state.store.list_active(user_id).await?;

    if watches.is_empty() {
        return Ok(Some(Reply::Plain("You have no active targets.".to_string())));
    }

    let mut rows: Vec<(String, f64, Option<f64>)> = Vec::with_capacity(watches.len());
    for watch in watches {
        let price = match state.oracle.current_price(&watch.symbol).await {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(user_id, symbol = %watch.symbol, error = %e, "quote failed while listing");
                None
            }
        };
        rows.push((watch.symbol, watch.target_price, price));
    }

    Ok(Some(Reply::Monospace(render_targets_table(&rows))))
}

fn fmt2(x: f64) -> String {
    format!("{x:.2}")
}

fn render_targets_table(rows: &[(String, f64, Option<f64>)]) -> String {
    let mut out = String::new();
    out.push_str("Symbol     | Target Price | Current Price\n");
    out.push_str("-----------|--------------|--------------\n");

    for (symbol, target, current) in rows {
        let current = current.map(fmt2).unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!("{:<10} | {:<12} | {}\n", symbol, fmt2(*target), current));
    }

    out
}

/// Splits `/command arg arg` into a lowercase command and its arguments.
/// Tolerates the `@botname` suffix used when addressing bots in groups.
/// Returns `None` for anything that is not a command message.
pub fn parse_command(text: &str) -> Option<(String, Vec<String>)> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    let name = head.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);

    if name.is_empty() {
        return None;
    }

    Some((
        name.to_ascii_lowercase(),
        parts.map(str::to_string).collect(),
    ))
}
