pub mod watch_store;

pub mod quotes;
pub mod telegram;

pub mod commands;
pub mod alert_monitor;
