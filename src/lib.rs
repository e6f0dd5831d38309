//! Library entrypoint for tickerwatch.
//!
//! This file exists mainly to make integration tests easy (tests under
//! `tests/` can import the app state, routers, services and models).

use std::sync::Arc;

pub mod config;
pub mod models;

pub mod services;

pub mod controllers;
pub mod routes;

use services::quotes::PriceOracle;
use services::telegram::Notifier;
use services::watch_store::WatchStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: Arc<dyn WatchStore>,
    pub oracle: Arc<dyn PriceOracle>,
    pub notifier: Arc<dyn Notifier>,
}
