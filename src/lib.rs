use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod render;
pub mod routes;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn database::Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn database::Store>) -> Self {
        Self { store }
    }
}
