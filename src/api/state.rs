use std::sync::Arc;

use crate::{
    db::{SessionStore, Store},
    services::CatalogProvider,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<dyn SessionStore>,
    pub catalog: Arc<dyn CatalogProvider>,
    /// bcrypt cost for new password hashes
    pub password_cost: u32,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        sessions: Arc<dyn SessionStore>,
        catalog: Arc<dyn CatalogProvider>,
        password_cost: u32,
    ) -> Self {
        Self {
            store,
            sessions,
            catalog,
            password_cost,
        }
    }
}
