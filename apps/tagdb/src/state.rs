//! # Shared State
//!
//! The store shared by every connection of a transport.

use std::sync::Arc;
use tagdb_core::{QueryEngine, QueryError, Store};
use tokio::sync::RwLock;

/// Shared server state: one store behind one reader/writer lock.
#[derive(Clone)]
pub struct AppState {
    /// The store.
    pub store: Arc<RwLock<Store>>,
    /// The engine every query runs through.
    pub engine: QueryEngine,
}

impl AppState {
    /// Create new app state around a store.
    #[must_use]
    pub fn new(store: Store, engine: QueryEngine) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            engine,
        }
    }

    /// Run a query, taking the read lock for `SHOW` and the write lock
    /// for everything else.
    pub async fn execute(&self, text: &str) -> Result<String, QueryError> {
        let query = self.engine.parse(text)?;
        if query.is_read_only() {
            let store = self.store.read().await;
            self.engine.execute_read(&store, &query)
        } else {
            let mut store = self.store.write().await;
            self.engine.execute(&mut store, &query)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn show_runs_under_shared_lock() {
        let state = AppState::new(Store::default(), QueryEngine::default());
        state
            .execute("-t INSERT -k key0 -v Anakin")
            .await
            .expect("insert");

        let _reader = state.store.read().await;
        let shown = state.execute("-t SHOW -k key0").await.expect("show");
        assert!(shown.contains(" Data      : Anakin\n"));
    }
}
