//! Application state.

use std::sync::Arc;

use lead_store::LeadStore;

/// Shared application state.
pub struct AppState<S: LeadStore> {
    /// Lead store.
    pub store: S,
}

impl<S: LeadStore> AppState<S> {
    /// Creates new application state.
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state around a store.
pub fn create_shared_state<S: LeadStore>(store: S) -> SharedState<S> {
    Arc::new(AppState::new(store))
}
