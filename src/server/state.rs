//! Server state management

use crate::query::QueryDispatcher;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    /// Per-request query pipeline
    pub dispatcher: QueryDispatcher,

    /// Window used for chart requests that carry no time range
    pub default_window_hours: u32,
}

impl ServerState {
    pub fn new(dispatcher: QueryDispatcher, default_window_hours: u32) -> Self {
        Self {
            dispatcher,
            default_window_hours,
        }
    }
}
