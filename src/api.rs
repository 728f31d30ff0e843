//! HTTP API
//!
//! A thin adapter over [`ChatRuntime`]: marshals requests into turns and
//! turns back into JSON.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::runtime::ChatRuntime;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ChatRuntime>,
}

impl AppState {
    pub fn new(runtime: ChatRuntime) -> Self {
        Self {
            runtime: Arc::new(runtime),
        }
    }
}
