//! Shared handler state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use classpulse_core::config::AdminConfig;
use classpulse_core::RecordStore;

use crate::error::{ApiError, ApiResult};

/// Source of "now" for period windows.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    #[cfg(test)]
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            #[cfg(test)]
            Clock::Fixed(now) => *now,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub admin: Arc<AdminConfig>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, admin: AdminConfig) -> Self {
        Self {
            store,
            admin: Arc::new(admin),
            clock: Clock::System,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Run a blocking store operation off the async runtime.
    ///
    /// Both a failed task and a failed query become a 500 carrying `message`.
    pub async fn blocking<T, F>(&self, message: &'static str, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RecordStore, DateTime<Utc>) -> classpulse_core::Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let now = self.clock.now();
        tokio::task::spawn_blocking(move || f(store.as_ref(), now))
            .await
            .map_err(|e| ApiError::internal(message, e))?
            .map_err(|e| ApiError::internal(message, e))
    }
}
