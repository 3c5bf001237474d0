//! Cancellation scopes for in-flight requests
//!
//! A screen owns one `FetchScope`. When the scope is cancelled or dropped,
//! every request started through it resolves to `ClientError::Cancelled`
//! instead of delivering its result.

use crate::error::{ClientError, Result};
use std::future::Future;
use tokio::sync::watch;

#[derive(Debug)]
pub struct FetchScope {
    cancel: watch::Sender<bool>,
}

/// Handle moved into spawned request tasks
#[derive(Debug, Clone)]
pub struct ScopeToken {
    cancelled: watch::Receiver<bool>,
}

impl Default for FetchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchScope {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self { cancel }
    }

    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            cancelled: self.cancel.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.token().run(fut).await
    }
}

impl Drop for FetchScope {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}

impl ScopeToken {
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once the owning scope is cancelled or dropped
    pub async fn cancelled(&mut self) {
        loop {
            if *self.cancelled.borrow_and_update() {
                return;
            }
            if self.cancelled.changed().await.is_err() {
                return;
            }
        }
    }

    pub async fn run<T, F>(mut self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ClientError::Cancelled),
            result = fut => result,
        }
    }
}
