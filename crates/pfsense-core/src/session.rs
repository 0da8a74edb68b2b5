//! Appliance session and its connection-wide lock.
//!
//! The pfSense API offers no transactions and no optimistic-concurrency token. Every
//! lifecycle operation against one appliance therefore runs inside a single critical
//! section guarded by the session's [`ConnectionLock`], reads included.

use crate::client::ApiClient;
use crate::config::PfsenseConfig;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Delay after a write before the appliance's configuration is re-read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Guard held for the duration of a critical section.
pub type ConnectionGuard<'a> = MutexGuard<'a, ()>;

/// Mutual-exclusion gate shared by every resource bound to one connection.
///
/// Cloning shares the gate. Waiters queue without limit.
#[derive(Debug, Clone, Default)]
pub struct ConnectionLock {
    inner: Arc<Mutex<()>>,
}

impl ConnectionLock {
    /// Create a fresh, unshared lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access. Access ends when the guard is dropped.
    pub async fn acquire(&self) -> ConnectionGuard<'_> {
        self.inner.lock().await
    }

    /// Take the lock only if nobody holds it.
    #[must_use]
    pub fn try_acquire(&self) -> Option<ConnectionGuard<'_>> {
        self.inner.try_lock().ok()
    }

    /// Returns true if both handles gate the same connection.
    #[must_use]
    pub fn same_connection(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// One authenticated connection to an appliance.
#[derive(Clone)]
pub struct Session {
    client: ApiClient,
    lock: ConnectionLock,
    settle_delay: Duration,
}

impl Session {
    /// Wrap an existing client in a new session with its own lock.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            lock: ConnectionLock::new(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Authenticate against the configured appliance and open a session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AuthenticationFailed`] when the token exchange fails.
    pub async fn connect(config: &PfsenseConfig) -> Result<Self> {
        let client = ApiClient::connect(config).await?;
        Ok(Self::new(client))
    }

    /// Override the post-write settle delay.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// The authenticated client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The lock shared by all resources of this session.
    #[must_use]
    pub fn lock(&self) -> &ConnectionLock {
        &self.lock
    }

    /// The post-write settle delay.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}

/// Sleep for `delay` so asynchronous config application can converge.
///
/// Call this while holding the connection guard; other operations queue behind it.
pub async fn settle(delay: Duration) {
    if delay > Duration::ZERO {
        debug!(?delay, "waiting for appliance to apply changes");
        tokio::time::sleep(delay).await;
    }
}
