//! Connection manager
//!
//! Lazily establishes the storage handle, shared by every in-flight request.
//! Concurrent callers coalesce onto one underlying attempt (single-flight)
//! and all see its outcome; a successful handle is cached for the life of
//! the process, a failed attempt leaves nothing behind so a later call can
//! try again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::storage::Error;
use crate::storage::Result;

/// Timeout of the first connection attempt
const FIRST_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between the first attempt and the retry
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Timeout of the single retry, a bit more generous
const RETRY_TIMEOUT: Duration = Duration::from_secs(15);

/// Establishes a storage handle
///
/// Injected into the [`ConnectionManager`] so tests can substitute a fake
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// The handle a successful connection yields
    type Handle: Clone + Send + Sync + 'static;

    /// Make a single connection attempt within the given timeout
    async fn connect(&self, timeout: Duration) -> Result<Self::Handle>;
}

/// Process-wide connection state
///
/// Cheap to clone, clones share the cached handle
pub struct ConnectionManager<H>
where
    H: Clone + Send + Sync + 'static,
{
    /// The injected way to connect
    connector: Arc<dyn Connector<Handle = H>>,

    /// Single-slot cache holding the live handle and coalescing concurrent
    /// acquisition attempts
    handle: Cache<(), H>,
}

impl<H> Clone for ConnectionManager<H>
where
    H: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            handle: self.handle.clone(),
        }
    }
}

impl<H> ConnectionManager<H>
where
    H: Clone + Send + Sync + 'static,
{
    /// Create a manager around a connector
    ///
    /// Nothing is connected until the first [`acquire`](Self::acquire)
    pub fn new<C>(connector: C) -> Self
    where
        C: Connector<Handle = H>,
    {
        Self {
            connector: Arc::new(connector),
            handle: Cache::new(1),
        }
    }

    /// Get the live storage handle, connecting if there is none yet
    ///
    /// Safe to call from any number of concurrent requests
    pub async fn acquire(&self) -> Result<H> {
        let connector = Arc::clone(&self.connector);

        self.handle
            .try_get_with((), attempt(connector))
            .await
            .map_err(|err| Error::Connection(err.to_string()))
    }
}

/// One full acquisition: an attempt, a pause and a single retry
async fn attempt<H>(connector: Arc<dyn Connector<Handle = H>>) -> Result<H>
where
    H: Clone + Send + Sync + 'static,
{
    match connector.connect(FIRST_ATTEMPT_TIMEOUT).await {
        Ok(handle) => Ok(handle),
        Err(err) => {
            tracing::warn!("First connection attempt failed, retrying: {err}");

            tokio::time::sleep(RETRY_DELAY).await;

            connector.connect(RETRY_TIMEOUT).await
        }
    }
}
