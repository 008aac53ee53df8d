//! Single-flight token refresh
//!
//! At most one refresh exchange runs at a time. Callers that hit a 401
//! while a refresh is running await the same shared future and receive the
//! same new token (or the same failure).

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::error::ClientResult;

type SharedRefresh = Shared<BoxFuture<'static, ClientResult<String>>>;

#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    inflight: Arc<Mutex<Option<SharedRefresh>>>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RefreshCoordinator {
    /// Await the running refresh, or start one with `start`
    pub(crate) async fn refresh<F, Fut>(&self, start: F) -> ClientResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<String>> + Send + 'static,
    {
        let shared = {
            let mut slot = lock(&self.inflight);
            match slot.as_ref() {
                Some(running) => {
                    tracing::debug!("Joining in-flight token refresh");
                    running.clone()
                }
                None => {
                    let slot_handle = Arc::clone(&self.inflight);
                    let exchange = start();
                    let shared = async move {
                        let result = exchange.await;
                        *lock(&slot_handle) = None;
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(shared.clone());
                    shared
                }
            }
        };
        shared.await
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        lock(&self.inflight).is_some()
    }
}
