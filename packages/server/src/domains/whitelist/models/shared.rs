use std::sync::Arc;

use tokio::sync::Mutex;

use super::store::WhitelistStore;

/// Cloneable handle to the single store instance.
///
/// Each closure runs to completion under the lock, so a mutation and its
/// snapshot flush are never interleaved with another request. Callers must
/// not hold the store across role or relay I/O; take what they need and
/// release it.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<WhitelistStore>>,
}

impl SharedStore {
    pub fn new(store: WhitelistStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&WhitelistStore) -> R) -> R {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    pub async fn write<R>(&self, f: impl FnOnce(&mut WhitelistStore) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}
