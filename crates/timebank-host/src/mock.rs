//! Mock screen lock for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{HostError, HostResult, ScreenLock};

/// Mock screen lock for unit/integration testing
#[derive(Default)]
pub struct MockLock {
    lock_count: Arc<AtomicUsize>,
    fail_lock: Arc<AtomicBool>,
}

impl MockLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times lock() has been called
    pub fn lock_count(&self) -> usize {
        self.lock_count.load(Ordering::SeqCst)
    }

    /// Configure lock() to fail
    pub fn set_fail(&self, fail: bool) {
        self.fail_lock.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScreenLock for MockLock {
    async fn lock(&self) -> HostResult<()> {
        self.lock_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_lock.load(Ordering::SeqCst) {
            return Err(HostError::LockFailed("mock lock failure".into()));
        }
        Ok(())
    }
}
