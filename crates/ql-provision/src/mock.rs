//! Mock provisioning source for testing. Serves a fixed result and counts fetches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{ProvisionError, ProvisionResult};
use crate::source::{ProvisionSource, RawProvisioning};

/// A source that returns a canned result.
pub struct MockSource {
    result: ProvisionResult<RawProvisioning>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl MockSource {
    pub fn new(raw: RawProvisioning) -> Self {
        Self {
            result: Ok(raw),
            delay: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with `err`.
    pub fn failing(err: ProvisionError) -> Self {
        Self {
            result: Err(err),
            delay: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Sleep inside each fetch, to widen races in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `fetch` has been called.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ProvisionSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self) -> ProvisionResult<RawProvisioning> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.result.clone()
    }
}
