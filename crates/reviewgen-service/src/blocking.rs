use tokio::runtime::Runtime;

use crate::{GenerativeService, ServiceError, ServiceRequest};

/// Blocking wrapper around an async `GenerativeService`.
///
/// Owns an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI worker thread.
pub struct BlockingService<S> {
    inner: S,
    rt: Runtime,
}

impl<S: GenerativeService> BlockingService<S> {
    pub fn new(inner: S) -> std::io::Result<Self> {
        Ok(Self {
            inner,
            rt: Runtime::new()?,
        })
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn generate(&self, request: &ServiceRequest) -> Result<String, ServiceError> {
        self.rt.block_on(self.inner.generate(request))
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}
