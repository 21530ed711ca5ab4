use std::sync::Mutex;

use async_trait::async_trait;

use crate::{GenerativeService, ServiceError, ServiceRequest};

enum Reply {
    Text(String),
    Error(ServiceError),
}

/// A mock service for tests that returns a preconfigured answer
/// and records every request it receives.
pub struct MockService {
    reply: Reply,
    requests: Mutex<Vec<ServiceRequest>>,
}

impl MockService {
    /// Create a mock that answers every request with `text`.
    pub fn success(text: &str) -> Self {
        Self {
            reply: Reply::Text(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that fails every request with `error`.
    pub fn failure(error: ServiceError) -> Self {
        Self {
            reply: Reply::Error(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ServiceRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &ServiceRequest) -> Result<String, ServiceError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Error(error) => Err(error.clone()),
        }
    }
}
