mod blocking;
mod gemini;
pub mod mock;
mod traits;

pub use blocking::BlockingService;
pub use gemini::{GeminiService, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use traits::{GenerativeService, ServiceError, ServiceRequest};
