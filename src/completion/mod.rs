//! Completion endpoint trait
//!
//! The analyzer only needs `complete(model, prompt) -> reply`. Replies are
//! treated as opaque and non-deterministic; any call may fail.

mod together;

pub use together::TogetherClient;

use thiserror::Error;

/// Failure of a completion call
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion endpoint unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("completion endpoint rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("completion endpoint rate limit exceeded")]
    RateLimited,

    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid completion response: {message}")]
    InvalidResponse { message: String },
}

/// A chat-completion backend
pub trait CompletionEndpoint {
    /// Human-readable backend name, for logs
    fn name(&self) -> &str;

    /// Send a single user prompt and return the reply text
    fn complete(&self, model: &str, prompt: &str) -> Result<String, CompletionError>;
}
