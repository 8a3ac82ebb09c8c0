//! Device transports
//!
//! A transport carries one request (an argument list) to an external
//! endpoint and returns the raw response text. Transports are stateless
//! between calls and never retry.
//!
//! Supported transports:
//! - Subprocess: runs the module executable once per request
//! - Channel: a Unix domain socket served by a long-running module process
//! - NoOp: never answers (simulated devices)

#[cfg(unix)]
pub mod channel;
pub mod noop;
pub mod subprocess;

#[cfg(unix)]
pub use channel::ChannelTransport;
pub use noop::NoOpTransport;
pub use subprocess::SubprocessTransport;

use async_trait::async_trait;
use robolink_core::ConnectionError;

/// One-shot request/response carrier to a device endpoint
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Send `args` and return the complete response text
    ///
    /// An empty or absent response is an error.
    async fn request(&self, args: &[String]) -> Result<String, ConnectionError>;

    /// Human readable endpoint description for logs
    fn endpoint(&self) -> String;
}

/// Reject blank responses
pub(crate) fn non_empty(endpoint: &str, text: String) -> Result<String, ConnectionError> {
    if text.trim().is_empty() {
        Err(ConnectionError::NoResponse {
            endpoint: endpoint.to_string(),
        })
    } else {
        Ok(text)
    }
}
