//! Transport for simulated devices

use super::DeviceTransport;
use async_trait::async_trait;
use robolink_core::ConnectionError;

/// Transport that never answers
///
/// Used when a device is only simulated: every request yields nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTransport;

impl NoOpTransport {
    /// Create a new no-op transport
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DeviceTransport for NoOpTransport {
    async fn request(&self, _args: &[String]) -> Result<String, ConnectionError> {
        Err(ConnectionError::Simulated)
    }

    fn endpoint(&self) -> String {
        "simulated".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_never_answers() {
        let transport = NoOpTransport::new();
        let result = transport.request(&["connect".to_string()]).await;
        assert_eq!(result, Err(ConnectionError::Simulated));
    }
}
