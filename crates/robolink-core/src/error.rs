//! Error handling for Robolink
//!
//! Provides error types for every layer that talks to a device:
//! - Connection errors (transport to the external endpoint)
//! - Protocol errors (a well-formed response that encodes a failure)
//! - Decode errors (response text that does not match the expected shape)
//! - Motion errors (degenerate motion requests)
//!
//! None of these are fatal: the connector and model layers absorb them,
//! record a line in the device output and degrade to "not connected" or
//! "no motion performed". The typed variants exist so that the absorbing
//! code can log precisely what went wrong.

use thiserror::Error;

/// Transport failure
///
/// The endpoint produced no usable response. The cause is not
/// differentiated any further than this.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// The executable could not be started or produced no output
    #[error("No response from {endpoint}")]
    NoResponse {
        /// The endpoint that was addressed.
        endpoint: String,
    },

    /// The local channel could not be opened, written or read
    #[error("Channel I/O failed on {endpoint}: {reason}")]
    ChannelIo {
        /// The channel path.
        endpoint: String,
        /// The underlying I/O error text.
        reason: String,
    },

    /// The subprocess could not be spawned
    #[error("Failed to spawn {executable}: {reason}")]
    SpawnFailed {
        /// The executable path.
        executable: String,
        /// The underlying I/O error text.
        reason: String,
    },

    /// The transport never answers (simulated device)
    #[error("Device is simulated and has no external endpoint")]
    Simulated,
}

/// Protocol failure
///
/// The device answered, and the answer says the operation failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// `<failed: ...>` reported by the device
    #[error("{message}")]
    Failed {
        /// The message reported by the device, verbatim.
        message: String,
    },

    /// The device reported an error-like performing state
    #[error("Device reported an execution error")]
    ExecutionError,
}

/// Decode failure
///
/// The device answered with text that does not match the expected shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// No `<done...>` or `<failed...>` marker in the response
    #[error("Response carries no status marker: {response:?}")]
    MissingStatus {
        /// The offending response.
        response: String,
    },

    /// A pose did not consist of exactly six numbers
    #[error("Expected 6 pose components, got {count}")]
    PoseComponents {
        /// Number of tokens found.
        count: usize,
    },

    /// A pose token was not a number
    #[error("Invalid pose component {token:?}")]
    PoseToken {
        /// The token that failed to parse.
        token: String,
    },

    /// Unknown performing state word
    #[error("Unknown performing state {text:?}")]
    PerformingState {
        /// The offending text.
        text: String,
    },

    /// A structured payload failed to decode
    #[error("Invalid {kind} payload: {reason}")]
    Payload {
        /// Which payload was being decoded.
        kind: String,
        /// The decoder's message.
        reason: String,
    },

    /// Connection parameter count did not match the template
    #[error("Expected {expected} parameter values, got {actual}")]
    ParameterCount {
        /// Number of parameters in the template.
        expected: usize,
        /// Number of values received.
        actual: usize,
    },

    /// Connection parameter values did not match their template
    #[error("Invalid value {value:?} for parameter {name}")]
    Parameter {
        /// The parameter name.
        name: String,
        /// The wire value.
        value: String,
    },
}

/// Degenerate motion input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Speed must be strictly positive and finite
    #[error("Move speed must be > 0, got {speed}")]
    NonPositiveSpeed {
        /// The rejected speed.
        speed: f64,
    },
}

/// Main error type for Robolink
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Decode error
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Motion error
    #[error(transparent)]
    Motion(#[from] MotionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a transport error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::Io(_))
    }

    /// Check if this is an explicit failure reported by the device
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Check if this is a decode error
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::Decode(_) | Error::Json(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_is_verbatim() {
        let err = ProtocolError::Failed {
            message: "limit exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "limit exceeded");
    }

    #[test]
    fn test_error_classification() {
        let err: Error = ConnectionError::NoResponse {
            endpoint: "/tmp/arm1_robot_connector_socket".to_string(),
        }
        .into();
        assert!(err.is_connection_error());
        assert!(!err.is_decode_error());

        let err: Error = DecodeError::PoseComponents { count: 5 }.into();
        assert!(err.is_decode_error());
        assert_eq!(err.to_string(), "Expected 6 pose components, got 5");

        let err: Error = MotionError::NonPositiveSpeed { speed: 0.0 }.into();
        assert!(!err.is_protocol_error());
        assert_eq!(err.to_string(), "Move speed must be > 0, got 0");
    }
}
