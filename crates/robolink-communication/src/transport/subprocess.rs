//! Subprocess transport
//!
//! Each request launches the module executable with the argument list as
//! argv and captures its output. The process is expected to exit after
//! answering.

use super::{non_empty, DeviceTransport};
use async_trait::async_trait;
use robolink_core::ConnectionError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Transport that runs an executable per request
#[derive(Debug, Clone)]
pub struct SubprocessTransport {
    executable: PathBuf,
}

impl SubprocessTransport {
    /// Create a transport for the given executable
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Path of the executable
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[async_trait]
impl DeviceTransport for SubprocessTransport {
    async fn request(&self, args: &[String]) -> Result<String, ConnectionError> {
        let endpoint = self.endpoint();
        let output = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ConnectionError::SpawnFailed {
                executable: endpoint.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            tracing::debug!("{} exited with {}", endpoint, output.status);
        }

        // stdout first, then stderr
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        non_empty(&endpoint, text)
    }

    fn endpoint(&self) -> String {
        self.executable.display().to_string()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable_fails_to_spawn() {
        let transport = SubprocessTransport::new("/nonexistent/Code/Connector");
        let result = transport.request(&["connect".to_string()]).await;
        assert!(matches!(result, Err(ConnectionError::SpawnFailed { .. })));
    }

    #[tokio::test]
    async fn test_echo_captures_stdout() {
        let transport = SubprocessTransport::new("echo");
        let text = transport
            .request(&["<done:".to_string(), "ok>".to_string()])
            .await
            .unwrap();
        assert_eq!(text.trim(), "<done: ok>");
    }

    #[tokio::test]
    async fn test_silent_process_is_no_response() {
        let transport = SubprocessTransport::new("true");
        let result = transport.request(&[]).await;
        assert!(matches!(result, Err(ConnectionError::NoResponse { .. })));
    }
}
