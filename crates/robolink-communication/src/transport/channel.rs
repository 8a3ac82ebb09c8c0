//! Persistent channel transport
//!
//! Talks to a long-running module process over a Unix domain socket. Each
//! request opens a fresh connection, writes a single newline-terminated
//! frame of space-separated arguments, closes its write half and reads until
//! the peer closes the connection.

use super::{non_empty, DeviceTransport};
use async_trait::async_trait;
use robolink_core::ConnectionError;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

/// Transport over a Unix domain socket at an explicit path
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    path: PathBuf,
}

impl ChannelTransport {
    /// Create a transport for the socket at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Socket path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frame sent for an argument list
    pub fn frame(args: &[String]) -> String {
        format!("{}\n", args.join(" "))
    }

    async fn exchange(&self, args: &[String]) -> std::io::Result<String> {
        let mut stream = UnixStream::connect(&self.path).await?;
        stream.write_all(Self::frame(args).as_bytes()).await?;
        stream.shutdown().await?;

        let mut response = String::new();
        stream.read_to_string(&mut response).await?;
        Ok(response)
    }
}

#[async_trait]
impl DeviceTransport for ChannelTransport {
    async fn request(&self, args: &[String]) -> Result<String, ConnectionError> {
        let endpoint = self.endpoint();
        let text = self
            .exchange(args)
            .await
            .map_err(|e| ConnectionError::ChannelIo {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        non_empty(&endpoint, text)
    }

    fn endpoint(&self) -> String {
        self.path.display().to_string()
    }
}
