//! Device output buffer
//!
//! Every device object owns one append-only text buffer. The connector, the
//! protocol client and the telemetry monitor all report into it; the UI reads
//! it. Lines are never edited after they are appended.

use crate::events::{DeviceEvent, DeviceEventBus};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// One line of device output
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLine {
    /// When the line was appended
    pub timestamp: DateTime<Utc>,
    /// Line text, without trailing newline
    pub text: String,
}

impl std::fmt::Display for OutputLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S%.3f"), self.text)
    }
}

#[derive(Debug, Default)]
struct OutputInner {
    lines: Vec<OutputLine>,
}

/// Shared, append-only output buffer of one device
///
/// Clones share the same underlying buffer.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    device: String,
    inner: Arc<RwLock<OutputInner>>,
    events: Option<DeviceEventBus>,
}

impl OutputBuffer {
    /// Create an empty buffer for the named device
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            inner: Arc::new(RwLock::new(OutputInner::default())),
            events: None,
        }
    }

    /// Publish an [`DeviceEvent::OutputAppended`] for every appended line
    pub fn with_events(mut self, events: DeviceEventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Name of the owning device
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Append text, splitting it into lines
    ///
    /// Blank text appends nothing.
    pub fn append_line(&self, text: impl AsRef<str>) {
        let text = text.as_ref().trim_end();
        if text.trim().is_empty() {
            return;
        }

        let timestamp = Utc::now();
        let added: Vec<String> = text.lines().map(str::to_string).collect();
        {
            let mut inner = self.inner.write();
            inner.lines.extend(added.iter().map(|line| OutputLine {
                timestamp,
                text: line.clone(),
            }));
        }

        if let Some(events) = &self.events {
            for line in added {
                events.emit(DeviceEvent::OutputAppended {
                    device: self.device.clone(),
                    line,
                });
            }
        }
    }

    /// All lines
    pub fn lines(&self) -> Vec<OutputLine> {
        self.inner.read().lines.clone()
    }

    /// Whole buffer as text, one line per entry
    pub fn text(&self) -> String {
        let inner = self.inner.read();
        inner
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Most recent line, if any
    pub fn last_line(&self) -> Option<String> {
        self.inner.read().lines.last().map(|l| l.text.clone())
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.inner.read().lines.len()
    }

    /// Whether nothing was appended yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all lines
    pub fn clear(&self) {
        self.inner.write().lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_splits_lines() {
        let output = OutputBuffer::new("arm");
        output.append_line("connected\nfirmware 1.2\n");
        output.append_line("   ");

        assert_eq!(output.len(), 2);
        assert_eq!(output.text(), "connected\nfirmware 1.2");
        assert_eq!(output.last_line().as_deref(), Some("firmware 1.2"));
    }

    #[test]
    fn test_clones_share_buffer() {
        let output = OutputBuffer::new("arm");
        let clone = output.clone();
        clone.append_line("limit exceeded");

        assert_eq!(output.text(), "limit exceeded");
        output.clear();
        assert!(clone.is_empty());
    }

    #[tokio::test]
    async fn test_append_publishes_events() {
        let bus = DeviceEventBus::new();
        let mut rx = bus.subscribe();
        let output = OutputBuffer::new("gripper").with_events(bus);

        output.append_line("Done");

        assert_eq!(
            rx.recv().await.unwrap(),
            DeviceEvent::OutputAppended {
                device: "gripper".to_string(),
                line: "Done".to_string()
            }
        );
    }
}
