//! Device Response Parser
//!
//! Decodes the raw text returned by a device endpoint. Four shapes exist:
//! - bracketed status markers (`<done: ...>`, `<failed: ...>`)
//! - six-component numeric vectors (poses)
//! - line batches of `<node> <descriptor>` pairs
//! - JSON array payloads (telemetry)
//!
//! Parsing never yields partial data: a pose is either complete or rejected,
//! a payload either decodes as a whole or not at all.

use robolink_core::{DecodeError, DeviceKind, NodeUpdate, PerformingState, Pose};
use serde::de::DeserializeOwned;

/// Outcome carried by a bracketed status marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    /// `<done>` or `<done: message>`
    Done(String),
    /// `<failed>` or `<failed: message>`
    Failed(String),
}

impl ResponseStatus {
    /// Whether the device reported success
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Status message, defaulting to "Done" / "Failed" for bare markers
    pub fn message(&self) -> &str {
        match self {
            Self::Done(msg) | Self::Failed(msg) => msg,
        }
    }
}

const DONE_MARKER: &str = "<done";
const FAILED_MARKER: &str = "<failed";

/// Parser for device protocol responses
pub struct ResponseParser;

impl ResponseParser {
    /// Parse a bracketed status marker
    ///
    /// Whichever of `<done` / `<failed` appears first in the text wins.
    pub fn parse_status(response: &str) -> Result<ResponseStatus, DecodeError> {
        let done = Self::find_marker(response, DONE_MARKER);
        let failed = Self::find_marker(response, FAILED_MARKER);

        let (marker, rest, success) = match (done, failed) {
            (Some((d, rest_d)), Some((f, _))) if d < f => (DONE_MARKER, rest_d, true),
            (_, Some((_, rest_f))) => (FAILED_MARKER, rest_f, false),
            (Some((_, rest_d)), None) => (DONE_MARKER, rest_d, true),
            (None, None) => {
                return Err(DecodeError::MissingStatus {
                    response: response.to_string(),
                })
            }
        };

        let message = match rest.strip_prefix(':') {
            Some(body) => body.split('>').next().unwrap_or_default().trim(),
            None => "",
        };
        let message = if message.is_empty() {
            Self::default_message(marker).to_string()
        } else {
            message.to_string()
        };

        Ok(if success {
            ResponseStatus::Done(message)
        } else {
            ResponseStatus::Failed(message)
        })
    }

    /// Locate a marker that is followed by `:` or `>`, returning its offset
    /// and the text after the marker word
    fn find_marker<'a>(text: &'a str, marker: &str) -> Option<(usize, &'a str)> {
        let mut offset = 0;
        while let Some(pos) = text[offset..].find(marker) {
            let start = offset + pos;
            let rest = &text[start + marker.len()..];
            if rest.starts_with(':') || rest.starts_with('>') {
                return Some((start, rest));
            }
            offset = start + marker.len();
        }
        None
    }

    fn default_message(marker: &str) -> &'static str {
        if marker == DONE_MARKER {
            "Done"
        } else {
            "Failed"
        }
    }

    /// Parse exactly six whitespace-separated numbers as a pose
    pub fn parse_pose(text: &str) -> Result<Pose, DecodeError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != Pose::COMPONENTS {
            return Err(DecodeError::PoseComponents {
                count: tokens.len(),
            });
        }

        let mut components = [0.0; Pose::COMPONENTS];
        for (slot, token) in components.iter_mut().zip(&tokens) {
            *slot = token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DecodeError::PoseToken {
                    token: token.to_string(),
                })?;
        }

        Ok(Pose::from_components(components))
    }

    /// Parse a line batch of `<node> <descriptor>` pairs
    ///
    /// Returns `None` when the text holds no lines at all. Lines without a
    /// separating space are dropped, as are robot lines whose descriptor is
    /// not a valid pose.
    pub fn parse_line_batch(text: &str, kind: DeviceKind) -> Option<Vec<NodeUpdate>> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return None;
        }

        let updates = lines
            .into_iter()
            .filter_map(|line| {
                let (node, descriptor) = line.split_once(' ')?;
                let node = node.to_string();
                match kind {
                    DeviceKind::Robot => match Self::parse_pose(descriptor) {
                        Ok(pose) => Some(NodeUpdate::Position { node, pose }),
                        Err(e) => {
                            tracing::debug!("Dropping node line {:?}: {}", line, e);
                            None
                        }
                    },
                    DeviceKind::Tool => Some(NodeUpdate::Action {
                        node,
                        action: descriptor.trim().to_string(),
                    }),
                }
            })
            .collect();

        Some(updates)
    }

    /// Decode a JSON array payload
    ///
    /// Empty text is "no data" (`Ok(None)`), distinct from an empty array.
    pub fn parse_payload<T: DeserializeOwned>(
        text: &str,
        kind: &str,
    ) -> Result<Option<Vec<T>>, DecodeError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Vec<T>>(text)
            .map(Some)
            .map_err(|e| DecodeError::Payload {
                kind: kind.to_string(),
                reason: e.to_string(),
            })
    }

    /// Parse the reply to `performing_state`
    pub fn parse_performing_state(text: &str) -> Result<PerformingState, DecodeError> {
        let trimmed = text.trim();
        if trimmed.starts_with('<') {
            return Self::parse_status(trimmed).map(|status| {
                if status.is_done() {
                    PerformingState::Completed
                } else {
                    PerformingState::Error
                }
            });
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "processing" => Ok(PerformingState::Processing),
            "completed" | "done" => Ok(PerformingState::Completed),
            "error" | "failed" => Ok(PerformingState::Error),
            _ => Err(DecodeError::PerformingState {
                text: trimmed.to_string(),
            }),
        }
    }
}
