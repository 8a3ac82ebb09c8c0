//! Telemetry payloads
//!
//! Charts and state items reported by a device module. Both arrive as JSON
//! arrays and always replace the previously held data as a whole.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Presentation hint for a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    /// Connected line
    #[default]
    Line,
    /// Bars
    Bar,
    /// Scatter points
    Point,
    /// Filled area
    Area,
}

/// One sample of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatum {
    /// Series name
    pub name: String,
    /// Domain coordinates keyed by axis name
    #[serde(default)]
    pub domain: BTreeMap<String, f64>,
    /// Sample value
    pub codomain: f64,
}

/// A named chart with its samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Chart title
    pub name: String,
    /// Presentation hint
    #[serde(default)]
    pub style: ChartStyle,
    /// Samples
    #[serde(default)]
    pub data: Vec<ChartDatum>,
}

/// A named device state, optionally grouping child states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateItem {
    /// State name
    pub name: String,
    /// Display value
    #[serde(default)]
    pub value: String,
    /// Optional icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Nested states
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<StateItem>>,
}

impl StateItem {
    /// Create a leaf state item
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            image: None,
            children: None,
        }
    }

    /// Attach child items
    pub fn with_children(mut self, children: Vec<StateItem>) -> Self {
        self.children = Some(children);
        self
    }

    /// Total number of items in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map(|c| c.iter().map(StateItem::count).sum())
            .unwrap_or(0)
    }
}

/// Latest telemetry held for one device
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Latest charts, `None` until the first successful fetch
    pub charts: Option<Vec<Chart>>,
    /// Latest states, `None` until the first successful fetch
    pub states: Option<Vec<StateItem>>,
}

impl TelemetrySnapshot {
    /// Whether nothing has been received yet
    pub fn is_empty(&self) -> bool {
        self.charts.is_none() && self.states.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_item_decodes_nested_children() {
        let json = r#"[{"name":"Axes","value":"","children":[{"name":"J1","value":"12.5"},{"name":"J2","value":"-3"}]}]"#;
        let items: Vec<StateItem> = serde_json::from_str(json).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].count(), 3);
        assert_eq!(items[0].children.as_ref().unwrap()[0].value, "12.5");
    }

    #[test]
    fn test_chart_defaults() {
        let json = r#"[{"name":"Load","data":[{"name":"J1","domain":{"t":0.0},"codomain":0.4}]}]"#;
        let charts: Vec<Chart> = serde_json::from_str(json).unwrap();

        assert_eq!(charts[0].style, ChartStyle::Line);
        assert_eq!(charts[0].data[0].domain["t"], 0.0);
    }
}
