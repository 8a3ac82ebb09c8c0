//! Connection parameters
//!
//! A device module declares an ordered list of named, typed parameters
//! (port, address, speed limits, ...). On the wire only the values travel,
//! in declaration order, as plain string tokens after the `connect` command.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};

/// Type tag of a connection parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// Free text
    String,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// `true` / `false`
    Bool,
}

/// Typed value of a connection parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParameterValue {
    /// Free text
    String(String),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean flag
    Bool(bool),
}

impl ParameterValue {
    /// Type tag of this value
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            Self::String(_) => ParameterType::String,
            Self::Int(_) => ParameterType::Int,
            Self::Float(_) => ParameterType::Float,
            Self::Bool(_) => ParameterType::Bool,
        }
    }

    /// Parse a wire token as a value of the given type
    pub fn parse(kind: ParameterType, token: &str) -> Option<Self> {
        match kind {
            ParameterType::String => Some(Self::String(token.to_string())),
            ParameterType::Int => token.trim().parse().ok().map(Self::Int),
            ParameterType::Float => token.trim().parse().ok().map(Self::Float),
            ParameterType::Bool => match token.trim() {
                "true" => Some(Self::Bool(true)),
                "false" => Some(Self::Bool(false)),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Named connection parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionParameter {
    /// Parameter name
    pub name: String,
    /// Parameter value
    pub value: ParameterValue,
}

impl ConnectionParameter {
    /// Create a new connection parameter
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Flatten parameters into wire tokens, preserving order
    pub fn to_wire(parameters: &[Self]) -> Vec<String> {
        parameters.iter().map(|p| p.value.to_string()).collect()
    }

    /// Rebuild parameters from wire tokens using `template` for names and types
    ///
    /// Fails as a whole when the token count differs from the template or
    /// when any token does not parse as its declared type.
    pub fn from_wire(template: &[Self], tokens: &[String]) -> Result<Vec<Self>, DecodeError> {
        if template.len() != tokens.len() {
            return Err(DecodeError::ParameterCount {
                expected: template.len(),
                actual: tokens.len(),
            });
        }

        template
            .iter()
            .zip(tokens)
            .map(|(param, token)| {
                ParameterValue::parse(param.value.parameter_type(), token)
                    .map(|value| Self::new(param.name.clone(), value))
                    .ok_or_else(|| DecodeError::Parameter {
                        name: param.name.clone(),
                        value: token.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Vec<ConnectionParameter> {
        vec![
            ConnectionParameter::new("address", ParameterValue::String("192.168.0.10".into())),
            ConnectionParameter::new("port", ParameterValue::Int(502)),
            ConnectionParameter::new("speed_scale", ParameterValue::Float(0.5)),
            ConnectionParameter::new("simulate", ParameterValue::Bool(false)),
        ]
    }

    #[test]
    fn test_to_wire_preserves_order() {
        assert_eq!(
            ConnectionParameter::to_wire(&template()),
            vec!["192.168.0.10", "502", "0.5", "false"]
        );
    }

    #[test]
    fn test_from_wire_restores_parameters() {
        let params = template();
        let tokens = ConnectionParameter::to_wire(&params);
        assert_eq!(ConnectionParameter::from_wire(&params, &tokens).unwrap(), params);
    }

    #[test]
    fn test_from_wire_rejects_bad_values() {
        let tokens: Vec<String> = ["10.0.0.1", "port", "1.0", "true"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            ConnectionParameter::from_wire(&template(), &tokens),
            Err(DecodeError::Parameter {
                name: "port".to_string(),
                value: "port".to_string()
            })
        );

        assert_eq!(
            ConnectionParameter::from_wire(&template(), &tokens[..2]),
            Err(DecodeError::ParameterCount {
                expected: 4,
                actual: 2
            })
        );
    }
}
