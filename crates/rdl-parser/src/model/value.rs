//! Literal values: numeric bounds and default values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric literal, classified as integral or floating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int64(i64),
    Float64(f64),
}

impl Number {
    /// Classifies a float: whole values inside the `i64` range become integers.
    pub fn from_f64(n: f64) -> Self {
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
            Number::Int64(n as i64)
        } else {
            Number::Float64(n)
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Number::Int64(n) => n
                .checked_neg()
                .map(Number::Int64)
                .unwrap_or(Number::Float64(-(n as f64))),
            Number::Float64(n) => Number::Float64(-n),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int64(n) => write!(f, "{}", n),
            Number::Float64(n) => write!(f, "{}", n),
        }
    }
}

/// A default value attached to a struct field or resource input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(Number),
    String(String),
    /// An enum symbol. Serialized as a bare string.
    Symbol(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(Number::from_f64(3.0), Number::Int64(3));
        assert_eq!(Number::from_f64(2.5), Number::Float64(2.5));
        assert_eq!(Number::Int64(4).negate(), Number::Int64(-4));
    }

    #[test]
    fn test_value_json() {
        assert_eq!(serde_json::to_string(&Value::Symbol("RED".into())).unwrap(), "\"RED\"");
        assert_eq!(serde_json::to_string(&Value::Number(Number::Int64(7))).unwrap(), "7");
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
    }
}
