use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parameter input as it arrives from a form field, a query string or a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

/// Raw values keyed by parameter name. A missing key means "use the initial value".
pub type Overrides = HashMap<String, RawValue>;

impl RawValue {
    /// Numeric reading of the input, or `None` when it carries no number.
    ///
    /// Text is read leniently: leading whitespace is skipped and the longest
    /// numeric prefix wins, so `"12.5s"` reads as `12.5` and `"abc"` as nothing.
    pub fn parse(&self) -> Option<f64> {
        match self {
            RawValue::Number(value) if value.is_nan() => None,
            RawValue::Number(value) => Some(*value),
            RawValue::Text(text) => parse_leading_float(text),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(value) => write!(f, "{value}"),
            RawValue::Text(text) => f.write_str(text),
        }
    }
}

fn float_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
            .expect("valid regex")
    })
}

fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let matched = float_prefix().find(trimmed)?.as_str();
    let unsigned = matched.trim_start_matches(['+', '-']);
    let negative = matched.starts_with('-');
    let magnitude = if unsigned == "Infinity" {
        f64::INFINITY
    } else {
        unsigned.parse::<f64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}
