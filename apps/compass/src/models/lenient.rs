//! Deserializers for remote payload fields that arrive as either numbers or
//! numeric strings (`92`, `"92"`, `"92%"`).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Accepts a number or numeric string; anything else becomes `0.0`.
pub fn score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value).filter(|n| n.is_finite()).unwrap_or(0.0))
}

/// Accepts a non-negative integer or numeric string; anything else becomes `0`.
pub fn id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value)
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
        .unwrap_or(0))
}
