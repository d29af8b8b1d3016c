// src/deutils.rs
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// The radio API is loosely typed: numbers arrive as strings, strings as
// numbers, and absent values as null or "". These helpers take whatever
// arrives and keep the payload structs strongly typed.

/// Any scalar as an optional, trimmed string; null and "" are None.
pub fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Any scalar as a string, null becomes "".
pub fn deserialize_string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_string(deserializer)?.unwrap_or_default())
}

/// Seconds given as a number or numeric string; null, "" and negatives are None.
pub fn deserialize_opt_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let v = Option::<Value>::deserialize(deserializer)?;
    let secs = match v {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => Some(
            s.trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("non-numeric seconds: {}", s)))?,
        ),
        Some(other) => return Err(D::Error::custom(format!("unexpected seconds value: {}", other))),
    };
    Ok(secs.filter(|s| s.is_finite() && *s > 0.0))
}

/// Seconds formatted for a command line argument, without a trailing ".0"
pub fn seconds_arg(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as u64)
    } else {
        format!("{:.3}", secs)
    }
}
