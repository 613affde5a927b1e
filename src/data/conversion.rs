//! Lenient value conversions shared by the data loaders.
//!
//! Source files disagree on whether identifiers, districts and years are
//! strings or numbers, so the deserializers here accept either.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses a district the way the map properties spell it: `"08"`, `"8"`, `" 8 "`.
///
/// Leading zeros are dropped and trailing non-digits are ignored, so
/// `"08"` and `"8"` resolve to the same district. Returns `None` when no
/// leading integer is present.
pub fn parse_district(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Renders a JSON scalar as the string a user would type
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// `"2024"`, `2024` or missing → `Option<String>`
pub fn opt_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_to_string))
}

/// `"2024"` or `2024` → `String`; missing or null is an error
pub fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

/// `8`, `8.0` or `"08"` → `8`
pub fn district_number<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| serde::de::Error::custom(format!("district {} is not an integer", n))),
        Value::String(s) => parse_district(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("district {:?} is not an integer", s))),
        other => Err(serde::de::Error::custom(format!(
            "district must be a number or string, got {}",
            other
        ))),
    }
}

/// `1000000`, `"1000000"`, `"1,000,000"` or missing → `Option<f64>`
pub fn opt_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.replace(',', "").trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// `[lng, lat]` or `[lng, lat, alt]` → `[lng, lat]`
fn planar<E: serde::de::Error>(position: Vec<f64>) -> std::result::Result<[f64; 2], E> {
    match position.as_slice() {
        [lng, lat, ..] => Ok([*lng, *lat]),
        short => Err(E::custom(format!(
            "position needs at least 2 numbers, got {}",
            short.len()
        ))),
    }
}

fn planar_ring<E: serde::de::Error>(ring: Vec<Vec<f64>>) -> std::result::Result<Vec<[f64; 2]>, E> {
    ring.into_iter().map(planar).collect()
}

/// Polygon rings with any altitude dropped from each position
pub fn planar_rings<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<[f64; 2]>>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Vec<Vec<f64>>>::deserialize(deserializer)?
        .into_iter()
        .map(planar_ring)
        .collect()
}

/// MultiPolygon coordinates with any altitude dropped from each position
pub fn planar_polygons<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<Vec<Vec<[f64; 2]>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Vec<Vec<Vec<f64>>>>::deserialize(deserializer)?
        .into_iter()
        .map(|polygon| polygon.into_iter().map(planar_ring).collect())
        .collect()
}
