//! Decimal-as-string fields
//!
//! Glucose values and dose units travel as decimal strings (the store keeps
//! them as fixed-precision numerics). Exports written by older versions used
//! JSON numbers, so both forms are accepted and normalized to a string.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Text(String),
    Number(serde_json::Number),
}

/// Deserialize a decimal that may arrive as a JSON string or number
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match DecimalRepr::deserialize(deserializer)? {
        DecimalRepr::Text(s) => s,
        DecimalRepr::Number(n) => n.to_string(),
    })
}

/// Parse a decimal string into a finite f64.
///
/// Returns `None` for anything that is not a finite number, including
/// `"NaN"` and `"inf"`, which `f64::from_str` would otherwise accept.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_decimal")]
        value: String,
    }

    #[test]
    fn test_parse_decimal_valid() {
        assert_eq!(parse_decimal("5.3"), Some(5.3));
        assert_eq!(parse_decimal(" 6.7 "), Some(6.7));
        assert_eq!(parse_decimal("12"), Some(12.0));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("5,3"), None);
    }

    #[test]
    fn test_deserialize_string_or_number() {
        let a: Holder = serde_json::from_str(r#"{"value": "5.4"}"#).unwrap();
        assert_eq!(a.value, "5.4");

        let b: Holder = serde_json::from_str(r#"{"value": 7.1}"#).unwrap();
        assert_eq!(b.value, "7.1");
    }
}
