//! Turns raw form text into request payloads

use crate::api::types::{FieldType, IntentionRequest};
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest numeric prefix accepted by browser-style float parsing
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("numeric prefix pattern is valid")
});

/// Parse a float the permissive way a browser form does
///
/// Leading whitespace is skipped and the longest numeric prefix is used, so
/// `"7.83 Hz"` gives `7.83`. Text without a numeric prefix gives NaN rather than an error.
pub fn parse_float_lenient(text: &str) -> f64 {
    let trimmed = text.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');

    let Some(prefix) = NUMERIC_PREFIX.find(trimmed) else {
        return f64::NAN;
    };

    match prefix.as_str() {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        digits => digits.parse().unwrap_or(f64::NAN),
    }
}

/// Assemble a broadcast payload from form values
///
/// Always succeeds. Unparseable numeric text becomes NaN and is sent as-is.
pub fn build_broadcast_request(
    intention: &str,
    frequency_text: &str,
    field_type: FieldType,
    amplify: bool,
    multiplier_text: &str,
) -> IntentionRequest {
    let request = IntentionRequest {
        intention: intention.to_string(),
        frequency: parse_float_lenient(frequency_text),
        field_type,
        amplify,
        multiplier: parse_float_lenient(multiplier_text),
    };

    if request.frequency.is_nan() || request.multiplier.is_nan() {
        tracing::debug!(
            frequency_text,
            multiplier_text,
            "Non-numeric broadcast input, sending NaN"
        );
    }

    request
}

/// Search term for the healing code catalog; empty means no filter
pub fn build_code_search_query(query_text: &str) -> String {
    query_text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_passes_through() {
        for field in FieldType::ALL {
            let request = build_broadcast_request("peace", "7.83", field, false, "1.0");
            assert_eq!(request.field_type, field);
        }
    }

    #[test]
    fn test_numeric_fields_parsed() {
        let request = build_broadcast_request("peace", "432", FieldType::Torus, true, "2.5");
        assert_eq!(request.frequency, 432.0);
        assert_eq!(request.multiplier, 2.5);
        assert!(request.amplify);
        assert_eq!(request.intention, "peace");
    }

    #[test]
    fn test_invalid_frequency_becomes_nan() {
        let request = build_broadcast_request("peace", "abc", FieldType::Merkaba, false, "1.0");
        assert!(request.frequency.is_nan());
        assert_eq!(request.multiplier, 1.0);

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("frequency").unwrap().is_null());
    }

    #[test]
    fn test_lenient_float_parsing() {
        assert_eq!(parse_float_lenient("7.83"), 7.83);
        assert_eq!(parse_float_lenient("  7.83Hz"), 7.83);
        assert_eq!(parse_float_lenient("-.5"), -0.5);
        assert_eq!(parse_float_lenient("5."), 5.0);
        assert_eq!(parse_float_lenient("1e3"), 1000.0);
        assert_eq!(parse_float_lenient("1e"), 1.0);
        assert_eq!(parse_float_lenient("Infinity"), f64::INFINITY);
        assert_eq!(parse_float_lenient("-Infinityx"), f64::NEG_INFINITY);
        assert!(parse_float_lenient("").is_nan());
        assert!(parse_float_lenient(".").is_nan());
        assert!(parse_float_lenient("inf").is_nan());
        assert!(parse_float_lenient("abc").is_nan());
    }

    #[test]
    fn test_code_query_verbatim() {
        assert_eq!(build_code_search_query(""), "");
        assert_eq!(build_code_search_query(" love & light "), " love & light ");
    }
}
