//! Money and percentage parsing for provider values
//!
//! Nothing here fails: text that does not look like a number is `None`.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*%").expect("valid percent pattern"));

/// Parse a decimal amount with locale disambiguation.
///
/// - both `.` and `,`: the right-most one is the decimal separator
///   (`"1.234.567,89"` -> 1234567.89, `"899,998.2"` -> 899998.2)
/// - only one `,`: decimal comma (`"899998,2"` -> 899998.2)
/// - several `,` or several `.`: thousands separators (`"1.234.567"` -> 1234567)
/// - a single `.`: decimal point
///
/// `$` signs and whitespace are ignored.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned = clean(s);
    if cleaned.is_empty() {
        return None;
    }

    let dots = cleaned.matches('.').count();
    let commas = cleaned.matches(',').count();

    let normalized = if dots > 0 && commas > 0 {
        let last_dot = cleaned.rfind('.').unwrap_or(0);
        let last_comma = cleaned.rfind(',').unwrap_or(0);
        if last_comma > last_dot {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned.replace(',', "")
        }
    } else if commas == 1 {
        cleaned.replace(',', ".")
    } else if commas > 1 {
        cleaned.replace(',', "")
    } else if dots > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    to_finite(&normalized)
}

/// Parse a peso amount as shown on a web page: `.` always groups
/// thousands and `,` (if any) starts the cents (`"$ 324.999"` -> 324999).
pub fn parse_peso_amount(s: &str) -> Option<f64> {
    let cleaned = clean(s);
    if cleaned.is_empty() {
        return None;
    }
    let normalized = cleaned.replace('.', "").replace(',', ".");
    to_finite(&normalized)
}

/// First `<number>%` in the text, as a fraction (`"15% OFF"` -> 0.15)
pub fn parse_percent(s: &str) -> Option<f64> {
    let caps = PERCENT_RE.captures(s)?;
    percent_to_fraction(caps.get(1)?.as_str())
}

/// `"7,5"` -> 0.075
pub fn percent_to_fraction(num: &str) -> Option<f64> {
    to_finite(&num.trim().replace(',', ".")).map(|v| v / 100.0)
}

/// Numeric JSON passes through unchanged; strings go through
/// [`parse_amount`]; anything else is unknown.
pub fn amount_from_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Whole count from JSON (`3`, `3.0`, `"3"`); non-positive is unknown
pub fn count_from_value(v: &Value) -> Option<u32> {
    let f = amount_from_value(v)?;
    if f >= 1.0 && f <= u32::MAX as f64 {
        Some(f.trunc() as u32)
    } else {
        None
    }
}

fn clean(s: &str) -> String {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace() && *c != '$').collect();
    cleaned.trim_end_matches(['.', ',']).to_string()
}

fn to_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_mixed_separators() {
        assert_relative_eq!(parse_amount("1.234.567,89").unwrap(), 1_234_567.89);
        assert_relative_eq!(parse_amount("899,998.2").unwrap(), 899_998.2);
        assert_relative_eq!(parse_amount("$ 899.998,2").unwrap(), 899_998.2);
    }

    #[test]
    fn test_comma_only() {
        assert_relative_eq!(parse_amount("899998,2").unwrap(), 899_998.2);
        assert_relative_eq!(parse_amount("1,234,567").unwrap(), 1_234_567.0);
    }

    #[test]
    fn test_dots_only() {
        assert_relative_eq!(parse_amount("1.234.567").unwrap(), 1_234_567.0);
        assert_relative_eq!(parse_amount("899998.2").unwrap(), 899_998.2);
        assert_relative_eq!(parse_amount("$1.899.998.").unwrap(), 1_899_998.0);
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount("consultar"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_idempotent_on_numbers() {
        for v in [0.0, 41_666.67, 1_234_567.89, 899_998.2, 500_000.0, 0.083333] {
            let once = parse_amount(&v.to_string()).unwrap();
            assert_eq!(once, v);
            assert_eq!(parse_amount(&once.to_string()), Some(v));
            assert_eq!(amount_from_value(&json!(v)), Some(v));
        }
    }

    #[test]
    fn test_peso_amount() {
        assert_eq!(parse_peso_amount("$ 324.999"), Some(324_999.0));
        assert_eq!(parse_peso_amount("1.413.747."), Some(1_413_747.0));
        assert_relative_eq!(parse_peso_amount("$ 1.413.747,50").unwrap(), 1_413_747.5);
        assert_eq!(parse_peso_amount("-"), None);
    }

    #[test]
    fn test_percent() {
        assert_relative_eq!(parse_percent("15% OFF").unwrap(), 0.15);
        assert_relative_eq!(parse_percent("7,5% Adel. + 23 CUOTAS").unwrap(), 0.075);
        assert_relative_eq!(parse_percent("CFT: 144.10 %").unwrap(), 1.441);
        assert_eq!(parse_percent("3 CUOTAS sin interés"), None);
    }

    #[test]
    fn test_values() {
        assert_eq!(amount_from_value(&json!("500000")), Some(500_000.0));
        assert_eq!(amount_from_value(&json!(null)), None);
        assert_eq!(amount_from_value(&json!(true)), None);
        assert_eq!(count_from_value(&json!(3)), Some(3));
        assert_eq!(count_from_value(&json!("12")), Some(12));
        assert_eq!(count_from_value(&json!(0)), None);
    }
}
