use serde_json::Value;

/// Reads a monetary value. Finite numbers and numeric strings parse; anything
/// else (null, missing, "abc", NaN, infinities, bools, containers) is `0.0`.
pub fn normalize_amount(raw: &Value) -> f64 {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Reads a non-negative integer count. Returns `None` for negative,
/// fractional, out-of-range or malformed values; callers default those to zero.
pub fn normalize_count(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
                .filter(|v| *v < u64::MAX as f64)
                .map(|v| v as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Reads a boolean flag such as `isSold`. Only explicit truthy values count.
pub fn normalize_flag(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        _ => false,
    }
}
