use serde_json::{Number, Value};

/// Largest magnitude at which every integral `f64` is exactly representable.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Canonical join key for an opaque identifier. Numbers and strings compare by
/// their text form so `7`, `7.0` and `"7"` refer to the same record.
pub fn normalize_id(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Reads a free-text field such as a name, make, model or category. Upstream
/// rows sometimes carry these as numbers (`"model": 308`), which read as their
/// text form. Blank strings, nulls, bools and containers are `None`.
pub fn normalize_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Integral floats print without a fractional part, so `7.0` reads as `"7"`.
fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT_FLOAT => (v as i64).to_string(),
        _ => n.to_string(),
    }
}
