//! Display formatting for the `/stats` endpoint.

use serde_json::{json, Value};

use webcash_types::amount::UNIT;
use webcash_types::Amount;

/// Render a raw-unit circulation total as JSON: an integer when the total
/// divides evenly into whole webcash, otherwise a float.
pub fn circulation_json(total: u128) -> Value {
    let unit = UNIT as u128;
    if total % unit == 0 {
        json!(total / unit)
    } else {
        json!(total as f64 / UNIT as f64)
    }
}

/// Human-readable circulation: thousands-separated whole part plus the
/// canonical fractional suffix, e.g. `1,234,567.00000001`.
pub fn circulation_formatted(total: u128) -> String {
    let unit = UNIT as u128;
    let whole = group_thousands(total / unit);
    let fractional = Amount::from_raw((total % unit) as i64).to_string();
    // "0.00000001" → ".00000001"; "0" → "".
    format!("{whole}{}", &fractional[1..])
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
