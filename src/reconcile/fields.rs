//! Alias-based field lookup over loosely-typed upstream payloads.
//!
//! The card service has shipped several payload shapes: the real record can
//! sit at the top level or under `data`, `result` or `card`, and field names
//! drift between snake_case, camelCase and provider terms (`pan`). Each
//! canonical field is described by an ordered list of key paths; lookups walk
//! the candidate sub-objects in order and take the first usable value.

use serde_json::{Number, Value};

/// A key path into a JSON object. The empty path is the object itself.
pub type Path = &'static [&'static str];

/// Places where upstream payloads have been seen to nest the card record.
const CANDIDATE_PATHS: &[Path] = &[
    &[],
    &["data"],
    &["result"],
    &["data", "data"],
    &["data", "result"],
    &["card"],
    &["data", "card"],
];

pub const CARD_NUMBER: &[Path] = &[
    &["cardNumber"],
    &["card_number"],
    &["number"],
    &["pan"],
    &["card", "number"],
    &["card", "pan"],
    &["card", "cardNumber"],
    &["card", "card_number"],
];

pub const CVV: &[Path] = &[
    &["cvv"],
    &["cvc"],
    &["cvv2"],
    &["security_code"],
    &["securityCode"],
    &["card", "cvv"],
    &["card", "cvc"],
];

pub const EXPIRY: &[Path] = &[
    &["expiry"],
    &["expiry_date"],
    &["expiryDate"],
    &["expiration"],
    &["expiration_date"],
    &["expirationDate"],
    &["card", "expiry"],
];

pub const EXPIRY_MONTH: &[Path] = &[
    &["exp_month"],
    &["expMonth"],
    &["expiry_month"],
    &["expiryMonth"],
    &["card", "exp_month"],
    &["card", "expMonth"],
];

pub const EXPIRY_YEAR: &[Path] = &[
    &["exp_year"],
    &["expYear"],
    &["expiry_year"],
    &["expiryYear"],
    &["card", "exp_year"],
    &["card", "expYear"],
];

pub const VALID_MINUTES: &[Path] = &[
    &["expire_minutes"],
    &["expireMinutes"],
    &["valid_minutes"],
    &["validMinutes"],
    &["validity_minutes"],
];

pub const EXPIRE_TIME: &[Path] = &[
    &["expire_time"],
    &["expireTime"],
    &["expires_at"],
    &["expiresAt"],
];

pub const REDEEMED_AT: &[Path] = &[
    &["used_time"],
    &["usedTime"],
    &["used_at"],
    &["usedAt"],
    &["redeemed_at"],
    &["redeemedAt"],
    &["activated_at"],
    &["activatedAt"],
];

pub const SUCCESS: &[Path] = &[&["success"], &["ok"]];

pub const MESSAGE: &[Path] = &[
    &["error"],
    &["message"],
    &["msg"],
    &["error_message"],
    &["errorMessage"],
    &["error", "message"],
];

/// Sub-objects of `body` worth searching, in priority order.
pub fn candidates(body: &Value) -> Vec<&Value> {
    CANDIDATE_PATHS
        .iter()
        .filter_map(|path| lookup(body, path))
        .filter(|v| !v.is_null())
        .collect()
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(*key))
}

/// Scalars only; blank strings count as missing.
fn is_usable(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(_) | Value::Bool(_) => true,
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// First usable value for any alias, searching candidates in order.
pub fn resolve<'a>(candidates: &[&'a Value], aliases: &[Path]) -> Option<&'a Value> {
    candidates.iter().find_map(|candidate| {
        aliases
            .iter()
            .find_map(|path| lookup(candidate, path).filter(|v| is_usable(v)))
    })
}

/// Like [`resolve`], rendered as a string.
pub fn resolve_string(candidates: &[&Value], aliases: &[Path]) -> Option<String> {
    resolve(candidates, aliases).map(|value| match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    })
}

/// Like [`resolve`], but only accepts string values.
pub fn resolve_text(candidates: &[&Value], aliases: &[Path]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        aliases.iter().find_map(|path| {
            lookup(candidate, path)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
    })
}

/// Like [`resolve_string`], for expiry month/year parts.
///
/// Integral values lose any decimal part, so `9.0` and `"09"` both give `"9"`.
pub fn resolve_date_part(candidates: &[&Value], aliases: &[Path]) -> Option<String> {
    let value = resolve(candidates, aliases)?;
    let integral = coerce_number(value).and_then(|n| {
        n.as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
    });
    match integral {
        Some(i) => Some(i.to_string()),
        None => resolve_string(candidates, aliases),
    }
}

/// Coerce a JSON scalar to a finite number.
///
/// Integral values come back as integers so `"45"` serializes as `45`.
pub fn coerce_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Number::from(i));
            }
            let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some(Number::from(f as i64))
            } else {
                Number::from_f64(f)
            }
        }
        _ => None,
    }
}

/// Whether a resolved success flag is an explicit "yes".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}
