//! Conversion rules used by property reads and writes
//!
//! The functions here are pure: they turn a value obtained one way into the
//! representation a caller asked for, or report that no rule applies.
//! [`IntrospectedProperty`](super::IntrospectedProperty) decides which
//! reader or writer to try and in what order.

use crate::value::Value;
use propkit_types::Primitive;

/// Outcome of a conversion or read path
///
/// `Found(Value::Null)` is a successful null result; `NoPath` means the rule
/// does not apply and the caller should keep searching or fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A value was produced
    Found(Value),
    /// No conversion rule applies
    NoPath,
}

impl Lookup {
    /// Produced value, if any
    pub fn into_option(self) -> Option<Value> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NoPath => None,
        }
    }

    /// Chain a further conversion onto a found value
    pub fn and_then(self, f: impl FnOnce(Value) -> Lookup) -> Lookup {
        match self {
            Lookup::Found(v) => f(v),
            Lookup::NoPath => Lookup::NoPath,
        }
    }
}

/// Parse `"true"`/`"false"`, trimmed and case-insensitive
pub fn parse_boolean(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Narrow a number to the given numeric kind; null stays null
pub fn number_to(value: Value, target: Primitive) -> Lookup {
    if value.is_null() {
        return Lookup::Found(Value::Null);
    }
    match value.narrow(target) {
        Some(v) => Lookup::Found(v),
        None => Lookup::NoPath,
    }
}

/// Interpret a string as a boolean; any other text has no path
pub fn string_to_boolean(value: Value) -> Lookup {
    match value {
        Value::Null => Lookup::Found(Value::Null),
        Value::String(s) => match parse_boolean(&s) {
            Some(b) => Lookup::Found(Value::Boolean(b)),
            None => Lookup::NoPath,
        },
        _ => Lookup::NoPath,
    }
}

/// String form of any value; null stays null
pub fn to_string_value(value: Value) -> Lookup {
    match value {
        Value::Null => Lookup::Found(Value::Null),
        Value::String(s) => Lookup::Found(Value::String(s)),
        other => Lookup::Found(Value::String(other.to_string())),
    }
}

/// Candidate values for writing `value` through its string form
///
/// The trimmed, lower-cased text becomes a boolean if it spells one,
/// otherwise a `long`, otherwise a `double`. The untrimmed string form is
/// always the last candidate.
pub fn reinterpretations(value: &Value) -> Vec<Value> {
    let raw = value.to_string();
    let text = raw.trim().to_lowercase();

    let mut out = Vec::with_capacity(2);
    if let Some(b) = parse_boolean(&text) {
        out.push(Value::Boolean(b));
    } else if let Ok(n) = text.parse::<i64>() {
        out.push(Value::Long(n));
    } else if let Some(d) = parse_double(&text) {
        out.push(Value::Double(d));
    }
    out.push(Value::String(raw));
    out
}

/// Decimal literal with an optional `f`/`d` suffix, as `Double.parseDouble`
/// reads lower-cased text
///
/// The spelled-out `NaN`/`Infinity` forms are case-sensitive there, so their
/// lower-cased text is not a number. Hex float literals are not accepted.
fn parse_double(text: &str) -> Option<f64> {
    let digits = text
        .strip_suffix('f')
        .or_else(|| text.strip_suffix('d'))
        .unwrap_or(text);
    if digits.chars().any(|c| c.is_ascii_alphabetic() && c != 'e') {
        return None;
    }
    digits.parse().ok()
}
