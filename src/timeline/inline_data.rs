use std::collections::BTreeMap;

/// A value from a clip's inline `∂:key=value&...` segment.
///
/// Values are read with a closed literal grammar: integers, floats, booleans and quoted
/// strings. Nothing is evaluated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// `true` / `false` (also `True` / `False`).
    Bool(bool),
    /// Signed decimal integer.
    Int(i64),
    /// Finite decimal float, optionally with exponent.
    Float(f64),
    /// Single- or double-quoted string with the quotes removed.
    Str(String),
}

impl DataValue {
    /// Parse one literal. Returns `None` for anything outside the grammar.
    pub fn parse_literal(src: &str) -> Option<Self> {
        let s = src.trim();
        match s {
            "true" | "True" => return Some(Self::Bool(true)),
            "false" | "False" => return Some(Self::Bool(false)),
            _ => {}
        }

        if let Some(inner) = unquote(s) {
            return Some(Self::Str(inner.to_string()));
        }

        if !is_numeric_literal(s) {
            return None;
        }
        if let Ok(v) = s.parse::<i64>() {
            return Some(Self::Int(v));
        }
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::Float)
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) | Self::Str(_) => None,
        }
    }

    /// Integer view.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean view.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

fn unquote(s: &str) -> Option<&str> {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}

// Rejects `inf`, `NaN` and friends that `f64::from_str` would otherwise accept.
fn is_numeric_literal(s: &str) -> bool {
    let body = s.strip_prefix(&['+', '-'][..]).unwrap_or(s);
    body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

/// Parse an `&`-joined `key=value` segment.
///
/// Pairs without `=`, with an empty key, or whose value falls outside the literal grammar
/// are dropped.
pub(crate) fn parse_inline_data(segment: &str) -> BTreeMap<String, DataValue> {
    let mut out = BTreeMap::new();
    for pair in segment.split('&') {
        if pair.trim().is_empty() {
            continue;
        }
        let Some((key, raw)) = pair.split_once('=') else {
            tracing::debug!(pair, "inline data pair without '=' dropped");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            tracing::debug!(pair, "inline data pair with empty key dropped");
            continue;
        }
        match DataValue::parse_literal(raw) {
            Some(v) => {
                out.insert(key.to_string(), v);
            }
            None => {
                tracing::debug!(key, raw, "inline data value is not a literal; dropped");
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/inline_data.rs"]
mod tests;
