use std::fmt::{Display, Formatter};

use crate::model::Inference;

/// A resolved dotenv value.
///
/// Without inference every value is [`Value::String`]. `Display` renders the
/// canonical string form used when the value is injected into an environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Render the value for a string-only environment.
    pub fn into_env_string(self) -> String {
        match self {
            Self::String(value) => value,
            other => other.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Apply the inference rules to an already unquoted and unescaped value.
pub(crate) fn resolve(text: String, inference: Inference) -> Value {
    if !inference.is_enabled() {
        return Value::String(text);
    }

    if !text.is_empty()
        && let Some(number) = parse_number(&text)
    {
        return Value::Number(number);
    }

    match text.to_uppercase().as_str() {
        "FALSE" => Value::Boolean(false),
        "TRUE" => Value::Boolean(true),
        _ => Value::String(text),
    }
}

pub(crate) fn is_whitespace(ch: char) -> bool {
    ch == '\u{feff}' || (ch.is_whitespace() && ch != '\u{85}')
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim_matches(is_whitespace);
    if text.is_empty() {
        return None;
    }

    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(value) = parse_radix_literal(text) {
        return Some(value);
    }

    if !is_decimal_literal(text.as_bytes()) {
        return None;
    }
    text.parse().ok()
}

// `0x1F`, `0o17`, `0b101`; no sign allowed.
fn parse_radix_literal(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'0' {
        return None;
    }

    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };

    text[2..].chars().try_fold(0f64, |acc, ch| {
        ch.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    })
}

fn is_decimal_literal(bytes: &[u8]) -> bool {
    let mut idx = 0usize;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        idx += 1;
    }

    let int_digits = count_digits(&bytes[idx..]);
    idx += int_digits;

    let mut frac_digits = 0usize;
    if bytes.get(idx) == Some(&b'.') {
        idx += 1;
        frac_digits = count_digits(&bytes[idx..]);
        idx += frac_digits;
    }

    if int_digits + frac_digits == 0 {
        return false;
    }

    if matches!(bytes.get(idx), Some(b'e' | b'E')) {
        idx += 1;
        if matches!(bytes.get(idx), Some(b'+' | b'-')) {
            idx += 1;
        }
        let exp_digits = count_digits(&bytes[idx..]);
        if exp_digits == 0 {
            return false;
        }
        idx += exp_digits;
    }

    idx == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

/// Shortest round-trip rendering: plain notation for magnitudes in
/// `[1e-6, 1e21)`, exponent notation (`1e+21`, `1.5e-7`) otherwise.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_owned();
    }
    if value == 0.0 {
        return "0".to_owned();
    }

    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    let digits: String = mantissa.chars().filter(|ch| *ch != '.').collect();
    let digit_count = digits.len() as i32;
    let point = exponent + 1;

    let body = if digit_count <= point && point <= 21 {
        let mut out = digits;
        out.push_str(&"0".repeat((point - digit_count) as usize));
        out
    } else if 0 < point && point <= 21 {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{int_part}.{frac_part}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let exp = point - 1;
        let sign = if exp < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", exp.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", exp.abs())
        }
    };

    if value < 0.0 { format!("-{body}") } else { body }
}
