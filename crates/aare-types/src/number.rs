//! Exact decimal numbers and the value enum carried by assignments.
//!
//! Thresholds in compliance rules are written in decimal (`dti ≤ 43`, `fee_percentage < 8`), so
//! values are kept as an `i128` mantissa plus a decimal scale and compared exactly.

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Largest number of fractional digits kept after normalization.
pub const MAX_SCALE: u32 = 18;

/// Exact decimal: `mantissa / 10^scale`, always normalized (no trailing fractional zeros).
#[derive(Clone, Copy, Debug)]
pub struct Number {
    mantissa: i128,
    scale: u32,
}

impl Number {
    pub const ZERO: Number = Number {
        mantissa: 0,
        scale: 0,
    };

    pub fn from_i64(value: i64) -> Self {
        Self {
            mantissa: i128::from(value),
            scale: 0,
        }
    }

    /// Build from raw parts. Returns `None` when the scale cannot be represented.
    fn from_parts(mantissa: i128, scale: u32) -> Option<Self> {
        let (mantissa, scale) = normalize(mantissa, scale);
        if scale > MAX_SCALE {
            return None;
        }
        Some(Self { mantissa, scale })
    }

    /// Parse a plain decimal literal: optional sign, digits, optional fraction.
    ///
    /// No exponents, no separators, no currency symbols; callers strip those first.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        let (negative, digits) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let frac = frac_part.trim_end_matches('0');
        let scale = u32::try_from(frac.len()).ok()?;
        if scale > MAX_SCALE {
            return None;
        }

        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac.bytes()) {
            mantissa = mantissa
                .checked_mul(10)?
                .checked_add(i128::from(b - b'0'))?;
        }
        if negative {
            mantissa = -mantissa;
        }
        Self::from_parts(mantissa, scale)
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // f64 Display is the shortest round-tripping decimal and never uses an exponent.
        Self::parse(&value.to_string())
    }

    pub fn to_f64(self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    pub fn is_zero(self) -> bool {
        self.mantissa == 0
    }

    pub fn is_integer(self) -> bool {
        self.scale == 0
    }

    /// Integral value, when the number has no fractional part and fits.
    pub fn as_i64(self) -> Option<i64> {
        if self.scale != 0 {
            return None;
        }
        i64::try_from(self.mantissa).ok()
    }

    pub fn checked_mul(self, rhs: Number) -> Option<Number> {
        let mantissa = self.mantissa.checked_mul(rhs.mantissa)?;
        let (mut mantissa, mut scale) = normalize(mantissa, self.scale + rhs.scale);
        if scale > MAX_SCALE {
            mantissa /= pow10(scale - MAX_SCALE);
            scale = MAX_SCALE;
        }
        Some(Number { mantissa, scale })
    }

    /// Divide, keeping `digits` fractional digits (truncated toward zero).
    ///
    /// Returns `None` on division by zero or overflow.
    pub fn checked_div(self, rhs: Number, digits: u32) -> Option<Number> {
        if rhs.mantissa == 0 {
            return None;
        }
        let digits = digits.min(MAX_SCALE);
        let numerator = self.mantissa.checked_mul(pow10(rhs.scale + digits))?;
        let denominator = rhs.mantissa.checked_mul(pow10(self.scale))?;
        Self::from_parts(numerator / denominator, digits)
    }
}

fn normalize(mut mantissa: i128, mut scale: u32) -> (i128, u32) {
    if mantissa == 0 {
        return (0, 0);
    }
    while scale > 0 && mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }
    (mantissa, scale)
}

fn pow10(exp: u32) -> i128 {
    10i128.pow(exp)
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.mantissa.cmp(&other.mantissa);
        }
        // Compare integral parts first, then fractional parts widened to a shared scale.
        // Both steps stay far inside i128 because MAX_SCALE is 18.
        let (a_int, a_frac) = split(*self);
        let (b_int, b_frac) = split(*other);
        let scale = self.scale.max(other.scale);
        a_int.cmp(&b_int).then_with(|| {
            let a = a_frac * pow10(scale - self.scale);
            let b = b_frac * pow10(scale - other.scale);
            a.cmp(&b)
        })
    }
}

fn split(n: Number) -> (i128, i128) {
    let p = pow10(n.scale);
    (n.mantissa / p, n.mantissa % p)
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::from_i64(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let abs = self.mantissa.unsigned_abs();
        let p = 10u128.pow(self.scale);
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / p,
            abs % p,
            width = self.scale as usize
        )
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_i64() {
            Some(v) => serializer.serialize_i64(v),
            None => serializer.serialize_f64(self.to_f64()),
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumberVisitor)
    }
}

struct NumberVisitor;

impl Visitor<'_> for NumberVisitor {
    type Value = Number;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Number, E> {
        Ok(Number::from_i64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Number, E> {
        Ok(Number {
            mantissa: i128::from(v),
            scale: 0,
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Number, E> {
        Number::from_f64(v).ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Number, E> {
        Number::parse(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }
}

impl JsonSchema for Number {
    fn schema_name() -> Cow<'static, str> {
        "Number".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({ "type": "number" })
    }
}

/// A typed variable value. Absence is modelled by the surrounding `Option`, never by a value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(Number),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Number,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Number => f.write_str("number"),
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::from_i64(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}
