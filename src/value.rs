//! Typed scalar values a grammar [`Variable`](crate::tree::Variable) may
//! declare, their parsing, and the constraints that validate a parsed value.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use regex::Regex;

/// The declared type of a grammar variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    Int32,
    Int64,
    /// Fixed-point decimal; `scale` is the number of digits after the point.
    Decimal64 { scale: u8 },
    Ipv4,
    Ipv6,
    Mac,
    String,
    /// Consumes the remainder of the input line verbatim.
    Rest,
}

/// A successfully parsed scalar value, ready to be validated and then, on a
/// unique match, captured into the binding vector.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Int32(i32),
    Int64(i64),
    Decimal64(Decimal64),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Mac(MacAddr),
    String(String),
    Rest(String),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int32(v) => write!(f, "{v}"),
            TypedValue::Int64(v) => write!(f, "{v}"),
            TypedValue::Decimal64(v) => write!(f, "{v}"),
            TypedValue::Ipv4(v) => write!(f, "{v}"),
            TypedValue::Ipv6(v) => write!(f, "{v}"),
            TypedValue::Mac(v) => write!(f, "{v}"),
            TypedValue::String(v) | TypedValue::Rest(v) => write!(f, "{v}"),
        }
    }
}

/// A fixed-point decimal: `mantissa` scaled by `10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal64 {
    pub mantissa: i64,
    pub scale: u8,
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let negative = self.mantissa < 0;
        let abs = self.mantissa.unsigned_abs();
        let s = abs.to_string();
        let scale = self.scale as usize;
        let padded = if s.len() <= scale {
            format!("{:0>width$}", s, width = scale + 1)
        } else {
            s
        };
        let split = padded.len() - scale;
        write!(
            f,
            "{}{}.{}",
            if negative { "-" } else { "" },
            &padded[..split],
            &padded[split..]
        )
    }
}

/// A 6-byte MAC address in colon-separated hex notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(format!("invalid MAC address {s:?}: expected 6 octets"));
        }
        let mut octets = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            octets[i] = u8::from_str_radix(part, 16)
                .map_err(|_| format!("invalid MAC address {s:?}: bad octet {part:?}"))?;
        }
        Ok(MacAddr(octets))
    }
}

/// Parse `candidate` as `ty`. Returns the typed value, or a human-readable
/// reason the string does not look like that type.
pub fn parse(ty: &ScalarType, candidate: &str) -> Result<TypedValue, String> {
    match ty {
        ScalarType::Int32 => candidate
            .parse::<i32>()
            .map(TypedValue::Int32)
            .map_err(|e| format!("{candidate:?} is not a valid 32-bit integer: {e}")),
        ScalarType::Int64 => candidate
            .parse::<i64>()
            .map(TypedValue::Int64)
            .map_err(|e| format!("{candidate:?} is not a valid 64-bit integer: {e}")),
        ScalarType::Decimal64 { scale } => parse_decimal64(candidate, *scale).map(TypedValue::Decimal64),
        ScalarType::Ipv4 => candidate
            .parse::<Ipv4Addr>()
            .map(TypedValue::Ipv4)
            .map_err(|e| format!("{candidate:?} is not a valid IPv4 address: {e}")),
        ScalarType::Ipv6 => candidate
            .parse::<Ipv6Addr>()
            .map(TypedValue::Ipv6)
            .map_err(|e| format!("{candidate:?} is not a valid IPv6 address: {e}")),
        ScalarType::Mac => candidate.parse::<MacAddr>().map(TypedValue::Mac),
        ScalarType::String => Ok(TypedValue::String(candidate.to_string())),
        ScalarType::Rest => {
            if candidate.is_empty() {
                Err("rest-of-line variable requires non-empty input".to_string())
            } else {
                Ok(TypedValue::Rest(candidate.to_string()))
            }
        }
    }
}

fn parse_decimal64(candidate: &str, scale: u8) -> Result<Decimal64, String> {
    let (sign, body) = match candidate.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, candidate),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{candidate:?} is not a valid decimal"));
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{candidate:?} is not a valid decimal"));
    }
    let scale = scale as usize;
    if frac_part.len() > scale {
        return Err(format!(
            "{candidate:?} has more than {scale} fractional digit(s)"
        ));
    }
    let mut digits = String::with_capacity(int_part.len() + scale);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    for _ in frac_part.len()..scale {
        digits.push('0');
    }
    let mantissa: i64 = digits
        .parse()
        .map_err(|_| format!("{candidate:?} is not a valid decimal"))?;
    Ok(Decimal64 {
        mantissa: sign * mantissa,
        scale: scale as u8,
    })
}

/// A constraint attached to a [`Variable`](crate::tree::Variable). Validation
/// runs after a successful parse (§4.2 step 3).
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Inclusive numeric range, checked against `Int32`/`Int64`/`Decimal64` mantissas.
    Range { min: i64, max: i64 },
    /// The candidate string must match this regex in full.
    Pattern(Regex),
    /// The candidate string must be one of these literal choices.
    Enumeration(Vec<String>),
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constraint::Range { min, max }, Constraint::Range { min: m2, max: m3 }) => {
                min == m2 && max == m3
            }
            (Constraint::Pattern(a), Constraint::Pattern(b)) => a.as_str() == b.as_str(),
            (Constraint::Enumeration(a), Constraint::Enumeration(b)) => a == b,
            _ => false,
        }
    }
}

impl Constraint {
    /// Validate `value` (the original candidate string) and its parsed form.
    /// Returns `Ok(())` on success, or a reason string on failure.
    pub fn validate(&self, candidate: &str, value: &TypedValue) -> Result<(), String> {
        match self {
            Constraint::Range { min, max } => {
                let n = match value {
                    TypedValue::Int32(v) => *v as i64,
                    TypedValue::Int64(v) => *v,
                    TypedValue::Decimal64(v) => v.mantissa,
                    _ => return Ok(()),
                };
                if n < *min || n > *max {
                    Err(format!(
                        "{candidate:?} is out of range [{min}:{max}]"
                    ))
                } else {
                    Ok(())
                }
            }
            Constraint::Pattern(re) => {
                if re.is_match(candidate) {
                    Ok(())
                } else {
                    Err(format!("{candidate:?} does not match pattern /{re}/"))
                }
            }
            Constraint::Enumeration(choices) => {
                if choices.iter().any(|c| c == candidate) {
                    Ok(())
                } else {
                    Err(format!(
                        "{candidate:?} is not one of {choices:?}"
                    ))
                }
            }
        }
    }
}
