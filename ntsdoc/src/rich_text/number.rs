//! Loosely typed numeric attributes
//!
//! Cell spans and image sizes arrive as whatever the browser put in the
//! node's `data`: numbers, floats, or strings such as `"2"` or `"300px"`.

use serde::Deserialize;

/// A number that may have been stored as a JSON number or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    /// Integer value, reading strings the way a leading-digits parse would
    ///
    /// `"3"` and `"3px"` give 3, `"abc"` and `NaN` give `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            LooseNumber::Int(n) => Some(*n),
            LooseNumber::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(s) => parse_leading_int(s),
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// A declared row or column span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// Occupy this many rows/columns
    Count(usize),
    /// Occupy everything through the last row/column of the table
    ToEnd,
}

impl Span {
    /// Interpret a raw declared span
    ///
    /// Absent, unparsable and negative values all mean 1; 0 is the
    /// "through the end" sentinel.
    pub fn from_declared(raw: Option<&LooseNumber>) -> Self {
        match raw.and_then(LooseNumber::as_int) {
            Some(0) => Span::ToEnd,
            Some(n) if n > 0 => Span::Count(usize::try_from(n).unwrap_or(usize::MAX)),
            _ => Span::Count(1),
        }
    }

    /// Span used when only counting columns, where the sentinel counts as one
    pub fn count_or_one(self) -> usize {
        match self {
            Span::Count(n) => n,
            Span::ToEnd => 1,
        }
    }

    /// Resolve to a concrete extent starting at `start` in a dimension of size `len`
    ///
    /// The result is at least 1 and never runs past the end of the dimension.
    pub fn resolve(self, start: usize, len: usize) -> usize {
        let remaining = len.saturating_sub(start).max(1);
        match self {
            Span::Count(n) => n.clamp(1, remaining),
            Span::ToEnd => remaining,
        }
    }
}
