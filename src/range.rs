//! Closed numeric and character intervals, parsed from `lo-hi` strings.

use crate::error::{Error, ErrorRepr};
use crate::expr::dsl;
use crate::Value;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// An inclusive interval of finite numbers, e.g. `5-10` or `-20--10`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange {
    min: f64,
    max: f64,
}

/// An inclusive interval of characters, e.g. `A-Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRange {
    min: char,
    max: char,
}

/// Either kind of range. Bounds that both parse as numbers make a
/// [`NumberRange`], single characters make a [`CharRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Range {
    Number(NumberRange),
    Char(CharRange),
}

fn invalid(s: &str) -> Error {
    Error(ErrorRepr::InvalidRange(s.to_string()))
}

fn as_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|x| x.is_finite())
}

fn as_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl NumberRange {
    /// Returns `None` unless both bounds are finite, `min <= max`, and the
    /// width `max - min` is finite too.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        (min <= max && (max - min).is_finite()).then_some(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// A uniform draw from `[min, max]`.
    pub fn random(&self) -> f64 {
        rand::rng().random_range(self.min..=self.max)
    }

    /// A uniform integer draw from `[floor(min), floor(max)]`.
    pub fn random_int(&self) -> i64 {
        let lo = self.min.floor() as i64;
        let hi = self.max.floor() as i64;
        rand::rng().random_range(lo..=hi)
    }
}

impl CharRange {
    /// `A-Z`
    pub const UPPERCASE: Self = Self { min: 'A', max: 'Z' };

    /// Returns `None` if `min > max`.
    pub fn new(min: char, max: char) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    pub fn min(&self) -> char {
        self.min
    }

    pub fn max(&self) -> char {
        self.max
    }

    pub fn contains(&self, c: char) -> bool {
        self.min <= c && c <= self.max
    }

    /// A uniform draw of one code point from `[min, max]`.
    pub fn random(&self) -> char {
        rand::rng().random_range(self.min..=self.max)
    }
}

impl Range {
    /// A uniform draw: a float for numeric ranges, a one-character string otherwise.
    pub fn random(&self) -> Value {
        match self {
            Self::Number(r) => Value::Float(r.random()),
            Self::Char(r) => Value::Str(r.random().to_string()),
        }
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lo, hi) = dsl::range(s).map_err(|_| invalid(s))?;

        if let (Some(min), Some(max)) = (as_number(lo), as_number(hi)) {
            return NumberRange::new(min, max)
                .map(Self::Number)
                .ok_or_else(|| invalid(s));
        }

        match (as_char(lo), as_char(hi)) {
            (Some(min), Some(max)) => CharRange::new(min, max)
                .map(Self::Char)
                .ok_or_else(|| invalid(s)),
            _ => Err(invalid(s)),
        }
    }
}

impl FromStr for NumberRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse()? {
            Range::Number(r) => Ok(r),
            Range::Char(_) => Err(invalid(s)),
        }
    }
}

impl FromStr for CharRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse()? {
            Range::Char(r) => Ok(r),
            Range::Number(_) => Err(invalid(s)),
        }
    }
}

impl fmt::Display for NumberRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", Value::Float(self.min), Value::Float(self.max))
    }
}

impl fmt::Display for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn parses_numbers() {
        let r: NumberRange = "5-10".parse().unwrap();
        assert_eq!((r.min(), r.max()), (5.0, 10.0));

        let r: NumberRange = "-20--10".parse().unwrap();
        assert_eq!((r.min(), r.max()), (-20.0, -10.0));

        let r: NumberRange = "0.1-0.9".parse().unwrap();
        assert_eq!((r.min(), r.max()), (0.1, 0.9));
    }

    #[test]
    fn parses_chars() {
        let r: CharRange = "F-X".parse().unwrap();
        assert_eq!((r.min(), r.max()), ('F', 'X'));
        assert_eq!("F-X".parse::<Range>().unwrap(), Range::Char(r));
    }

    #[test]
    fn rejects_bad_ranges() {
        for x in ["", "5", "10-5", "Z-A", "AB-C", "1-2-3", "inf-5"] {
            let e = x.parse::<Range>().unwrap_err();
            assert_eq!(e.kind(), ErrorKind::InvalidRange, "{}", x);
        }
        assert!("A-Z".parse::<NumberRange>().is_err());
        assert!("1-9".parse::<CharRange>().is_err());
    }

    #[test]
    fn rejects_overflowing_width() {
        let wide = format!("-1{}-1{}", "0".repeat(308), "0".repeat(308));
        for x in ["-1e308-1e308", "-1.7e308-1.7e308", wide.as_str()] {
            let e = x.parse::<NumberRange>().unwrap_err();
            assert_eq!(e.kind(), ErrorKind::InvalidRange, "{}", x);
        }
        assert!(NumberRange::new(-1e308, 1e308).is_none());

        let r = NumberRange::new(-8e307, 8e307).unwrap();
        for _ in 0..100 {
            assert!(r.contains(r.random()));
        }
    }

    #[test]
    fn contains() {
        let r: NumberRange = "10-15".parse().unwrap();
        for x in [10.0, 15.0, 12.0, 12.5] {
            assert!(r.contains(x));
        }
        for x in [9.0, 16.0, -10.0] {
            assert!(!r.contains(x));
        }

        let r: CharRange = "L-R".parse().unwrap();
        assert!(r.contains('L') && r.contains('R') && r.contains('N'));
        assert!(!r.contains('F') && !r.contains('K') && !r.contains('S'));
    }

    #[test]
    fn random_stays_in_range() {
        let r: NumberRange = "5-7".parse().unwrap();
        let c: CharRange = "A-C".parse().unwrap();
        for _ in 0..1000 {
            assert!(r.contains(r.random()));
            assert!((5..=7).contains(&r.random_int()));
            assert!(c.contains(c.random()));
        }
    }

    #[test]
    fn degenerate_ranges() {
        let r: NumberRange = "10-10".parse().unwrap();
        assert_eq!(r.random(), 10.0);
        assert_eq!(r.random_int(), 10);
        assert_eq!("L-L".parse::<CharRange>().unwrap().random(), 'L');
    }

    #[test]
    fn random_int_floors_bounds() {
        let r: NumberRange = "1.5-3.9".parse().unwrap();
        for _ in 0..200 {
            assert!((1..=3).contains(&r.random_int()));
        }
    }

    #[test]
    fn char_range_covers_both_ends() {
        let c: CharRange = "F-I".parse().unwrap();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(c.random());
        }
        assert_eq!(seen.len(), 4);
    }
}
