//! Sort comparators.
//!
//! [`natural_cmp`] is the ordering every list in the admin UI relies on:
//!
//! - strings that start with a number sort before strings that don't;
//! - two number-led strings compare by their leading numbers first, and on a
//!   tie by whatever follows the number, using the same rules again;
//! - strings without a leading number compare as plain strings.
//!
//! So `["10", "2", "1a", "abc"]` sorts as `["1a", "2", "10", "abc"]`.
//!
//! The leading number is read the way a lenient float parser reads it:
//! leading whitespace, an optional sign, `Infinity`, digits with an optional
//! fraction and exponent. Strings that tie on every token fall back to a byte
//! comparison, so distinct strings never compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::Error;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(Error::UnknownOption {
                kind: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// How sort values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    /// Numeric-prefix-aware string ordering.
    #[default]
    Natural,
    /// Values are parsed as dates.
    Date,
}

impl FromStr for SortType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "natural" => Ok(SortType::Natural),
            "date" => Ok(SortType::Date),
            _ => Err(Error::UnknownOption {
                kind: "sort type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortType::Natural => write!(f, "natural"),
            SortType::Date => write!(f, "date"),
        }
    }
}

/// Compare two strings with the natural ordering described in the module
/// docs.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    token_cmp(a, b).then_with(|| a.cmp(b))
}

fn token_cmp(mut a: &str, mut b: &str) -> Ordering {
    loop {
        if a == b {
            return Ordering::Equal;
        }
        match (parse_float_prefix(a), parse_float_prefix(b)) {
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => return a.cmp(b),
            (Some((fa, end_a)), Some((fb, end_b))) => match fa.partial_cmp(&fb) {
                // Resume after the text the number was read from, not after
                // its canonical spelling: "1.50z" and "1.5a" continue at "z"
                // and "a". Every step consumes input, so the loop ends.
                Some(Ordering::Equal) | None => {
                    a = &a[end_a..];
                    b = &b[end_b..];
                }
                Some(ord) => return ord,
            },
        }
    }
}

/// Parse the leading number of a string.
///
/// Returns the number and the byte length consumed, which is always
/// non-zero.
pub fn parse_float_prefix(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let start = s.len() - s.trim_start().len();
    let mut i = start;

    let negative = matches!(bytes.get(i), Some(b'-'));
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }

    if s[i..].starts_with("Infinity") {
        let value = if negative { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some((value, i + "Infinity".len()));
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |p| from + p)
    };

    let int_end = digits(i);
    let mut mantissa_digits = int_end - i;
    i = int_end;

    if bytes.get(i) == Some(&b'.') {
        let frac_end = digits(i + 1);
        let frac_digits = frac_end - (i + 1);
        if mantissa_digits + frac_digits > 0 {
            mantissa_digits += frac_digits;
            i = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits(j);
        if exp_end > j {
            i = exp_end;
        }
    }

    let value: f64 = s[start..i].parse().ok()?;
    Some((value, i))
}

/// Parse a date or date-time string to milliseconds since the epoch.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DD[T| ]HH:MM:SS[.fff]`
/// date-times (read as UTC) and plain `YYYY-MM-DD` dates.
pub fn parse_date(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Compare two strings as dates.
///
/// Parseable dates sort before unparseable ones; equal instants and pairs of
/// unparseable values fall back to [`natural_cmp`].
pub fn date_cmp(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(da), Some(db)) => da.cmp(&db).then_with(|| natural_cmp(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => natural_cmp(a, b),
    }
}

/// Compare two extracted sort keys.
///
/// Identical keys compare equal. A missing key sorts after every present
/// key in ascending order. Descending order reverses the whole result.
pub fn compare_keys(a: Option<&str>, b: Option<&str>, order: SortOrder, sort_type: SortType) -> Ordering {
    let result = match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match sort_type {
            SortType::Natural => natural_cmp(a, b),
            SortType::Date => date_cmp(a, b),
        },
    };
    match order {
        SortOrder::Asc => result,
        SortOrder::Desc => result.reverse(),
    }
}

/// Compare two optional attribute values. Null counts as missing.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, order: SortOrder, sort_type: SortType) -> Ordering {
    let a = sort_key(a);
    let b = sort_key(b);
    compare_keys(a.as_deref(), b.as_deref(), order, sort_type)
}

/// The string a value sorts by, or `None` for missing and null values.
pub(crate) fn sort_key(value: Option<&Value>) -> Option<String> {
    value
        .filter(|v| !v.is_null())
        .map(Value::to_query_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(values: &[&str]) -> Vec<String> {
        let mut values: Vec<String> = values.iter().map(|s| s.to_string()).collect();
        values.sort_by(|a, b| natural_cmp(a, b));
        values
    }

    #[test]
    fn test_numeric_prefix_before_strings() {
        assert_eq!(sorted(&["10", "2", "1a", "abc"]), vec!["1a", "2", "10", "abc"]);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(natural_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_cmp("-1", "0.5"), Ordering::Less);
        assert_eq!(natural_cmp("1e3", "999"), Ordering::Greater);
        assert_eq!(natural_cmp(".5", "0.25"), Ordering::Greater);
    }

    #[test]
    fn test_equal_prefix_compares_remainder() {
        assert_eq!(natural_cmp("10abc", "10abd"), Ordering::Less);
        // remainders read as the fractions .10 and .9
        assert_eq!(natural_cmp("1.2.10", "1.2.9"), Ordering::Less);
        assert_eq!(natural_cmp("3 apples", "3 pears"), Ordering::Less);
        // empty remainder sorts after a numeric remainder, before text
        assert_eq!(natural_cmp("1.1", "1.1.1"), Ordering::Greater);
        assert_eq!(natural_cmp("1", "1a"), Ordering::Less);
    }

    #[test]
    fn test_mixed_prefixes_compare_by_number() {
        assert_eq!(natural_cmp("1a", "2"), Ordering::Less);
        assert_eq!(natural_cmp("2", "1a"), Ordering::Greater);
        assert_eq!(natural_cmp("10abc", "9"), Ordering::Greater);
    }

    #[test]
    fn test_plain_strings() {
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(natural_cmp("B", "a"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn test_remainder_starts_after_consumed_number() {
        assert_eq!(natural_cmp("1.50z", "1.5a"), Ordering::Greater);
        assert_eq!(natural_cmp("01b", "1a"), Ordering::Greater);
        assert_eq!(natural_cmp("1.0a", "1b"), Ordering::Less);
        assert_eq!(natural_cmp("1.0a", "1.0a"), Ordering::Equal);
    }

    #[test]
    fn test_distinct_strings_never_equal() {
        assert_eq!(natural_cmp("1.0", "1"), Ordering::Greater);
        assert_eq!(natural_cmp("1", "1.0"), Ordering::Less);
        assert_eq!(natural_cmp(" 5", "5"), Ordering::Less);
    }

    #[test]
    fn test_antisymmetric() {
        let values = ["10", "2", "1a", "abc", "1", "1.0", "-3x", "Infinity", "", " 7", "1e2", "x1"];
        for a in values {
            for b in values {
                assert_eq!(natural_cmp(a, b), natural_cmp(b, a).reverse(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("10abc"), Some((10.0, 2)));
        assert_eq!(parse_float_prefix("  -2.5e1x"), Some((-25.0, 8)));
        assert_eq!(parse_float_prefix(".5."), Some((0.5, 2)));
        assert_eq!(parse_float_prefix("5."), Some((5.0, 2)));
        assert_eq!(parse_float_prefix("3e"), Some((3.0, 1)));
        assert_eq!(parse_float_prefix("Infinityx"), Some((f64::INFINITY, 8)));
        assert_eq!(parse_float_prefix("-Infinity"), Some((f64::NEG_INFINITY, 9)));
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("-"), None);
    }

    #[test]
    fn test_date_cmp() {
        assert_eq!(date_cmp("2017-05-01", "2017-04-30T23:00:00Z"), Ordering::Greater);
        assert_eq!(date_cmp("2017-05-01T00:00:00.000Z", "2017-05-01T01:00:00+02:00"), Ordering::Greater);
        assert_eq!(date_cmp("2017-05-01 10:00:00", "2017-05-01T09:59:59"), Ordering::Greater);
        assert_eq!(date_cmp("2017-05-01", "not a date"), Ordering::Less);
        assert_eq!(date_cmp("2017-05-01", "2017-05-01"), Ordering::Equal);
    }

    #[test]
    fn test_compare_keys_missing_and_order() {
        assert_eq!(
            compare_keys(None, Some("a"), SortOrder::Asc, SortType::Natural),
            Ordering::Greater
        );
        assert_eq!(
            compare_keys(None, Some("a"), SortOrder::Desc, SortType::Natural),
            Ordering::Less
        );
        assert_eq!(
            compare_keys(Some("2"), Some("10"), SortOrder::Desc, SortType::Natural),
            Ordering::Greater
        );
        assert_eq!(
            compare_keys(None, None, SortOrder::Desc, SortType::Natural),
            Ordering::Equal
        );
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(
            compare_values(Some(&Value::Int(2)), Some(&Value::from("10")), SortOrder::Asc, SortType::Natural),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Some(&Value::Null), Some(&Value::from("a")), SortOrder::Asc, SortType::Natural),
            Ordering::Greater
        );
    }

    #[test]
    fn test_parse_order_and_type() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!("date".parse::<SortType>().unwrap(), SortType::Date);
        assert!(matches!(
            "sideways".parse::<SortOrder>(),
            Err(Error::UnknownOption { kind: "sort order", .. })
        ));
        assert_eq!(SortOrder::default(), SortOrder::Asc);
        assert_eq!(SortType::default(), SortType::Natural);
    }
}
