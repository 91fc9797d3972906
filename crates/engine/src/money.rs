//! Fixed-point decimal values with two fractional digits.
//!
//! Both money amounts and exchange rates are kept as integer hundredths so
//! that ledger arithmetic is exact.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed amount in hundredths of the currency unit (centavos or cents).
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.to_string(), "12.34");
///
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, self.0)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s)
            .map(Self)
            .map_err(|reason| EngineError::InvalidAmount(format!("{reason}: {:?}", s.trim())))
    }
}

/// Local-currency units per foreign-currency unit ("cotización"), stored as
/// integer hundredths like [`MoneyCents`].
///
/// Parsing accepts any two-decimal value; positivity is a booking/movement
/// invariant checked by the validator, not by the type.
///
/// ```rust
/// use engine::ExchangeRate;
///
/// let rate: ExchangeRate = "1000,5".parse().unwrap();
/// assert_eq!(rate.hundredths(), 100_050);
/// assert_eq!(rate.to_string(), "1000.50");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate(i64);

impl ExchangeRate {
    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, self.0)
    }
}

impl FromStr for ExchangeRate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s).map(Self).map_err(|reason| {
            EngineError::InvalidAmount(format!("exchange rate {reason}: {:?}", s.trim()))
        })
    }
}

fn write_hundredths(f: &mut fmt::Formatter<'_>, value: i64) -> fmt::Result {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
}

#[derive(Debug, PartialEq)]
enum ParseFailure {
    Empty,
    Malformed,
    TooManyDecimals,
    TooLarge,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "is empty",
            Self::Malformed => "is not a decimal number",
            Self::TooManyDecimals => "has more than 2 decimals",
            Self::TooLarge => "is too large",
        })
    }
}

/// `[+-]digits[(.|,)d{0,2}]`, surrounding whitespace ignored.
fn parse_hundredths(raw: &str) -> Result<i64, ParseFailure> {
    let raw = raw.trim();
    let (negative, digits) = match raw.as_bytes().first() {
        None => return Err(ParseFailure::Empty),
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        Some(_) => (false, raw),
    };

    let (whole, fraction) = match digits.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return Err(ParseFailure::Malformed);
    }
    if fraction.len() > 2 {
        return Err(ParseFailure::TooManyDecimals);
    }

    let whole: i64 = whole.parse().map_err(|_| ParseFailure::TooLarge)?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| ParseFailure::Malformed)? * 10,
        _ => fraction.parse().map_err(|_| ParseFailure::Malformed)?,
    };
    let magnitude = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(fraction))
        .ok_or(ParseFailure::TooLarge)?;

    Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_cents() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(7).to_string(), "0.07");
        assert_eq!(MoneyCents::new(35_000).to_string(), "350.00");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn accepts_either_separator_and_a_sign() {
        assert_eq!(parse_hundredths("10"), Ok(1000));
        assert_eq!(parse_hundredths("10.5"), Ok(1050));
        assert_eq!(parse_hundredths("10,50"), Ok(1050));
        assert_eq!(parse_hundredths("10."), Ok(1000));
        assert_eq!(parse_hundredths("-0.01"), Ok(-1));
        assert_eq!(parse_hundredths(" +2.30 "), Ok(230));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_hundredths("  "), Err(ParseFailure::Empty));
        assert_eq!(parse_hundredths("-"), Err(ParseFailure::Malformed));
        assert_eq!(parse_hundredths(".5"), Err(ParseFailure::Malformed));
        assert_eq!(parse_hundredths("1.2.3"), Err(ParseFailure::Malformed));
        assert_eq!(parse_hundredths("1e3"), Err(ParseFailure::Malformed));
        assert_eq!(parse_hundredths("12.345"), Err(ParseFailure::TooManyDecimals));
        assert_eq!(
            parse_hundredths("99999999999999999999"),
            Err(ParseFailure::TooLarge)
        );
    }

    #[test]
    fn errors_are_invalid_amounts() {
        assert!(matches!(
            "0.001".parse::<MoneyCents>(),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            "abc".parse::<ExchangeRate>(),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn exchange_rate_parses_but_does_not_judge_sign() {
        assert_eq!("0".parse::<ExchangeRate>().unwrap().hundredths(), 0);
        assert!(!"-5".parse::<ExchangeRate>().unwrap().is_positive());
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let max = MoneyCents::new(i64::MAX);
        assert_eq!(max.checked_add(MoneyCents::new(1)), None);
        assert_eq!(
            MoneyCents::new(100).checked_sub(MoneyCents::new(650)),
            Some(MoneyCents::new(-550))
        );
    }
}
