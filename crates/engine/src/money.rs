use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

// Largest cent value that survives the f64 -> i64 conversion.
const MAX_CENTS: f64 = 9_007_199_254_740_992.0;

/// Money amount represented as **integer cents**.
///
/// Use this type for every stored monetary value to avoid floating-point
/// drift. Amounts typed by users are expressed in dollars and converted with
/// [`MoneyCents::from_display_amount`].
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "$12.34");
/// ```
///
/// Parsing from form input (any finite, non-negative number; the result is
/// rounded to the nearest cent):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("250.5".parse::<MoneyCents>().unwrap().cents(), 25050);
/// assert_eq!("1e2".parse::<MoneyCents>().unwrap().cents(), 10000);
/// assert!("abc".parse::<MoneyCents>().is_err());
/// assert!("-1".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the amount in dollars, as shown in edit forms.
    #[must_use]
    pub fn to_display_amount(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Converts a dollar amount typed in a form into cents.
    ///
    /// The input must coerce to a finite, non-negative number. Plain decimal
    /// strings are converted exactly (half-up on the third decimal), anything
    /// else the float parser accepts (e.g. `1e2`) goes through
    /// `round(value * 100)`.
    pub fn from_display_amount(s: &str) -> Result<Self, EngineError> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let negative = || EngineError::InvalidAmount("amount must not be negative".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let value: f64 = trimmed.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        if value < 0.0 {
            return Err(negative());
        }

        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if let Some(exact) = plain_decimal_cents(unsigned) {
            return exact.map(MoneyCents).ok_or_else(overflow);
        }

        let cents = (value * 100.0).round();
        if cents > MAX_CENTS {
            return Err(overflow());
        }
        Ok(MoneyCents(cents as i64))
    }
}

/// Exact cents for `digits[.digits]`, `None` when the string has another shape.
///
/// The inner `None` signals overflow.
fn plain_decimal_cents(s: &str) -> Option<Option<i64>> {
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !is_digits(whole) || !is_digits(frac) {
        return None;
    }

    let digit = |idx: usize| {
        frac.as_bytes()
            .get(idx)
            .map_or(0, |b| i64::from(b - b'0'))
    };
    let round_up = i64::from(digit(2) >= 5);

    let dollars: i64 = if whole.is_empty() {
        0
    } else {
        match whole.parse::<i64>() {
            Ok(value) => value,
            Err(_) => return Some(None),
        }
    };

    Some(
        dollars
            .checked_mul(100)
            .and_then(|v| v.checked_add(digit(0) * 10 + digit(1) + round_up)),
    )
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let dollars = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}${dollars}.{cents:02}")
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_display_amount(s)
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}
