//! Numeric normalization of loosely formatted sensor output
//!
//! Text-shaped sensor drivers report values such as `"24,5C"`, `"40.1%"` or
//! `"1008.3hPa"`. [`parse_scalar`] turns those into plain `f32` values,
//! tolerating comma decimal separators and any unit suffix.

use heapless::String;
use thiserror_no_std::Error;

/// Longest cleaned numeral accepted by [`parse_scalar`].
pub const MAX_NUMERAL_LEN: usize = 32;

/// Failure to turn a formatted value into a number
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing numeric survived filtering (`""`, `"."`, `"-"`, `"C"`, ...)
    #[error("no digits in value")]
    NoDigits,
    /// The surviving characters do not form a number
    #[error("malformed numeral")]
    Malformed,
    /// The surviving numeral does not fit the parse buffer
    #[error("numeral too long")]
    TooLong,
}

/// Parse a formatted scalar into a finite `f32`.
///
/// Surrounding whitespace is trimmed and `,` is read as the decimal
/// separator. Only digits, the first decimal point and a minus sign leading
/// the numeral survive; everything else is unit text and is dropped before
/// parsing. Unit-only or garbage input fails instead of becoming zero.
///
/// ```
/// use stratus_core::normalize::parse_scalar;
///
/// assert_eq!(parse_scalar("24,5C"), Ok(24.5));
/// assert_eq!(parse_scalar(" 1008.3hPa "), Ok(1008.3));
/// assert_eq!(parse_scalar("24.5 deg.C"), Ok(24.5));
/// assert!(parse_scalar("hPa").is_err());
/// ```
pub fn parse_scalar(input: &str) -> Result<f32, ParseError> {
    let mut cleaned: String<MAX_NUMERAL_LEN> = String::new();
    let mut seen_point = false;

    for ch in input.trim().chars() {
        let keep = match ch {
            '0'..='9' => Some(ch),
            '.' | ',' if !seen_point => {
                seen_point = true;
                Some('.')
            }
            '-' if cleaned.is_empty() => Some('-'),
            _ => None,
        };
        if let Some(ch) = keep {
            cleaned.push(ch).map_err(|_| ParseError::TooLong)?;
        }
    }

    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return Err(ParseError::NoDigits);
    }

    match cleaned.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::Malformed),
    }
}
