// src/common/code.rs

use alloc::string::String;
use chrono::{Datelike, NaiveDate};
use core::fmt::{self, Write};

/// Fixed scheme prefix every traceability code starts with.
pub const SCHEME_PREFIX: &str = "18";

/// Calendar years with an assigned letter. Other years fall back to their numeric form.
const YEAR_LETTERS: [(i32, char); 3] = [(2025, 'Y'), (2026, 'L'), (2027, 'P')];

/// Letters for months 10..=12. Months 1..=9 are written as their digit.
const MONTH_LETTERS: [char; 3] = ['A', 'B', 'C'];

/// Letters for days 10..=31, skipping glyphs easily confused with digits (I, O, Q, U).
/// Days 1..=9 are written as their digit.
const DAY_LETTERS: [char; 22] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'R', 'S', 'T', 'V',
    'W', 'X', 'Y', 'Z',
];

/// One-character date codes derived from a calendar date.
///
/// Used both by the live date display and by [`build_traceability_code`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DateCodes {
    year: i32,
    year_letter: Option<char>,
    month: char,
    day: char,
}

impl DateCodes {
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        let year_letter = YEAR_LETTERS
            .iter()
            .find(|(y, _)| *y == year)
            .map(|(_, c)| *c);
        DateCodes {
            year,
            year_letter,
            month: code_char(date.month(), &MONTH_LETTERS),
            day: code_char(date.day(), &DAY_LETTERS),
        }
    }

    /// Year character used in the code: the year letter, or the last digit of an unmapped year.
    pub fn year_code(&self) -> char {
        self.year_letter.unwrap_or_else(|| {
            char::from_digit(self.year.rem_euclid(10) as u32, 10).unwrap_or('0')
        })
    }

    /// Year as shown on the clock display: the letter, or the full numeric year when unmapped.
    pub fn year_label(&self) -> YearLabel {
        YearLabel(*self)
    }

    #[inline]
    pub const fn month_code(&self) -> char {
        self.month
    }

    #[inline]
    pub const fn day_code(&self) -> char {
        self.day
    }
}

/// `Display` adapter for the clock's year field.
#[derive(Debug, Copy, Clone)]
pub struct YearLabel(DateCodes);

impl fmt::Display for YearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.year_letter {
            Some(c) => f.write_char(c),
            None => write!(f, "{}", self.0.year),
        }
    }
}

/// Digits pass through for 1..=9; from 10 on the value indexes `letters`.
fn code_char(value: u32, letters: &[char]) -> char {
    if value < 10 {
        return char::from_digit(value, 10).unwrap_or('0');
    }
    letters.get((value - 10) as usize).copied().unwrap_or('0')
}

/// Builds the traceability code embedded in a passing unit's QR label.
///
/// Layout, with no separators:
/// `18` + part token + vendor token + year + month + day + 4-digit OK count.
///
/// Pure: the same inputs always give the same string.
pub fn build_traceability_code(codes: &DateCodes, vendor: &str, part: &str, ok_count: u32) -> String {
    let mut code = String::with_capacity(SCHEME_PREFIX.len() + part.len() + vendor.len() + 7);
    code.push_str(SCHEME_PREFIX);
    code.push_str(part);
    code.push_str(vendor);
    code.push(codes.year_code());
    code.push(codes.month_code());
    code.push(codes.day_code());
    // Writing into a String cannot fail
    let _ = write!(code, "{:04}", ok_count);
    code
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_codes() {
        assert_eq!(DateCodes::from_date(date(2025, 1, 1)).year_code(), 'Y');
        assert_eq!(DateCodes::from_date(date(2026, 1, 1)).year_code(), 'L');
        assert_eq!(DateCodes::from_date(date(2027, 1, 1)).year_code(), 'P');
        // Unmapped years: label shows the full year, the code keeps its last digit
        let codes = DateCodes::from_date(date(2028, 1, 1));
        assert_eq!(codes.year_code(), '8');
        assert_eq!(codes.year_label().to_string(), "2028");
        assert_eq!(DateCodes::from_date(date(2026, 1, 1)).year_label().to_string(), "L");
    }

    #[test]
    fn test_month_codes() {
        let months: String = (1..=12)
            .map(|m| DateCodes::from_date(date(2026, m, 1)).month_code())
            .collect();
        assert_eq!(months, "123456789ABC");
    }

    #[test]
    fn test_day_codes() {
        let days: String = (1..=31)
            .map(|d| DateCodes::from_date(date(2026, 1, d)).day_code())
            .collect();
        assert_eq!(days, "123456789ABCDEFGHJKLMNPRSTVWXYZ");
    }

    #[test]
    fn test_build_code_layout() {
        let codes = DateCodes::from_date(date(2026, 10, 17));
        let code = build_traceability_code(&codes, "VN01", "DJ9600267A", 1);
        assert_eq!(code, "18DJ9600267AVN01LAH0001");
    }

    #[test]
    fn test_consecutive_codes_differ_only_in_counter() {
        let codes = DateCodes::from_date(date(2025, 3, 9));
        let first = build_traceability_code(&codes, "V7", "DJ9600269A", 1);
        let second = build_traceability_code(&codes, "V7", "DJ9600269A", 2);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[..first.len() - 4], second[..second.len() - 4]);
        assert!(first.ends_with("0001"));
        assert!(second.ends_with("0002"));
    }

    #[test]
    fn test_counter_wider_than_four_digits() {
        let codes = DateCodes::from_date(date(2025, 12, 31));
        assert_eq!(build_traceability_code(&codes, "", "P", 12345), "18PYCZ12345");
    }
}
