//! ISO 8601 calendar dates with explicit precision
//!
//! Archive documents often carry only a year ("1867") or a month
//! ("March 1917"). Those are valid reduced-precision ISO 8601 dates and
//! are kept at the precision they were written with. Strings that cannot
//! be read unambiguously produce no date at all.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Calendar date with year, month or day precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IsoDate {
    /// `YYYY`
    Year(i32),
    /// `YYYY-MM`
    YearMonth(i32, u32),
    /// `YYYY-MM-DD`
    Day(NaiveDate),
}

impl IsoDate {
    /// Parse a strict ISO 8601 calendar date (`YYYY`, `YYYY-MM`, `YYYY-MM-DD`)
    ///
    /// # Errors
    /// Returns error for anything else, including out-of-range months and days
    pub fn parse_iso(s: &str) -> Result<Self, String> {
        let err = || format!("Invalid ISO 8601 date: '{}'", s);
        let parts: Vec<&str> = s.split('-').collect();
        let year = parts
            .first()
            .filter(|p| p.len() == 4 && p.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or_else(err)?;

        match parts.len() {
            1 => Ok(IsoDate::Year(year)),
            2 => {
                let month = parse_two_digits(parts[1]).ok_or_else(err)?;
                if (1..=12).contains(&month) {
                    Ok(IsoDate::YearMonth(year, month))
                } else {
                    Err(err())
                }
            }
            3 => {
                let month = parse_two_digits(parts[1]).ok_or_else(err)?;
                let day = parse_two_digits(parts[2]).ok_or_else(err)?;
                NaiveDate::from_ymd_opt(year, month, day)
                    .map(IsoDate::Day)
                    .ok_or_else(err)
            }
            _ => Err(err()),
        }
    }

    /// Read a date written the way archive documents write them
    ///
    /// Accepts ISO forms plus "March 1917", "June 1, 1848",
    /// "1 June 1848", "Spring 1848" (year only) and ranges such as
    /// "1848-1850" (first year). Returns `None` when no single date can
    /// be read, such as two different years without a range separator.
    ///
    /// ```
    /// use folio_domain::IsoDate;
    ///
    /// assert_eq!(IsoDate::parse_loose("June 1, 1848").unwrap().to_string(), "1848-06-01");
    /// assert_eq!(IsoDate::parse_loose("March 1917").unwrap().to_string(), "1917-03");
    /// assert!(IsoDate::parse_loose("sometime").is_none());
    /// ```
    pub fn parse_loose(s: &str) -> Option<Self> {
        let trimmed = s.trim().trim_end_matches(['.', ',', ';']);
        if let Ok(date) = Self::parse_iso(trimmed) {
            return Some(date);
        }

        let cleaned: String = trimmed
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c.to_ascii_lowercase() } else { ' ' })
            .collect();
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();

        let mut years: Vec<i32> = Vec::new();
        let mut month: Option<u32> = None;
        let mut day: Option<u32> = None;

        for token in &tokens {
            if let Some((a, b)) = token.split_once('-') {
                // Year ranges ("1848-1850", "1848-50") keep the first year
                if let (Some(start), true) = (as_year(a), b.bytes().all(|c| c.is_ascii_digit())) {
                    if !years.contains(&start) {
                        years.push(start);
                    }
                    continue;
                }
                return None;
            }
            if let Some(year) = as_year(token) {
                if !years.contains(&year) {
                    years.push(year);
                }
            } else if let Some(m) = as_month(token) {
                if month.replace(m).is_some_and(|prev| prev != m) {
                    return None;
                }
            } else if let Some(d) = as_day(token) {
                if day.replace(d).is_some_and(|prev| prev != d) {
                    return None;
                }
            }
        }

        if years.len() != 1 {
            return None;
        }
        let year = years[0];

        match (month, day) {
            (Some(m), Some(d)) => NaiveDate::from_ymd_opt(year, m, d).map(IsoDate::Day),
            (Some(m), None) => Some(IsoDate::YearMonth(year, m)),
            _ => Some(IsoDate::Year(year)),
        }
    }

    /// Calendar year
    pub fn year(&self) -> i32 {
        match self {
            IsoDate::Year(y) | IsoDate::YearMonth(y, _) => *y,
            IsoDate::Day(d) => d.year(),
        }
    }

    /// Earliest day covered by this date
    pub fn first_day(&self) -> Option<NaiveDate> {
        match self {
            IsoDate::Year(y) => NaiveDate::from_ymd_opt(*y, 1, 1),
            IsoDate::YearMonth(y, m) => NaiveDate::from_ymd_opt(*y, *m, 1),
            IsoDate::Day(d) => Some(*d),
        }
    }
}

fn parse_two_digits(s: &str) -> Option<u32> {
    if s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn as_year(token: &str) -> Option<i32> {
    if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

fn as_month(token: &str) -> Option<u32> {
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| *m == token || (token.len() >= 3 && m.starts_with(token) && token.len() <= 4))
        .map(|idx| idx as u32 + 1)
}

fn as_day(token: &str) -> Option<u32> {
    let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &token[digits.len()..];
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !matches!(suffix, "" | "st" | "nd" | "rd" | "th") {
        return None;
    }
    digits.parse().ok().filter(|d| (1..=31).contains(d))
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsoDate::Year(y) => write!(f, "{:04}", y),
            IsoDate::YearMonth(y, m) => write!(f, "{:04}-{:02}", y, m),
            IsoDate::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl std::str::FromStr for IsoDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_iso(s)
    }
}

impl TryFrom<String> for IsoDate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_iso(&value)
    }
}

impl From<IsoDate> for String {
    fn from(date: IsoDate) -> Self {
        date.to_string()
    }
}
