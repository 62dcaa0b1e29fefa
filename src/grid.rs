//! Rows of cells, as returned by the spreadsheet service, and how to locate a row by its date

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A rectangular (or ragged) table of cells.
///
/// Row 0 is the header row. Column 0 of every row holds a date.
pub type Grid = Vec<Vec<String>>;

static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

static DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%d %B %Y",
];

/// A calendar date used to match a row. The time of day is never part of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateKey {
    date: NaiveDate,
}

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Parse a date as it may appear in a request or in a date cell.
    ///
    /// Date-times are accepted too, but only their calendar date (as written) is kept.
    /// Returns `None` for anything that cannot be read as a date, e.g. the header label of the date column.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self::new(dt.naive_local().date()));
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Self::new(dt.date()));
            }
        }
        for format in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(text, format) {
                return Some(Self::new(d));
            }
        }
        None
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

/// Returns the index of the first row whose date cell is the same calendar date as `target`.
///
/// Every row is scanned, the header row included (its label never parses as a date).
/// Rows with an empty or unparseable first cell never match. When several rows share the target date, the lowest index wins.
pub fn find_row(rows: &[Vec<String>], target: &DateKey) -> Option<usize> {
    rows.iter().position(|row| {
        row.first()
            .and_then(|cell| DateKey::parse(cell))
            .map(|key| &key == target)
            .unwrap_or(false)
    })
}
