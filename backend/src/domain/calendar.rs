//! Calendar domain logic for the staff calendar.
//!
//! This module owns all date arithmetic the views need: the padded month
//! grid, month and day navigation, and the instant range used to fetch a
//! month of appointments. Leap years and month lengths come from `chrono`;
//! nothing here re-derives calendar rules by hand.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use shared::DateRange;
use tracing::debug;

/// Weekday headers for a Sunday-first grid
const WEEKDAY_SYMBOLS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Columns in the month grid
pub const DAYS_PER_WEEK: usize = 7;

/// One slot of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CalendarCell {
    /// Padding before the 1st of the month
    Blank,
    /// An actual day of the month
    Day(NaiveDate),
}

impl CalendarCell {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            CalendarCell::Blank => None,
            CalendarCell::Day(date) => Some(*date),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CalendarCell::Blank)
    }
}

/// Lazily generated cells of one month: leading blanks, then every day.
///
/// No trailing padding is emitted; lay the cells out `DAYS_PER_WEEK` wide.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    first: NaiveDate,
    leading_blanks: usize,
    days_in_month: usize,
    position: usize,
}

impl MonthGrid {
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Blank cells before day 1, equal to its weekday index (Sunday = 0)
    pub fn leading_blanks(&self) -> usize {
        self.leading_blanks
    }

    pub fn days_in_month(&self) -> usize {
        self.days_in_month
    }

    /// Total cells, independent of how far the iterator has advanced
    pub fn cell_count(&self) -> usize {
        self.leading_blanks + self.days_in_month
    }

    /// Rows needed to show every cell in a 7-column grid
    pub fn row_count(&self) -> usize {
        self.cell_count().div_ceil(DAYS_PER_WEEK)
    }
}

impl Iterator for MonthGrid {
    type Item = CalendarCell;

    fn next(&mut self) -> Option<CalendarCell> {
        if self.position >= self.cell_count() {
            return None;
        }
        let index = self.position;
        self.position += 1;

        if index < self.leading_blanks {
            return Some(CalendarCell::Blank);
        }
        let day_offset = (index - self.leading_blanks) as i64;
        self.first
            .checked_add_signed(Duration::days(day_offset))
            .map(CalendarCell::Day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cell_count() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonthGrid {}

/// Builds month grids and answers calendar navigation questions
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthGridBuilder;

impl MonthGridBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Generate the grid for the month containing `date`
    pub fn build(&self, date: NaiveDate) -> MonthGrid {
        let first = self.first_of_month(date);
        let leading_blanks = self.first_weekday_index(date) as usize;
        let days_in_month = self.days_in_month(date) as usize;

        debug!(
            "🗓️ Building grid for {}: {} leading blanks, {} days",
            self.month_title(date),
            leading_blanks,
            days_in_month
        );

        MonthGrid {
            first,
            leading_blanks,
            days_in_month,
            position: 0,
        }
    }

    pub fn first_of_month(&self, date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    pub fn last_of_month(&self, date: NaiveDate) -> NaiveDate {
        self.first_of_month(date)
            .checked_add_months(Months::new(1))
            .and_then(|next_first| next_first.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Number of days in the month containing `date`
    pub fn days_in_month(&self, date: NaiveDate) -> u32 {
        self.last_of_month(date).day()
    }

    /// Weekday of the 1st (0 = Sunday, 1 = Monday, ...)
    pub fn first_weekday_index(&self, date: NaiveDate) -> u32 {
        self.first_of_month(date).weekday().num_days_from_sunday()
    }

    pub fn weekday_symbols(&self) -> [&'static str; 7] {
        WEEKDAY_SYMBOLS
    }

    /// Human-readable month header, e.g. "March 2025"
    pub fn month_title(&self, date: NaiveDate) -> String {
        date.format("%B %Y").to_string()
    }

    /// First day of the previous month
    pub fn previous_month(&self, date: NaiveDate) -> NaiveDate {
        let first = self.first_of_month(date);
        first.checked_sub_months(Months::new(1)).unwrap_or(first)
    }

    /// First day of the next month
    pub fn next_month(&self, date: NaiveDate) -> NaiveDate {
        let first = self.first_of_month(date);
        first.checked_add_months(Months::new(1)).unwrap_or(first)
    }

    pub fn previous_day(&self, date: NaiveDate) -> NaiveDate {
        date.pred_opt().unwrap_or(date)
    }

    pub fn next_day(&self, date: NaiveDate) -> NaiveDate {
        date.succ_opt().unwrap_or(date)
    }

    /// Fetch range for a month: the 1st at midnight through the end-of-day
    /// instant of the last day, both in the calendar's offset
    pub fn month_range(&self, date: NaiveDate, offset: FixedOffset) -> DateRange {
        let start = at_offset(self.first_of_month(date).and_time(NaiveTime::MIN), offset);
        let last_midnight = at_offset(self.last_of_month(date).and_time(NaiveTime::MIN), offset);
        let end = last_midnight + (Duration::days(1) - Duration::nanoseconds(1));
        DateRange::new(start, end)
    }
}

fn at_offset(local: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::from_naive_utc_and_offset(local - offset, offset)
}
