//! Calendar dates without timezone dependencies.
//!
//! Deadline annotations only need a civil date (year, month, day), its ISO
//! form and a weekday abbreviation, so this stays a small `Copy` struct
//! instead of pulling in a datetime crate.
//!
//! ```ignore
//! let date = CalendarDate::new(2024, 6, 15);
//! assert_eq!(date.to_iso(), "2024-06-15");
//! assert_eq!(date.weekday_abbrev(), "Sat");
//! ```

use anyhow::{Result, bail};

/// A validated civil date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Build a date from loosely formatted components (`"2024"`, `"6"`, `"05"`).
    ///
    /// Returns `None` for non-numeric parts or impossible dates.
    pub fn from_parts(year: &str, month: &str, day: &str) -> Option<Self> {
        let date = Self::new(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?);
        date.validate().ok()?;
        Some(date)
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        use std::time::SystemTime;
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_unix_days(secs / 86_400)
    }

    /// Convert days since 1970-01-01 to a civil date.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_unix_days(days: u64) -> Self {
        // Howard Hinnant's civil_from_days, shifted so eras start on March 1st
        let z = days as i64 + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
        let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
        let year = (yoe + era * 400 + i64::from(month <= 2)) as u16;
        Self::new(year, month, day)
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn validate(&self) -> Result<()> {
        let Self { year, month, day } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)]
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// `YYYY-MM-DD`
    pub fn to_iso(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn weekday_abbrev(self) -> &'static str {
        const WEEKDAYS: [&str; 7] = ["Sat", "Sun", "Mon", "Tue", "Wed", "Thu", "Fri"];
        WEEKDAYS[self.weekday_index()]
    }

    /// Zeller's congruence, 0 = Saturday.
    #[inline]
    #[allow(clippy::trivially_copy_pass_by_ref)]
    #[allow(clippy::cast_sign_loss)] // Result of % 7 is always 0-6
    fn weekday_index(&self) -> usize {
        let (y, m) = if self.month < 3 {
            (i32::from(self.year) - 1, i32::from(self.month) + 12)
        } else {
            (i32::from(self.year), i32::from(self.month))
        };
        let d = i32::from(self.day);
        ((d + (13 * (m + 1)) / 5 + y + y / 4 - y / 100 + y / 400) % 7) as usize
    }
}
