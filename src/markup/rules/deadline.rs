//! Due dates: `[d:...]` becomes a `DEADLINE:` line after the item.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use smallvec::smallvec;

use super::{LineRule, Lines, keep};
use crate::core::ErrorKind;
use crate::markup::PageContext;
use crate::utils::date::CalendarDate;

/// Accepted date notations, tried in order.
#[derive(Debug, Clone, Copy)]
enum Notation {
    /// `[d:2024-6-15]`
    Iso,
    /// `[d:15.6.2024]`
    European,
    /// `[d:6/15/2024]`
    American,
    /// `[d:15.6.]`, current year
    Yearless,
}

impl Notation {
    const ALL: [Self; 4] = [Self::Iso, Self::European, Self::American, Self::Yearless];

    fn pattern(self) -> &'static Regex {
        static ISO: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\[d:(\d{4})-(\d{1,2})-(\d{1,2})\]").unwrap());
        static EUROPEAN: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\[d:(\d{1,2})\.(\d{1,2})\.(\d{4})\]").unwrap());
        static AMERICAN: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\[d:(\d{1,2})/(\d{1,2})/(\d{4})\]").unwrap());
        static YEARLESS: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\[d:(\d{1,2})\.(\d{1,2})\.\]").unwrap());

        match self {
            Self::Iso => &ISO,
            Self::European => &EUROPEAN,
            Self::American => &AMERICAN,
            Self::Yearless => &YEARLESS,
        }
    }

    fn date(self, caps: &Captures<'_>, today: CalendarDate) -> Option<CalendarDate> {
        match self {
            Self::Iso => CalendarDate::from_parts(&caps[1], &caps[2], &caps[3]),
            Self::European => CalendarDate::from_parts(&caps[3], &caps[2], &caps[1]),
            Self::American => CalendarDate::from_parts(&caps[3], &caps[1], &caps[2]),
            Self::Yearless => {
                CalendarDate::from_parts(&today.year.to_string(), &caps[2], &caps[1])
            }
        }
    }
}

/// `task [d:2024-6-15]` -> `task` + `DEADLINE: <2024-06-15 Sat>`.
///
/// Invalid dates leave the line untouched.
pub struct Deadline;

impl LineRule for Deadline {
    fn name(&self) -> &'static str {
        "deadline"
    }

    fn apply(&self, line: String, ctx: &PageContext<'_>) -> Result<Lines, ErrorKind> {
        for notation in Notation::ALL {
            let Some(caps) = notation.pattern().captures(&line) else {
                continue;
            };
            let Some(date) = notation.date(&caps, ctx.today) else {
                return keep(line);
            };
            let Some(span) = caps.get(0) else {
                return keep(line);
            };

            let before = line[..span.start()].trim_end();
            let after = &line[span.end()..];
            let item = if before.is_empty() {
                after.trim_start().to_string()
            } else {
                format!("{before}{after}")
            };
            let deadline = format!("DEADLINE: <{} {}>", date.to_iso(), date.weekday_abbrev());
            return Ok(smallvec![item, deadline]);
        }
        keep(line)
    }
}
