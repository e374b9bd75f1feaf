use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub type OccurrenceId = i64;

/// Shared handle to an occurrence. The engine never mutates what it is given.
pub type OccurrenceRef = Arc<Occurrence>;

/// One concrete instance of a scheduled event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub summary: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub calendar_id: String,
}

impl Occurrence {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Last calendar day this occurrence is visible on. An occurrence with a
    /// positive duration that ends exactly at midnight does not reach into
    /// that day.
    pub fn last_covered_date(&self) -> NaiveDate {
        let end_date = self.end.date();
        if self.end > self.start && self.end.time() == NaiveTime::MIN {
            end_date.pred_opt().unwrap_or(end_date)
        } else {
            end_date.max(self.start.date())
        }
    }

    pub fn ends_at_midnight_of(&self, date: NaiveDate) -> bool {
        self.end == date.and_time(NaiveTime::MIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RepeaterUnit {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repeater {
    pub amount: u32,
    pub unit: RepeaterUnit,
    #[serde(default)]
    pub until: Option<NaiveDate>,
}

impl Repeater {
    /// Offsets `base` by `n` repetitions, computed from the base every time so
    /// month-end clamping never accumulates.
    pub fn nth_after(&self, base: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        let steps = self.amount.max(1).checked_mul(n)?;
        match self.unit {
            RepeaterUnit::Day => base.checked_add_signed(Duration::try_days(i64::from(steps))?),
            RepeaterUnit::Week => {
                base.checked_add_signed(Duration::try_weeks(i64::from(steps))?)
            }
            RepeaterUnit::Month => base.checked_add_months(Months::new(steps)),
            RepeaterUnit::Year => base.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }
}

/// A stored calendar event, possibly recurring. Cursors expand it into
/// [`Occurrence`] instances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: OccurrenceId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub summary: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub calendar_id: String,
    #[serde(default)]
    pub repeat: Option<Repeater>,
}

impl CalendarEvent {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Start of the `n`th instance, or `None` past the repeat bound or the
    /// calendar's limits.
    pub fn instance_start(&self, n: u32) -> Option<NaiveDateTime> {
        if n == 0 {
            return Some(self.start);
        }
        let repeater = self.repeat?;
        let start = repeater.nth_after(self.start, n)?;
        match repeater.until {
            Some(until) if start.date() > until => None,
            _ => Some(start),
        }
    }

    pub fn instance(&self, n: u32) -> Option<OccurrenceRef> {
        let start = self.instance_start(n)?;
        let end = start.checked_add_signed(self.duration())?;
        Some(Arc::new(Occurrence {
            id: self.id,
            start,
            end,
            summary: self.summary.clone(),
            location: self.location.clone(),
            all_day: self.all_day,
            calendar_id: self.calendar_id.clone(),
        }))
    }

    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.summary.to_lowercase().contains(&needle)
            || self.location.to_lowercase().contains(&needle)
    }
}
