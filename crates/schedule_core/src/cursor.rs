use std::collections::VecDeque;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::occurrence::OccurrenceRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// Result of pulling one item from a cursor.
#[derive(Debug, Clone, Default)]
pub struct CursorStep {
    pub occurrence: Option<OccurrenceRef>,
    /// The returned occurrence sits on a different day than the previous one.
    pub day_changed: bool,
}

impl CursorStep {
    pub fn end() -> Self {
        Self::default()
    }
}

/// A lazy, one-directional producer of occurrences moving away from an
/// anchor date. Cursors never fail; they only run out.
pub trait OccurrenceCursor {
    fn direction(&self) -> Direction;

    /// Hint that more items will be requested soon. Must not change the
    /// order in which items are produced.
    fn prefetch(&mut self, _aggressive: bool) {}

    /// Next occurrence in direction order. Returns an empty step once
    /// exhausted, however many times it is called.
    fn next(&mut self) -> CursorStep;

    /// Day of the most recently returned occurrence, or the anchor before the
    /// first call.
    fn current_date(&self) -> NaiveDate;

    fn is_exhausted(&self) -> bool;
}

/// Search parameters handed to a [`CursorSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub text: Option<String>,
    /// Inclusive bounds on the days a cursor may emit.
    pub range: Option<(NaiveDate, NaiveDate)>,
}

impl Query {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text: (!text.trim().is_empty()).then_some(text),
            range: None,
        }
    }

    pub fn admits_day(&self, day: NaiveDate) -> bool {
        match self.range {
            Some((from, to)) => day >= from && day <= to,
            None => true,
        }
    }
}

/// The data layer: opens cursors anchored at a date.
pub trait CursorSource {
    fn open(
        &self,
        anchor: NaiveDate,
        direction: Direction,
        query: &Query,
    ) -> Box<dyn OccurrenceCursor>;
}

/// Cursor over a pre-ordered list of `(day, occurrence)` pairs.
#[derive(Debug)]
pub struct VecCursor {
    direction: Direction,
    items: VecDeque<(NaiveDate, OccurrenceRef)>,
    current: NaiveDate,
    started: bool,
    exhausted: bool,
}

impl VecCursor {
    /// `items` must already be ordered for `direction`.
    pub fn new(
        anchor: NaiveDate,
        direction: Direction,
        items: impl IntoIterator<Item = (NaiveDate, OccurrenceRef)>,
    ) -> Self {
        let items: VecDeque<_> = items.into_iter().collect();
        debug_assert!(items.iter().zip(items.iter().skip(1)).all(|(a, b)| {
            match direction {
                Direction::Forward => a.0 <= b.0,
                Direction::Backward => a.0 >= b.0,
            }
        }));
        Self {
            direction,
            items,
            current: anchor,
            started: false,
            exhausted: false,
        }
    }
}

impl OccurrenceCursor for VecCursor {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn next(&mut self) -> CursorStep {
        let Some((day, occurrence)) = self.items.pop_front() else {
            self.exhausted = true;
            return CursorStep::end();
        };
        let day_changed = !self.started || day != self.current;
        self.started = true;
        self.current = day;
        CursorStep {
            occurrence: Some(occurrence),
            day_changed,
        }
    }

    fn current_date(&self) -> NaiveDate {
        self.current
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::Occurrence;
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn occ(id: i64, d: u32) -> OccurrenceRef {
        let start = day(d).and_hms_opt(9, 0, 0).unwrap();
        Arc::new(Occurrence {
            id,
            start,
            end: start + chrono::Duration::hours(1),
            summary: format!("item {id}"),
            location: String::new(),
            all_day: false,
            calendar_id: String::new(),
        })
    }

    #[test]
    fn reports_day_changes_and_exhaustion() {
        let mut cursor = VecCursor::new(
            day(15),
            Direction::Forward,
            vec![(day(15), occ(1, 15)), (day(15), occ(2, 15)), (day(20), occ(3, 20))],
        );
        assert_eq!(cursor.current_date(), day(15));

        let first = cursor.next();
        assert!(first.day_changed);
        let second = cursor.next();
        assert!(!second.day_changed);
        let third = cursor.next();
        assert!(third.day_changed);
        assert_eq!(cursor.current_date(), day(20));
        assert!(!cursor.is_exhausted());

        assert!(cursor.next().occurrence.is_none());
        assert!(cursor.is_exhausted());
        assert!(cursor.next().occurrence.is_none());
        assert_eq!(cursor.current_date(), day(20));
    }

    #[test]
    fn blank_search_text_is_no_filter() {
        assert_eq!(Query::with_text("   "), Query::default());
        assert_eq!(Query::with_text("gym").text.as_deref(), Some("gym"));
    }
}
