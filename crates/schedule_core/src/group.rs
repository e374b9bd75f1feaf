use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::cursor::Direction;
use crate::occurrence::{OccurrenceRef, YearMonth};
use crate::selection::SelectionKey;

/// Position counter value handed to every materialized node.
pub type Position = i64;

#[derive(Debug, Clone)]
pub struct GroupEntry {
    pub occurrence: OccurrenceRef,
    /// Checkbox state captured from the selection overlay.
    pub selected: bool,
}

/// All occurrences shown on one calendar day.
#[derive(Debug, Clone)]
pub struct DayGroup {
    date: NaiveDate,
    position: Position,
    entries: VecDeque<GroupEntry>,
}

impl DayGroup {
    pub fn new(date: NaiveDate, position: Position) -> Self {
        Self {
            date,
            position,
            entries: VecDeque::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn entries(&self) -> impl Iterator<Item = &GroupEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &SelectionKey) -> bool {
        self.entries
            .iter()
            .any(|entry| SelectionKey::of(&entry.occurrence) == *key)
    }

    /// Adds an entry at the end matching the insertion direction: appends go
    /// last, prepends first, so the group stays chronological either way.
    /// Returns `false` when the same instance is already present.
    pub fn insert(&mut self, entry: GroupEntry, direction: Direction) -> bool {
        if self.contains(&SelectionKey::of(&entry.occurrence)) {
            return false;
        }
        match direction {
            Direction::Forward => self.entries.push_back(entry),
            Direction::Backward => self.entries.push_front(entry),
        }
        true
    }

    /// Updates the checkbox flag of the entry for `key`. Returns whether the
    /// entry is present.
    pub fn mark_selected(&mut self, key: &SelectionKey, selected: bool) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| SelectionKey::of(&entry.occurrence) == *key)
        {
            Some(entry) => {
                entry.selected = selected;
                true
            }
            None => false,
        }
    }
}

/// Separator shown once per month crossed by the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthMarker {
    pub month: YearMonth,
    pub position: Position,
}
