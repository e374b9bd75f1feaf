use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::occurrence::{Occurrence, OccurrenceId, OccurrenceRef};

/// Identity of a selected occurrence. A recurring event shares one id across
/// its instances, so the start day is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionKey {
    pub id: OccurrenceId,
    pub date: NaiveDate,
}

impl SelectionKey {
    pub fn of(occurrence: &Occurrence) -> Self {
        Self {
            id: occurrence.id,
            date: occurrence.start_date(),
        }
    }
}

/// Set of user-selected occurrences, independent of what is materialized.
#[derive(Debug, Clone, Default)]
pub struct SelectionOverlay {
    entries: BTreeMap<SelectionKey, OccurrenceRef>,
}

impl SelectionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the occurrence was already selected.
    pub fn add(&mut self, occurrence: &OccurrenceRef) -> bool {
        let key = SelectionKey::of(occurrence);
        if self.entries.contains_key(&key) {
            warn!(id = key.id, date = %key.date, "occurrence already selected");
            return false;
        }
        self.entries.insert(key, occurrence.clone());
        true
    }

    pub fn remove(&mut self, occurrence: &Occurrence) -> bool {
        self.entries.remove(&SelectionKey::of(occurrence)).is_some()
    }

    pub fn exists(&self, occurrence: &Occurrence) -> bool {
        self.entries.contains_key(&SelectionKey::of(occurrence))
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selected occurrences ordered by id, then start day.
    pub fn to_list(&self) -> Vec<OccurrenceRef> {
        self.entries.values().cloned().collect()
    }
}

/// Receives selection callbacks from the window controller.
pub trait SelectionObserver {
    fn selection_changed(&mut self, selection: &SelectionOverlay);

    /// A selection was refused because `max` occurrences are already selected.
    fn limit_reached(&mut self, max: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected,
    Deselected,
    Unchanged,
    /// The selection was refused because the cap was reached.
    LimitReached,
}
