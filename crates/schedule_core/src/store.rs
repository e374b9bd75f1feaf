use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::cursor::{CursorSource, CursorStep, Direction, OccurrenceCursor, Query};
use crate::error::StoreError;
use crate::occurrence::{CalendarEvent, OccurrenceId, OccurrenceRef, RepeaterUnit};

/// Emissions computed ahead of demand by a plain `prefetch(false)`.
pub const PREFETCH_BATCH: usize = 16;
const AGGRESSIVE_FACTOR: usize = 4;

/// In-memory event table. Clones share the same table, so a worker thread can
/// keep inserting while the UI thread opens cursors.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceStore {
    events: Arc<RwLock<Vec<CalendarEvent>>>,
}

impl OccurrenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: impl IntoIterator<Item = CalendarEvent>) -> Result<Self, StoreError> {
        let store = Self::new();
        for event in events {
            store.insert(event)?;
        }
        Ok(store)
    }

    #[instrument]
    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let events: Vec<CalendarEvent> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let store = Self::from_events(events)?;
        debug!(events = store.len(), "event file loaded");
        Ok(store)
    }

    pub fn insert(&self, event: CalendarEvent) -> Result<(), StoreError> {
        if event.end < event.start {
            return Err(StoreError::InvalidEvent { id: event.id });
        }
        self.events.write().push(event);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    fn snapshot(&self, query: &Query) -> Vec<CalendarEvent> {
        let events = self.events.read();
        match query.text.as_deref() {
            Some(text) => events
                .iter()
                .filter(|event| event.matches_text(text))
                .cloned()
                .collect(),
            None => events.clone(),
        }
    }
}

impl CursorSource for OccurrenceStore {
    fn open(
        &self,
        anchor: NaiveDate,
        direction: Direction,
        query: &Query,
    ) -> Box<dyn OccurrenceCursor> {
        Box::new(ExpandingCursor::new(
            anchor,
            direction,
            self.snapshot(query),
            query.range,
        ))
    }
}

/// One instance of an event waiting to be emitted on `day`.
#[derive(Debug, Clone)]
struct Pending {
    day: NaiveDate,
    first_day: NaiveDate,
    last_day: NaiveDate,
    event: usize,
    instance: u32,
    opening: bool,
    occurrence: OccurrenceRef,
}

impl Pending {
    fn key(&self) -> (NaiveDate, NaiveDateTime, OccurrenceId, u32) {
        (
            self.day,
            self.occurrence.start,
            self.occurrence.id,
            self.instance,
        )
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug)]
enum Frontier {
    Ascending(BinaryHeap<Reverse<Pending>>),
    Descending(BinaryHeap<Pending>),
}

impl Frontier {
    fn new(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Frontier::Ascending(BinaryHeap::new()),
            Direction::Backward => Frontier::Descending(BinaryHeap::new()),
        }
    }

    fn push(&mut self, pending: Pending) {
        match self {
            Frontier::Ascending(heap) => heap.push(Reverse(pending)),
            Frontier::Descending(heap) => heap.push(pending),
        }
    }

    fn pop(&mut self) -> Option<Pending> {
        match self {
            Frontier::Ascending(heap) => heap.pop().map(|Reverse(pending)| pending),
            Frontier::Descending(heap) => heap.pop(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Frontier::Ascending(heap) => heap.len(),
            Frontier::Descending(heap) => heap.len(),
        }
    }
}

/// Lazily expands events into per-day occurrences. Forward cursors cover days
/// on or after the anchor, backward cursors the days strictly before it.
#[derive(Debug)]
pub struct ExpandingCursor {
    direction: Direction,
    events: Vec<CalendarEvent>,
    frontier: Frontier,
    range: Option<(NaiveDate, NaiveDate)>,
    /// Inclusive bound on the side of the anchor this cursor covers.
    limit: NaiveDate,
    buffer: VecDeque<(NaiveDate, OccurrenceRef)>,
    current: NaiveDate,
    started: bool,
    drained: bool,
    exhausted: bool,
}

impl ExpandingCursor {
    pub fn new(
        anchor: NaiveDate,
        direction: Direction,
        events: Vec<CalendarEvent>,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Self {
        // A range starting away from the anchor moves the first covered day
        // to the range edge, so no step has to walk the days in between.
        let limit = match (direction, range) {
            (Direction::Forward, Some((from, _))) => anchor.max(from),
            (Direction::Forward, None) => anchor,
            (Direction::Backward, range) => {
                let before = anchor.pred_opt().unwrap_or(NaiveDate::MIN);
                range.map_or(before, |(_, to)| before.min(to))
            }
        };
        let mut cursor = Self {
            direction,
            events,
            frontier: Frontier::new(direction),
            range,
            limit,
            buffer: VecDeque::new(),
            current: anchor,
            started: false,
            drained: false,
            exhausted: false,
        };
        for index in 0..cursor.events.len() {
            if let Some(instance) = cursor.first_instance(index) {
                cursor.schedule_instance(index, instance);
            }
        }
        debug!(
            ?direction,
            %anchor,
            live = cursor.frontier.len(),
            "expanding cursor opened"
        );
        cursor
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Index of the instance nearest the anchor on this cursor's side.
    fn first_instance(&self, index: usize) -> Option<u32> {
        let event = &self.events[index];
        let mut n = skip_estimate(event, self.limit);
        match self.direction {
            Direction::Forward => loop {
                let occurrence = event.instance(n)?;
                if occurrence.last_covered_date() >= self.limit {
                    return Some(n);
                }
                n = n.checked_add(1)?;
            },
            Direction::Backward => {
                if event.instance_start(n)?.date() > self.limit {
                    return None;
                }
                while let Some(next) = n.checked_add(1) {
                    match event.instance_start(next) {
                        Some(start) if start.date() <= self.limit => n = next,
                        _ => break,
                    }
                }
                Some(n)
            }
        }
    }

    fn schedule_instance(&mut self, index: usize, instance: u32) {
        let Some(occurrence) = self.events[index].instance(instance) else {
            return;
        };
        let mut first_day = occurrence.start_date();
        let mut last_day = occurrence.last_covered_date();
        let day = match self.direction {
            Direction::Forward => {
                first_day = first_day.max(self.limit);
                first_day
            }
            Direction::Backward => {
                last_day = last_day.min(self.limit);
                last_day
            }
        };
        if first_day > last_day {
            return;
        }
        self.frontier.push(Pending {
            day,
            first_day,
            last_day,
            event: index,
            instance,
            opening: true,
            occurrence,
        });
    }

    fn compute_next(&mut self) -> Option<(NaiveDate, OccurrenceRef)> {
        if self.drained {
            return None;
        }
        while let Some(pending) = self.frontier.pop() {
            if pending.opening {
                let sibling = match self.direction {
                    Direction::Forward => pending.instance.checked_add(1),
                    Direction::Backward => pending.instance.checked_sub(1),
                };
                if let Some(sibling) = sibling {
                    self.schedule_instance(pending.event, sibling);
                }
            }

            let following = match self.direction {
                Direction::Forward => pending
                    .day
                    .succ_opt()
                    .filter(|day| *day <= pending.last_day),
                Direction::Backward => pending
                    .day
                    .pred_opt()
                    .filter(|day| *day >= pending.first_day),
            };
            if let Some(day) = following {
                self.frontier.push(Pending {
                    day,
                    opening: false,
                    ..pending.clone()
                });
            }

            match self.range_position(pending.day) {
                Ordering::Equal => return Some((pending.day, pending.occurrence)),
                Ordering::Less => continue,
                Ordering::Greater => break,
            }
        }
        self.drained = true;
        None
    }

    /// `Less` when the day is still before the query range in this cursor's
    /// direction, `Greater` once it has moved past it.
    fn range_position(&self, day: NaiveDate) -> Ordering {
        let Some((from, to)) = self.range else {
            return Ordering::Equal;
        };
        match self.direction {
            Direction::Forward if day < from => Ordering::Less,
            Direction::Forward if day > to => Ordering::Greater,
            Direction::Backward if day > to => Ordering::Less,
            Direction::Backward if day < from => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

impl OccurrenceCursor for ExpandingCursor {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn prefetch(&mut self, aggressive: bool) {
        let target = if aggressive {
            PREFETCH_BATCH * AGGRESSIVE_FACTOR
        } else {
            PREFETCH_BATCH
        };
        while self.buffer.len() < target {
            let Some(item) = self.compute_next() else {
                break;
            };
            self.buffer.push_back(item);
        }
        debug!(aggressive, buffered = self.buffered(), "cursor prefetched");
    }

    fn next(&mut self) -> CursorStep {
        let item = match self.buffer.pop_front() {
            Some(item) => Some(item),
            None => self.compute_next(),
        };
        let Some((day, occurrence)) = item else {
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

/// Number of instances that certainly lie wholly before `limit`, so the
/// search for the first relevant instance does not start at the base.
fn skip_estimate(event: &CalendarEvent, limit: NaiveDate) -> u32 {
    let Some(repeater) = event.repeat else {
        return 0;
    };
    let longest_period = match repeater.unit {
        RepeaterUnit::Day => 1,
        RepeaterUnit::Week => 7,
        RepeaterUnit::Month => 31,
        RepeaterUnit::Year => 366,
    } * i64::from(repeater.amount.max(1));
    let span = limit - event.end.date() - Duration::days(1);
    let whole = span.num_days() / longest_period - 1;
    u32::try_from(whole.max(0)).unwrap_or(u32::MAX)
}
