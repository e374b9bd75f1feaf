//! Windowed list controller.
//!
//! Holds a forward and a backward cursor anchored at a focus date and
//! materializes what they produce into day groups and month markers. Every
//! created node receives the current position counter of its side, so the
//! distance between the last realized row and an edge is a subtraction.
//!
//! Extension work is split into single steps queued on an [`IdleQueue`]; the
//! host drains the queue from its idle callback with
//! [`WindowedList::run_next_task`]. Replacing the data sources advances the
//! queue's epoch so steps scheduled against the previous window do nothing.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::chain::{GroupChain, NodeId};
use crate::config::WindowConfig;
use crate::cursor::{CursorSource, Direction, OccurrenceCursor, Query};
use crate::group::{DayGroup, GroupEntry, MonthMarker, Position};
use crate::occurrence::{Occurrence, OccurrenceRef, YearMonth};
use crate::render::{collect_rows, WindowRow};
use crate::selection::{SelectionKey, SelectionObserver, SelectionOutcome, SelectionOverlay};
use crate::tasks::IdleQueue;

const INITIAL_APPENDED: Position = -1;
const INITIAL_PREPENDED: Position = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    /// Nothing materialized yet, but a cursor may still produce items.
    Loading,
    /// Both cursors ran out without producing anything.
    Empty,
    Populated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendResult {
    Inserted {
        created_group: bool,
        created_marker: bool,
    },
    NoMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    /// Enough is loaded past the last realized row.
    FarFromEdge,
    /// Pointer down or an animation in progress.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Extended(Direction),
    Stopped(Direction, StopReason),
    /// Scheduled before the last rebuild; nothing was done.
    Stale(Direction),
}

pub struct WindowedList {
    anchor: NaiveDate,
    config: WindowConfig,
    forward: Box<dyn OccurrenceCursor>,
    backward: Box<dyn OccurrenceCursor>,
    peeked: Option<(NaiveDate, OccurrenceRef)>,
    chain: GroupChain,
    months: BTreeMap<YearMonth, MonthMarker>,
    last_appended: Position,
    last_prepended: Position,
    last_realized: Option<Position>,
    scroll: Option<Direction>,
    pointer_down: bool,
    animating: bool,
    tasks: IdleQueue<Direction>,
    forward_pending: bool,
    backward_pending: bool,
    anchor_day_has_events: bool,
    anchor_month_has_events: bool,
    selection: SelectionOverlay,
    max_selection: Option<usize>,
    observer: Option<Box<dyn SelectionObserver>>,
}

impl WindowedList {
    pub fn new(
        anchor: NaiveDate,
        forward: Box<dyn OccurrenceCursor>,
        backward: Box<dyn OccurrenceCursor>,
        config: WindowConfig,
    ) -> Self {
        debug_assert!(forward.direction().is_forward());
        debug_assert!(!backward.direction().is_forward());
        let mut list = Self {
            anchor,
            config,
            forward,
            backward,
            peeked: None,
            chain: GroupChain::new(),
            months: BTreeMap::new(),
            last_appended: INITIAL_APPENDED,
            last_prepended: INITIAL_PREPENDED,
            last_realized: None,
            scroll: None,
            pointer_down: false,
            animating: false,
            tasks: IdleQueue::new(),
            forward_pending: false,
            backward_pending: false,
            anchor_day_has_events: false,
            anchor_month_has_events: false,
            selection: SelectionOverlay::new(),
            max_selection: None,
            observer: None,
        };
        list.seed();
        list
    }

    /// Opens both cursors on `source` and seeds a window around `anchor`.
    pub fn open(
        source: &dyn CursorSource,
        anchor: NaiveDate,
        query: &Query,
        config: WindowConfig,
    ) -> Self {
        Self::new(
            anchor,
            source.open(anchor, Direction::Forward, query),
            source.open(anchor, Direction::Backward, query),
            config,
        )
    }

    pub fn chain(&self) -> &GroupChain {
        &self.chain
    }

    pub fn month_markers(&self) -> impl Iterator<Item = &MonthMarker> {
        self.months.values()
    }

    pub fn rows(&self) -> Vec<WindowRow<'_>> {
        collect_rows(&self.chain, &self.months)
    }

    pub fn last_appended_index(&self) -> Position {
        self.last_appended
    }

    pub fn last_prepended_index(&self) -> Position {
        self.last_prepended
    }

    pub fn anchor_day_has_events(&self) -> bool {
        self.anchor_day_has_events
    }

    pub fn anchor_month_has_events(&self) -> bool {
        self.anchor_month_has_events
    }

    pub fn scroll_direction(&self) -> Option<Direction> {
        self.scroll
    }

    pub fn is_extending(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward_pending,
            Direction::Backward => self.backward_pending,
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn status(&self) -> WindowStatus {
        if !self.chain.is_empty() {
            WindowStatus::Populated
        } else if self.side_exhausted(Direction::Forward) && self.side_exhausted(Direction::Backward)
        {
            WindowStatus::Empty
        } else {
            WindowStatus::Loading
        }
    }

    pub fn is_exhausted(&self, direction: Direction) -> bool {
        self.side_exhausted(direction)
    }

    fn side_exhausted(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.peeked.is_none() && self.forward.is_exhausted(),
            Direction::Backward => self.backward.is_exhausted(),
        }
    }

    fn seed(&mut self) {
        let first = self.forward.next();
        if let Some(occurrence) = first.occurrence {
            let date = self.forward.current_date();
            self.anchor_day_has_events = date == self.anchor;
            self.anchor_month_has_events = YearMonth::of(self.anchor).contains(date);
            self.peeked = Some((date, occurrence));
        }

        let appended = self.fill(Direction::Forward);
        let prepended = if appended < self.config.min_fill {
            self.fill(Direction::Backward)
        } else {
            0
        };
        info!(
            anchor = %self.anchor,
            appended,
            prepended,
            groups = self.chain.len(),
            months = self.months.len(),
            "window seeded"
        );
        self.schedule_extensions();
    }

    fn fill(&mut self, direction: Direction) -> usize {
        let mut inserted = 0;
        while inserted < self.config.min_fill {
            if self.step(direction) == AppendResult::NoMore {
                break;
            }
            inserted += 1;
        }
        inserted
    }

    fn step(&mut self, direction: Direction) -> AppendResult {
        match direction {
            Direction::Forward => self.append_next(),
            Direction::Backward => self.prepend_next(),
        }
    }

    /// Pulls one occurrence from the forward cursor into the window.
    pub fn append_next(&mut self) -> AppendResult {
        let (date, occurrence) = match self.peeked.take() {
            Some(peeked) => peeked,
            None => match self.forward.next().occurrence {
                Some(occurrence) => (self.forward.current_date(), occurrence),
                None => return AppendResult::NoMore,
            },
        };
        self.insert(date, occurrence, Direction::Forward)
    }

    /// Pulls one occurrence from the backward cursor into the window.
    pub fn prepend_next(&mut self) -> AppendResult {
        let Some(occurrence) = self.backward.next().occurrence else {
            return AppendResult::NoMore;
        };
        let date = prepend_date(self.backward.current_date(), &occurrence);
        self.insert(date, occurrence, Direction::Backward)
    }

    fn insert(
        &mut self,
        date: NaiveDate,
        occurrence: OccurrenceRef,
        direction: Direction,
    ) -> AppendResult {
        let month = YearMonth::of(date);
        let needs_marker = !self.chain.month_present_from(direction, month);
        debug_assert_eq!(needs_marker, !self.months.contains_key(&month));

        // Appends claim the marker's position before the group's, prepends
        // after it, so positions follow display order at both edges.
        if needs_marker && direction.is_forward() {
            self.create_marker(month, direction);
        }

        let candidate = self.peek_position(direction);
        let (id, created_group) = self
            .chain
            .find_or_insert(date, direction, || DayGroup::new(date, candidate));
        if created_group {
            self.claim_position(direction);
            debug!(%date, position = candidate, ?direction, "day group created");
        }

        if !direction.is_forward() {
            if needs_marker {
                self.create_marker(month, direction);
            } else if created_group && self.first_of_month(id) {
                self.lift_marker(month, id);
            }
        }

        let selected = self.selection.exists(&occurrence);
        if !self
            .chain
            .get_mut(id)
            .insert(GroupEntry { occurrence, selected }, direction)
        {
            debug!(%date, "occurrence already shown on this day");
        }

        AppendResult::Inserted {
            created_group,
            created_marker: needs_marker,
        }
    }

    fn create_marker(&mut self, month: YearMonth, direction: Direction) {
        let position = self.claim_position(direction);
        self.months.insert(month, MonthMarker { month, position });
        debug!(%month, position, "month marker created");
    }

    fn first_of_month(&self, id: NodeId) -> bool {
        let month = self.chain.get(id).month();
        self.chain
            .prev(id)
            .map_or(true, |prev| self.chain.get(prev).month() != month)
    }

    /// A prepended group became the first day of a month whose marker already
    /// exists. The group takes the marker's slot and the marker moves up to
    /// the head position the group was given, so the marker is still drawn
    /// above it and positions keep increasing down the list.
    fn lift_marker(&mut self, month: YearMonth, id: NodeId) {
        let Some(marker) = self.months.get_mut(&month) else {
            return;
        };
        let group = self.chain.get_mut(id);
        let head = group.position();
        if marker.position < head {
            return;
        }
        group.set_position(marker.position);
        debug!(%month, from = marker.position, to = head, "month marker lifted");
        marker.position = head;
    }

    fn peek_position(&self, direction: Direction) -> Position {
        match direction {
            Direction::Forward => self.last_appended + 1,
            Direction::Backward => self.last_prepended - 1,
        }
    }

    fn claim_position(&mut self, direction: Direction) -> Position {
        let position = self.peek_position(direction);
        match direction {
            Direction::Forward => self.last_appended = position,
            Direction::Backward => self.last_prepended = position,
        }
        position
    }

    /// Extension is due when this side holds fewer than `preload_items` nodes
    /// in total, or when the last realized row is within `preload_items` of
    /// the tail.
    pub fn is_near_tail(&self) -> bool {
        let preload = self.config.preload_items;
        let loaded = self.last_appended - INITIAL_APPENDED;
        let realized = self.last_realized.unwrap_or(0);
        loaded < preload || self.last_appended - realized < preload
    }

    pub fn is_near_head(&self) -> bool {
        let preload = self.config.preload_items;
        let loaded = INITIAL_PREPENDED - self.last_prepended;
        let realized = self.last_realized.unwrap_or(0);
        loaded < preload || realized - self.last_prepended < preload
    }

    fn is_near(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.is_near_tail(),
            Direction::Backward => self.is_near_head(),
        }
    }

    fn interrupted(&self) -> bool {
        self.pointer_down || self.animating
    }

    fn schedule_extensions(&mut self) {
        let order = match self.scroll {
            Some(Direction::Backward) => [Direction::Backward, Direction::Forward],
            _ => [Direction::Forward, Direction::Backward],
        };
        for direction in order {
            self.schedule_extension(direction);
        }
    }

    fn schedule_extension(&mut self, direction: Direction) {
        if self.is_extending(direction)
            || self.interrupted()
            || self.side_exhausted(direction)
            || !self.is_near(direction)
        {
            return;
        }
        self.set_pending(direction, true);
        self.tasks.schedule(direction);
    }

    fn set_pending(&mut self, direction: Direction, pending: bool) {
        match direction {
            Direction::Forward => self.forward_pending = pending,
            Direction::Backward => self.backward_pending = pending,
        }
    }

    /// Runs one queued extension step. Returns `None` when the queue is empty.
    pub fn run_next_task(&mut self) -> Option<StepOutcome> {
        let scheduled = self.tasks.pop()?;
        let direction = scheduled.task;
        if !self.tasks.is_current(&scheduled) {
            debug!(
                ?direction,
                epoch = scheduled.epoch.value(),
                "dropping step from a previous window"
            );
            return Some(StepOutcome::Stale(direction));
        }
        self.set_pending(direction, false);
        Some(self.extend_step(direction))
    }

    /// Drains the queue, running at most `limit` steps. Returns how many ran.
    pub fn run_until_idle(&mut self, limit: usize) -> usize {
        let mut ran = 0;
        while ran < limit && self.run_next_task().is_some() {
            ran += 1;
        }
        ran
    }

    fn extend_step(&mut self, direction: Direction) -> StepOutcome {
        if self.interrupted() {
            return StepOutcome::Stopped(direction, StopReason::Interrupted);
        }
        if self.side_exhausted(direction) {
            return StepOutcome::Stopped(direction, StopReason::Exhausted);
        }
        if !self.is_near(direction) {
            return StepOutcome::Stopped(direction, StopReason::FarFromEdge);
        }

        let aggressive = self.scroll == Some(direction);
        match direction {
            Direction::Forward => self.forward.prefetch(aggressive),
            Direction::Backward => self.backward.prefetch(aggressive),
        }

        match self.step(direction) {
            AppendResult::NoMore => {
                debug!(?direction, groups = self.chain.len(), "cursor exhausted");
                StepOutcome::Stopped(direction, StopReason::Exhausted)
            }
            AppendResult::Inserted { .. } => {
                self.schedule_extension(direction);
                StepOutcome::Extended(direction)
            }
        }
    }

    /// The host realized the node at `position`.
    pub fn note_realized(&mut self, position: Position) {
        let previous = self.last_realized.unwrap_or(0);
        if position > previous {
            self.scroll = Some(Direction::Forward);
        } else if position < previous {
            self.scroll = Some(Direction::Backward);
        }
        self.last_realized = Some(position);
        self.schedule_extensions();
    }

    pub fn pointer_down(&mut self) {
        self.pointer_down = true;
    }

    pub fn pointer_up(&mut self) {
        self.pointer_down = false;
        self.schedule_extensions();
    }

    pub fn drag_started(&mut self, direction: Direction) {
        self.scroll = Some(direction);
    }

    pub fn drag_stopped(&mut self) {
        self.schedule_extensions();
    }

    pub fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
        if !animating {
            self.schedule_extensions();
        }
    }

    /// Replaces both cursors and reseeds. Selection state is kept; queued
    /// steps from the previous window become stale.
    #[instrument(skip_all, fields(anchor = %self.anchor))]
    pub fn set_data_sources(
        &mut self,
        forward: Box<dyn OccurrenceCursor>,
        backward: Box<dyn OccurrenceCursor>,
    ) {
        let epoch = self.tasks.advance_epoch();
        self.forward = forward;
        self.backward = backward;
        self.peeked = None;
        self.chain.clear();
        self.months.clear();
        self.last_appended = INITIAL_APPENDED;
        self.last_prepended = INITIAL_PREPENDED;
        self.last_realized = None;
        self.scroll = None;
        self.forward_pending = false;
        self.backward_pending = false;
        self.anchor_day_has_events = false;
        self.anchor_month_has_events = false;
        info!(epoch = epoch.value(), "rebuilding window");
        self.seed();
    }

    pub fn set_query(&mut self, source: &dyn CursorSource, query: &Query) {
        self.set_data_sources(
            source.open(self.anchor, Direction::Forward, query),
            source.open(self.anchor, Direction::Backward, query),
        );
    }

    /// Moves the focus date and rebuilds around it.
    pub fn refocus(&mut self, source: &dyn CursorSource, anchor: NaiveDate, query: &Query) {
        self.anchor = anchor;
        self.set_query(source, query);
    }

    pub fn selection(&self) -> &SelectionOverlay {
        &self.selection
    }

    pub fn set_max_selection_count(&mut self, max: Option<usize>) {
        self.max_selection = max;
    }

    pub fn set_selection_observer(&mut self, observer: Box<dyn SelectionObserver>) {
        self.observer = Some(observer);
    }

    pub fn is_selected(&self, occurrence: &Occurrence) -> bool {
        self.selection.exists(occurrence)
    }

    pub fn toggle_selected(&mut self, occurrence: &OccurrenceRef) -> SelectionOutcome {
        let selected = !self.selection.exists(occurrence);
        self.set_selected(occurrence, selected)
    }

    /// Applies a checkbox change. A selection over the cap leaves the overlay
    /// and every checkbox untouched and reports the limit instead.
    pub fn set_selected(&mut self, occurrence: &OccurrenceRef, selected: bool) -> SelectionOutcome {
        if self.selection.exists(occurrence) == selected {
            return SelectionOutcome::Unchanged;
        }

        if selected {
            if let Some(max) = self.max_selection {
                if self.selection.count() >= max {
                    debug!(id = occurrence.id, max, "selection limit reached");
                    if let Some(observer) = self.observer.as_mut() {
                        observer.limit_reached(max);
                    }
                    return SelectionOutcome::LimitReached;
                }
            }
            self.selection.add(occurrence);
            self.mark_materialized(occurrence, true);
        } else {
            self.selection.remove(occurrence);
            self.mark_materialized(occurrence, false);
        }

        if let Some(observer) = self.observer.as_mut() {
            observer.selection_changed(&self.selection);
        }
        if selected {
            SelectionOutcome::Selected
        } else {
            SelectionOutcome::Deselected
        }
    }

    /// Updates checkbox flags on every materialized day the occurrence is
    /// shown on, including the day before its start that the all-day
    /// attribution rule may have used.
    fn mark_materialized(&mut self, occurrence: &Occurrence, selected: bool) {
        let key = SelectionKey::of(occurrence);
        let from = occurrence
            .start_date()
            .pred_opt()
            .unwrap_or(occurrence.start_date());
        let to = occurrence.last_covered_date();

        let Some(mut at) = self.chain.find_nearest(from) else {
            return;
        };
        while let Some(prev) = self
            .chain
            .prev(at)
            .filter(|prev| self.chain.get(*prev).date() >= from)
        {
            at = prev;
        }

        let mut cursor = Some(at);
        while let Some(id) = cursor {
            let group = self.chain.get_mut(id);
            if group.date() > to {
                break;
            }
            if group.date() >= from {
                group.mark_selected(&key, selected);
            }
            cursor = self.chain.next(id);
        }
    }
}

/// Day a backward-produced occurrence is filed under. An all-day occurrence
/// ending exactly at midnight of `raw` belongs to the day before.
fn prepend_date(raw: NaiveDate, occurrence: &Occurrence) -> NaiveDate {
    if occurrence.all_day && occurrence.ends_at_midnight_of(raw) {
        raw.pred_opt().unwrap_or(raw)
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::VecCursor;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn occ(id: i64, date: NaiveDate) -> OccurrenceRef {
        let start = date.and_hms_opt(9, 0, 0).unwrap();
        Arc::new(Occurrence {
            id,
            start,
            end: start + chrono::Duration::hours(1),
            summary: format!("event {id}"),
            location: String::new(),
            all_day: false,
            calendar_id: String::new(),
        })
    }

    fn cursor(anchor: NaiveDate, direction: Direction, days: &[NaiveDate]) -> Box<dyn OccurrenceCursor> {
        let base = if direction.is_forward() { 100 } else { 200 };
        Box::new(VecCursor::new(
            anchor,
            direction,
            days.iter()
                .enumerate()
                .map(|(i, d)| (*d, occ(base + i as i64, *d))),
        ))
    }

    fn assert_chronological(list: &WindowedList) {
        let dates: Vec<_> = list.chain().iter().map(|g| g.date()).collect();
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]), "{dates:?}");
    }

    fn config(min_fill: usize, preload_items: i64) -> WindowConfig {
        WindowConfig {
            min_fill,
            preload_items,
        }
    }

    #[test]
    fn positions_diverge_from_the_seed_boundary() {
        let anchor = day(6, 15);
        let list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &[day(6, 15), day(6, 16)]),
            cursor(anchor, Direction::Backward, &[day(5, 31)]),
            config(4, 8),
        );
        // forward: June marker 0, 06-15 at 1, 06-16 at 2
        // backward: 05-31 at -1, May marker at -2
        assert_eq!(list.last_appended_index(), 2);
        assert_eq!(list.last_prepended_index(), -2);
        let positions: Vec<_> = list.rows().iter().filter_map(WindowRow::position).collect();
        assert_eq!(positions, vec![-2, -1, 0, 1, 2]);
    }

    #[test]
    fn prepends_into_a_shown_month_keep_rows_increasing() {
        let anchor = day(6, 15);
        let mut list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &[day(6, 15)]),
            cursor(anchor, Direction::Backward, &[day(6, 10), day(6, 5), day(5, 31)]),
            config(4, 20),
        );
        let positions: Vec<_> = list.rows().iter().filter_map(WindowRow::position).collect();
        assert_eq!(positions, vec![-4, -3, -2, -1, 0, 1]);
        let markers: Vec<_> = list.month_markers().map(|m| (m.month.month, m.position)).collect();
        assert_eq!(markers, vec![(5, -4), (6, -2)]);
        assert_eq!(list.last_prepended_index(), -4);

        // scrolling up from the anchor day to the June header
        list.note_realized(1);
        list.note_realized(0);
        list.note_realized(-2);
        assert_eq!(list.scroll_direction(), Some(Direction::Backward));
    }

    #[test]
    fn realized_head_rows_drive_backward_extension() {
        struct Recording {
            inner: VecCursor,
            hints: Rc<RefCell<Vec<bool>>>,
        }

        impl OccurrenceCursor for Recording {
            fn direction(&self) -> Direction {
                self.inner.direction()
            }

            fn prefetch(&mut self, aggressive: bool) {
                self.hints.borrow_mut().push(aggressive);
            }

            fn next(&mut self) -> crate::cursor::CursorStep {
                self.inner.next()
            }

            fn current_date(&self) -> NaiveDate {
                self.inner.current_date()
            }

            fn is_exhausted(&self) -> bool {
                self.inner.is_exhausted()
            }
        }

        let anchor = day(7, 1);
        let hints = Rc::new(RefCell::new(Vec::new()));
        let backward = Recording {
            inner: VecCursor::new(
                anchor,
                Direction::Backward,
                (1..=60).map(|back| {
                    let date = anchor - chrono::Duration::days(back);
                    (date, occ(300 + back, date))
                }),
            ),
            hints: hints.clone(),
        };
        let mut list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &[]),
            Box::new(backward),
            config(2, 5),
        );
        list.run_until_idle(100);
        let head = list.last_prepended_index();
        assert_eq!(head, -5);
        assert!(hints.borrow().iter().all(|aggressive| !aggressive));

        list.note_realized(head);
        assert_eq!(list.scroll_direction(), Some(Direction::Backward));
        assert!(list.is_extending(Direction::Backward));
        hints.borrow_mut().clear();
        list.run_until_idle(100);

        assert_eq!(list.last_prepended_index(), head - 5);
        assert!(!list.is_near_head());
        assert_eq!(*hints.borrow(), vec![true; 5]);
        assert_chronological(&list);
    }

    #[test]
    fn backward_seeding_waits_when_forward_fills() {
        let anchor = day(6, 1);
        let days: Vec<_> = (1..=10).map(|d| day(6, d)).collect();
        let list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &days),
            cursor(anchor, Direction::Backward, &[day(5, 30)]),
            config(3, 2),
        );
        assert_eq!(list.chain().len(), 3);
        assert_eq!(list.last_prepended_index(), 0);
        assert!(list.is_extending(Direction::Backward));
        assert!(list.anchor_day_has_events());
        assert!(list.anchor_month_has_events());
    }

    #[test]
    fn anchor_flags_reflect_first_forward_item() {
        let anchor = day(6, 15);
        let list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &[day(7, 2)]),
            cursor(anchor, Direction::Backward, &[]),
            config(2, 2),
        );
        assert!(!list.anchor_day_has_events());
        assert!(!list.anchor_month_has_events());
        assert_eq!(list.status(), WindowStatus::Populated);
    }

    #[test]
    fn empty_cursors_report_empty_not_loading() {
        let anchor = day(6, 15);
        let list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &[]),
            cursor(anchor, Direction::Backward, &[]),
            config(4, 4),
        );
        assert_eq!(list.status(), WindowStatus::Empty);
        assert_eq!(list.pending_tasks(), 0);
    }

    #[test]
    fn realized_rows_drive_extension() {
        let anchor = day(1, 1);
        let days: Vec<_> = (0..60)
            .map(|offset| anchor + chrono::Duration::days(offset))
            .collect();
        let mut list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &days),
            cursor(anchor, Direction::Backward, &[]),
            config(2, 5),
        );
        list.run_until_idle(100);
        // backward side is empty, forward side loaded until five nodes exist
        let loaded = list.last_appended_index();
        assert!(loaded >= 4);
        assert!(!list.is_near_tail() || list.is_exhausted(Direction::Forward));

        list.note_realized(loaded);
        assert_eq!(list.scroll_direction(), Some(Direction::Forward));
        assert!(list.is_extending(Direction::Forward));
        list.run_until_idle(100);
        assert_eq!(list.last_appended_index() - loaded, 5);
        assert!(!list.is_near_tail());
    }

    #[test]
    fn pointer_down_halts_steps_until_released() {
        let anchor = day(1, 1);
        let days: Vec<_> = (0..40)
            .map(|offset| anchor + chrono::Duration::days(offset))
            .collect();
        let mut list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &days),
            cursor(anchor, Direction::Backward, &[]),
            config(1, 10),
        );
        list.pointer_down();
        let before = list.last_appended_index();
        let outcomes: Vec<_> = std::iter::from_fn(|| list.run_next_task()).collect();
        assert!(!outcomes.is_empty());
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, StepOutcome::Stopped(_, StopReason::Interrupted))));
        assert_eq!(list.last_appended_index(), before);

        list.note_realized(before);
        assert_eq!(list.pending_tasks(), 0);
        list.pointer_up();
        assert!(list.pending_tasks() > 0);
        assert!(list.run_until_idle(100) > 0);
        assert!(list.last_appended_index() > before);

        list.set_animating(true);
        list.note_realized(list.last_appended_index());
        assert_eq!(list.pending_tasks(), 0);
        list.set_animating(false);
        assert!(list.is_extending(Direction::Forward));
    }

    #[test]
    fn all_day_event_ending_at_midnight_moves_to_previous_day() {
        let anchor = day(6, 15);
        let holiday = Arc::new(Occurrence {
            id: 1,
            start: day(6, 9).and_hms_opt(0, 0, 0).unwrap(),
            end: day(6, 10).and_hms_opt(0, 0, 0).unwrap(),
            summary: "Holiday".into(),
            location: String::new(),
            all_day: true,
            calendar_id: String::new(),
        });
        let backward = VecCursor::new(
            anchor,
            Direction::Backward,
            vec![(day(6, 10), holiday.clone()), (day(6, 9), holiday)],
        );
        let list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &[]),
            Box::new(backward),
            config(4, 4),
        );
        let groups: Vec<_> = list.chain().iter().map(|g| (g.date(), g.len())).collect();
        assert_eq!(groups, vec![(day(6, 9), 1)]);
    }

    #[test]
    fn zero_length_all_day_event_keeps_heuristic() {
        let at_midnight = day(6, 10).and_hms_opt(0, 0, 0).unwrap();
        let marker = Occurrence {
            id: 3,
            start: at_midnight,
            end: at_midnight,
            summary: "Reminder".into(),
            location: String::new(),
            all_day: true,
            calendar_id: String::new(),
        };
        assert_eq!(prepend_date(day(6, 10), &marker), day(6, 9));
        let timed = Occurrence {
            all_day: false,
            ..marker
        };
        assert_eq!(prepend_date(day(6, 10), &timed), day(6, 10));
    }

    #[test]
    fn deselect_clears_checkbox_on_materialized_entry() {
        let anchor = day(6, 15);
        let mut list = WindowedList::new(
            anchor,
            cursor(anchor, Direction::Forward, &[day(6, 15)]),
            cursor(anchor, Direction::Backward, &[]),
            config(2, 2),
        );
        let target = list
            .chain()
            .iter()
            .flat_map(|g| g.entries())
            .map(|e| e.occurrence.clone())
            .next()
            .unwrap();
        assert_eq!(list.toggle_selected(&target), SelectionOutcome::Selected);
        assert!(list.chain().iter().flat_map(|g| g.entries()).all(|e| e.selected));
        assert_eq!(list.set_selected(&target, true), SelectionOutcome::Unchanged);
        assert_eq!(list.toggle_selected(&target), SelectionOutcome::Deselected);
        assert!(list.chain().iter().flat_map(|g| g.entries()).all(|e| !e.selected));
        assert!(list.selection().is_empty());
    }
}
