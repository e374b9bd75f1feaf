//! Chronological chain of day groups.
//!
//! Groups live in an arena and are linked both ways. Lookups walk inwards
//! from whichever end is closer to the target date; there is no random access
//! by date and no scan from position zero.

use chrono::NaiveDate;

use crate::cursor::Direction;
use crate::group::DayGroup;
use crate::occurrence::YearMonth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Link {
    group: DayGroup,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

#[derive(Debug, Default)]
pub struct GroupChain {
    links: Vec<Link>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl GroupChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    pub fn get(&self, id: NodeId) -> &DayGroup {
        &self.links[id.0].group
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut DayGroup {
        &mut self.links[id.0].group
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.links[id.0].prev
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.links[id.0].next
    }

    fn date(&self, id: NodeId) -> NaiveDate {
        self.get(id).date()
    }

    /// Links `group` after the current tail.
    ///
    /// # Panics
    /// If `group` is not strictly later than the tail.
    pub fn append(&mut self, group: DayGroup) -> NodeId {
        match self.tail {
            Some(tail) => self.insert_after(tail, group),
            None => self.push_first(group),
        }
    }

    /// Links `group` before the current head.
    ///
    /// # Panics
    /// If `group` is not strictly earlier than the head.
    pub fn prepend(&mut self, group: DayGroup) -> NodeId {
        match self.head {
            Some(head) => self.insert_before(head, group),
            None => self.push_first(group),
        }
    }

    fn push_first(&mut self, group: DayGroup) -> NodeId {
        debug_assert!(self.is_empty());
        let id = self.alloc(group, None, None);
        self.head = Some(id);
        self.tail = Some(id);
        id
    }

    fn alloc(&mut self, group: DayGroup, prev: Option<NodeId>, next: Option<NodeId>) -> NodeId {
        let id = NodeId(self.links.len());
        self.links.push(Link { group, prev, next });
        id
    }

    fn insert_after(&mut self, at: NodeId, group: DayGroup) -> NodeId {
        let next = self.next(at);
        assert!(
            group.date() > self.date(at) && next.map_or(true, |n| group.date() < self.date(n)),
            "day group {} breaks chain order",
            group.date()
        );
        let id = self.alloc(group, Some(at), next);
        self.links[at.0].next = Some(id);
        match next {
            Some(next) => self.links[next.0].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }

    fn insert_before(&mut self, at: NodeId, group: DayGroup) -> NodeId {
        let prev = self.prev(at);
        assert!(
            group.date() < self.date(at) && prev.map_or(true, |p| group.date() > self.date(p)),
            "day group {} breaks chain order",
            group.date()
        );
        let id = self.alloc(group, prev, Some(at));
        self.links[at.0].prev = Some(id);
        match prev {
            Some(prev) => self.links[prev.0].next = Some(id),
            None => self.head = Some(id),
        }
        id
    }

    /// Group whose date is closest to `date`, preferring an exact match and
    /// then the earlier of two equidistant neighbours.
    pub fn find_nearest(&self, date: NaiveDate) -> Option<NodeId> {
        let (head, tail) = (self.head?, self.tail?);
        let from_head = (date - self.date(head)).num_days().abs();
        let from_tail = (self.date(tail) - date).num_days().abs();

        let (before, after) = if from_tail <= from_head {
            let mut at = Some(tail);
            let mut after = None;
            while let Some(id) = at.filter(|id| self.date(*id) > date) {
                after = Some(id);
                at = self.prev(id);
            }
            (at, after)
        } else {
            let mut at = Some(head);
            let mut before = None;
            while let Some(id) = at.filter(|id| self.date(*id) < date) {
                before = Some(id);
                at = self.next(id);
            }
            if at.is_some_and(|id| self.date(id) == date) {
                return at;
            }
            (before, at)
        };

        match (before, after) {
            (Some(b), Some(a)) => {
                if (date - self.date(b)) <= (self.date(a) - date) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (b, a) => b.or(a),
        }
    }

    /// Locates the group for `date`, walking from the tail for forward
    /// insertion and from the head for backward insertion, and links a new
    /// group from `make` at the right place when none exists. The flag is
    /// `true` when a group was created.
    pub fn find_or_insert(
        &mut self,
        date: NaiveDate,
        from: Direction,
        make: impl FnOnce() -> DayGroup,
    ) -> (NodeId, bool) {
        match from {
            Direction::Forward => {
                let mut at = self.tail;
                while let Some(id) = at.filter(|id| self.date(*id) > date) {
                    at = self.prev(id);
                }
                match at {
                    Some(id) if self.date(id) == date => (id, false),
                    Some(id) => (self.insert_after(id, make()), true),
                    None => (self.prepend(make()), true),
                }
            }
            Direction::Backward => {
                let mut at = self.head;
                while let Some(id) = at.filter(|id| self.date(*id) < date) {
                    at = self.next(id);
                }
                match at {
                    Some(id) if self.date(id) == date => (id, false),
                    Some(id) => (self.insert_before(id, make()), true),
                    None => (self.append(make()), true),
                }
            }
        }
    }

    /// Whether any group of `month` is linked, walking inwards from the end
    /// `from` names only until the walk leaves that month behind.
    pub fn month_present_from(&self, from: Direction, month: YearMonth) -> bool {
        let mut at = match from {
            Direction::Forward => self.tail,
            Direction::Backward => self.head,
        };
        while let Some(id) = at {
            let current = self.get(id).month();
            if current == month {
                return true;
            }
            at = match from {
                Direction::Forward if current > month => self.prev(id),
                Direction::Backward if current < month => self.next(id),
                _ => None,
            };
        }
        false
    }

    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            at: self.head,
        }
    }
}

pub struct ChainIter<'a> {
    chain: &'a GroupChain,
    at: Option<NodeId>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a DayGroup;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.at?;
        self.at = self.chain.next(id);
        Some(self.chain.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn chain_of(days: &[(u32, u32)]) -> GroupChain {
        let mut chain = GroupChain::new();
        for (i, (m, d)) in days.iter().enumerate() {
            chain.append(DayGroup::new(day(*m, *d), i as i64));
        }
        chain
    }

    fn dates(chain: &GroupChain) -> Vec<NaiveDate> {
        chain.iter().map(DayGroup::date).collect()
    }

    #[test]
    fn append_and_prepend_keep_links_consistent() {
        let mut chain = GroupChain::new();
        let mid = chain.append(DayGroup::new(day(6, 15), 0));
        chain.append(DayGroup::new(day(6, 20), 1));
        chain.prepend(DayGroup::new(day(6, 10), -1));

        assert_eq!(dates(&chain), vec![day(6, 10), day(6, 15), day(6, 20)]);
        let head = chain.head().unwrap();
        let tail = chain.tail().unwrap();
        assert_eq!(chain.next(head), Some(mid));
        assert_eq!(chain.prev(tail), Some(mid));
        assert_eq!(chain.prev(head), None);
        assert_eq!(chain.next(tail), None);
    }

    #[test]
    #[should_panic(expected = "breaks chain order")]
    fn out_of_order_append_is_rejected() {
        let mut chain = chain_of(&[(6, 15)]);
        chain.append(DayGroup::new(day(6, 15), 1));
    }

    #[test]
    fn nearest_prefers_exact_then_closest() {
        let chain = chain_of(&[(6, 1), (6, 10), (6, 14), (6, 30)]);
        let date_of = |id: Option<NodeId>| id.map(|id| chain.get(id).date());

        assert_eq!(date_of(chain.find_nearest(day(6, 10))), Some(day(6, 10)));
        assert_eq!(date_of(chain.find_nearest(day(6, 13))), Some(day(6, 14)));
        assert_eq!(date_of(chain.find_nearest(day(6, 12))), Some(day(6, 10)));
        assert_eq!(date_of(chain.find_nearest(day(6, 25))), Some(day(6, 30)));
        assert_eq!(date_of(chain.find_nearest(day(5, 1))), Some(day(6, 1)));
        assert_eq!(date_of(chain.find_nearest(day(8, 1))), Some(day(6, 30)));
        assert!(GroupChain::new().find_nearest(day(6, 1)).is_none());
    }

    #[test]
    fn find_or_insert_merges_and_fills_gaps() {
        let mut chain = chain_of(&[(6, 10), (6, 20)]);

        let (existing, created) =
            chain.find_or_insert(day(6, 20), Direction::Forward, || unreachable!());
        assert!(!created);
        assert_eq!(chain.get(existing).date(), day(6, 20));

        let (_, created) =
            chain.find_or_insert(day(6, 15), Direction::Backward, || DayGroup::new(day(6, 15), -1));
        assert!(created);
        let (_, created) =
            chain.find_or_insert(day(6, 25), Direction::Backward, || DayGroup::new(day(6, 25), -2));
        assert!(created);
        let (_, created) =
            chain.find_or_insert(day(6, 1), Direction::Forward, || DayGroup::new(day(6, 1), 2));
        assert!(created);

        assert_eq!(
            dates(&chain),
            vec![day(6, 1), day(6, 10), day(6, 15), day(6, 20), day(6, 25)]
        );
    }

    #[test]
    fn month_lookup_stops_at_earlier_months() {
        let chain = chain_of(&[(4, 30), (5, 2), (5, 31), (6, 1), (6, 3)]);
        let may = YearMonth::of(day(5, 1));
        assert!(chain.month_present_from(Direction::Forward, may));
        assert!(chain.month_present_from(Direction::Backward, may));
        let march = YearMonth::of(day(3, 1));
        assert!(!chain.month_present_from(Direction::Forward, march));
        let july = YearMonth::of(day(7, 1));
        assert!(!chain.month_present_from(Direction::Forward, july));
        assert!(!chain.month_present_from(Direction::Backward, july));
    }
}
