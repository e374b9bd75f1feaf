use std::collections::VecDeque;

/// Generation of the window a task was scheduled against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<T> {
    pub epoch: Epoch,
    pub task: T,
}

/// FIFO of single-step deferred tasks for a cooperative UI loop. Every task
/// carries the epoch it was scheduled in; advancing the epoch makes all
/// earlier tasks stale without removing them.
#[derive(Debug)]
pub struct IdleQueue<T> {
    epoch: Epoch,
    queue: VecDeque<Scheduled<T>>,
}

impl<T> Default for IdleQueue<T> {
    fn default() -> Self {
        Self {
            epoch: Epoch::default(),
            queue: VecDeque::new(),
        }
    }
}

impl<T> IdleQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_epoch(&mut self) -> Epoch {
        self.epoch = Epoch(self.epoch.0 + 1);
        self.epoch
    }

    pub fn schedule(&mut self, task: T) {
        self.queue.push_back(Scheduled {
            epoch: self.epoch,
            task,
        });
    }

    pub fn pop(&mut self) -> Option<Scheduled<T>> {
        self.queue.pop_front()
    }

    pub fn is_current(&self, scheduled: &Scheduled<T>) -> bool {
        scheduled.epoch == self.epoch
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
