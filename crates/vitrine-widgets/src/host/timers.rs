//! Virtual-clock timer queue.
//!
//! Stands in for `setTimeout` / `clearTimeout`. Time only moves when the
//! host advances it, so debounce and feedback delays are deterministic.

/// Handle returned by [`Timers::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    deadline: u64,
    tag: T,
}

/// A queue of one-shot timers carrying a payload `T`.
#[derive(Debug, Clone)]
pub struct Timers<T> {
    now: u64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of timers not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Schedule `tag` to fire `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, tag: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            deadline: self.now.saturating_add(delay_ms),
            tag,
        });
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until: u64) -> Option<T> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= until)
            .min_by_key(|(_, p)| (p.deadline, p.id))
            .map(|(i, _)| i)?;
        let fired = self.pending.remove(idx);
        self.now = self.now.max(fired.deadline);
        Some(fired.tag)
    }

    /// Move the clock forward to `t` (never backwards).
    pub fn advance_to(&mut self, t: u64) {
        self.now = self.now.max(t);
    }

    /// Fire everything due within the next `elapsed_ms`, in deadline order.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<T> {
        let until = self.now.saturating_add(elapsed_ms);
        let mut fired = Vec::new();
        while let Some(tag) = self.pop_due(until) {
            fired.push(tag);
        }
        self.advance_to(until);
        fired
    }
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}
