//! Deferred one-shot events.
//!
//! Every suspension point in the site (simulated network latency, notice
//! auto-dismiss, transition reverts) is an entry here. The queue holds plain
//! event values rather than closures so the owner decides how to apply them.

#[cfg(test)]
#[path = "timers_test.rs"]
mod timers_test;

/// Handle for cancelling a scheduled event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<E> {
    id: TimerId,
    due: f64,
    event: E,
}

/// A queue of events, each due at an absolute time in milliseconds.
#[derive(Clone, Debug)]
pub struct Timers<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self { entries: Vec::new(), next_id: 0 }
    }
}

impl<E> Timers<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire `delay_ms` after `now`.
    pub fn schedule(&mut self, now: f64, delay_ms: f64, event: E) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.push(Entry { id, due: now + delay_ms.max(0.0), event });
        id
    }

    /// Cancel a scheduled event. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Remove and return every event due at `now`, earliest first.
    ///
    /// Events with equal deadlines come out in scheduling order.
    pub fn drain_due(&mut self, now: f64) -> Vec<E> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|e| e.event).collect()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.entries.iter().map(|e| e.due).min_by(f64::total_cmp)
    }
}
