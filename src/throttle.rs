//! Rate limiting for high-frequency inputs such as scroll.
//!
//! The limiter is clock-agnostic: callers pass `now` in milliseconds and poll
//! for trailing-edge output. That keeps it deterministic under test and lets
//! the browser host arm a single timer for [`RateLimiter::deadline`].

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

/// Which edge of a burst produces output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Edge {
    /// Fire on the first call, then ignore calls until the interval elapses.
    Leading,
    /// Fire once after the burst goes quiet for a full interval, with the
    /// last value seen.
    #[default]
    Trailing,
}

/// Collapses bursts of calls into at most one output per interval.
#[derive(Clone, Debug)]
pub struct RateLimiter<T> {
    interval_ms: f64,
    edge: Edge,
    pending: Option<T>,
    deadline: Option<f64>,
    last_fired: Option<f64>,
}

impl<T> RateLimiter<T> {
    #[must_use]
    pub fn new(interval_ms: f64, edge: Edge) -> Self {
        Self { interval_ms: interval_ms.max(0.0), edge, pending: None, deadline: None, last_fired: None }
    }

    /// Trailing-edge limiter, the default for scroll handlers.
    #[must_use]
    pub fn trailing(interval_ms: f64) -> Self {
        Self::new(interval_ms, Edge::Trailing)
    }

    #[must_use]
    pub fn leading(interval_ms: f64) -> Self {
        Self::new(interval_ms, Edge::Leading)
    }

    /// Record a call.
    ///
    /// Leading: returns the value immediately if the limiter is open.
    /// Trailing: always returns `None`; the value replaces any pending one
    /// and the deadline moves to `now + interval`.
    pub fn call(&mut self, now: f64, value: T) -> Option<T> {
        match self.edge {
            Edge::Leading => {
                let open = self.last_fired.is_none_or(|at| now - at >= self.interval_ms);
                if open {
                    self.last_fired = Some(now);
                    Some(value)
                } else {
                    None
                }
            }
            Edge::Trailing => {
                self.pending = Some(value);
                self.deadline = Some(now + self.interval_ms);
                None
            }
        }
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: f64) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.last_fired = Some(now);
        self.pending.take()
    }

    /// When the pending value becomes due, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Drop any pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}
