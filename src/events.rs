//! Event kinds and the subscription registry.
//!
//! Features register handlers per event kind and keep the returned
//! [`Subscription`] as their disposer. Dispatch visits handlers of one kind in
//! registration order; there is no ordering across kinds.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

/// Page events the synchronizer reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Click,
    Blur,
    Input,
    Submit,
    KeyDown,
}

/// Disposer returned by [`Registry::subscribe`].
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping a Subscription leaks the handler; pass it to Registry::unsubscribe"]
pub struct Subscription {
    id: u64,
    kind: EventKind,
}

impl Subscription {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

#[derive(Clone, Debug)]
struct Slot<H> {
    id: u64,
    kind: EventKind,
    handler: H,
}

/// Handlers keyed by event kind, kept in registration order.
#[derive(Clone, Debug)]
pub struct Registry<H> {
    slots: Vec<Slot<H>>,
    next_id: u64,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self { slots: Vec::new(), next_id: 0 }
    }
}

impl<H: Clone> Registry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: H) -> Subscription {
        self.next_id += 1;
        self.slots.push(Slot { id: self.next_id, kind, handler });
        Subscription { id: self.next_id, kind }
    }

    /// Remove the handler behind `subscription`. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s.id != subscription.id);
        self.slots.len() != before
    }

    /// Handlers for `kind`, in registration order.
    #[must_use]
    pub fn handlers(&self, kind: EventKind) -> Vec<H> {
        self.slots
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.handler.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
