//! Row change observers.
//!
//! Callbacks are registered per table and fire after a whole event's
//! deltas have been applied, so every callback observes the cache in the
//! event's post-state. A primary-key row whose delete and insert arrive
//! in the same event fires only the update callback.

use gridlink_codec::ProductValue;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CALLBACK_ID: AtomicU64 = AtomicU64::new(0);

/// Handle identifying one registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

impl CallbackId {
    fn next() -> Self {
        Self(NEXT_CALLBACK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Context describing the event a callback belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// Server-assigned event ordinal; zero for snapshot application.
    pub event_id: u64,
    /// Name of the reducer whose call produced the event, when known.
    pub reducer: Option<String>,
}

/// Observer for inserted or deleted rows.
pub type RowCallback = Box<dyn FnMut(&EventContext, &ProductValue)>;

/// Observer for updated rows, receiving the old row then the new.
pub type UpdateCallback = Box<dyn FnMut(&EventContext, &ProductValue, &ProductValue)>;

/// The registered observers for one table.
#[derive(Default)]
pub struct TableCallbacks {
    inserts: Vec<(CallbackId, RowCallback)>,
    deletes: Vec<(CallbackId, RowCallback)>,
    updates: Vec<(CallbackId, UpdateCallback)>,
}

impl TableCallbacks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an insert observer.
    pub fn on_insert(&mut self, callback: RowCallback) -> CallbackId {
        let id = CallbackId::next();
        self.inserts.push((id, callback));
        id
    }

    /// Registers a delete observer.
    pub fn on_delete(&mut self, callback: RowCallback) -> CallbackId {
        let id = CallbackId::next();
        self.deletes.push((id, callback));
        id
    }

    /// Registers an update observer.
    pub fn on_update(&mut self, callback: UpdateCallback) -> CallbackId {
        let id = CallbackId::next();
        self.updates.push((id, callback));
        id
    }

    /// Removes a callback by id. Returns true if it was registered here.
    pub fn remove(&mut self, id: CallbackId) -> bool {
        let before = self.inserts.len() + self.deletes.len() + self.updates.len();
        self.inserts.retain(|(cid, _)| *cid != id);
        self.deletes.retain(|(cid, _)| *cid != id);
        self.updates.retain(|(cid, _)| *cid != id);
        before != self.inserts.len() + self.deletes.len() + self.updates.len()
    }

    /// Invokes every insert observer, in registration order.
    pub fn dispatch_insert(&mut self, ctx: &EventContext, row: &ProductValue) {
        for (_, callback) in &mut self.inserts {
            callback(ctx, row);
        }
    }

    /// Invokes every delete observer, in registration order.
    pub fn dispatch_delete(&mut self, ctx: &EventContext, row: &ProductValue) {
        for (_, callback) in &mut self.deletes {
            callback(ctx, row);
        }
    }

    /// Invokes every update observer, in registration order.
    pub fn dispatch_update(&mut self, ctx: &EventContext, old: &ProductValue, new: &ProductValue) {
        for (_, callback) in &mut self.updates {
            callback(ctx, old, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlink_codec::AlgebraicValue;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ctx() -> EventContext {
        EventContext {
            event_id: 1,
            reducer: None,
        }
    }

    fn sample_row() -> ProductValue {
        ProductValue {
            elements: vec![AlgebraicValue::U32(1)],
        }
    }

    #[test]
    fn dispatch_in_registration_order() {
        let mut callbacks = TableCallbacks::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second"] {
            let seen = Rc::clone(&seen);
            callbacks.on_insert(Box::new(move |_, _| seen.borrow_mut().push(label)));
        }

        callbacks.dispatch_insert(&ctx(), &sample_row());
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn remove_stops_dispatch() {
        let mut callbacks = TableCallbacks::new();
        let count = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&count);
        let id = callbacks.on_delete(Box::new(move |_, _| *counter.borrow_mut() += 1));

        callbacks.dispatch_delete(&ctx(), &sample_row());
        assert!(callbacks.remove(id));
        assert!(!callbacks.remove(id));
        callbacks.dispatch_delete(&ctx(), &sample_row());

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn update_sees_old_then_new() {
        let mut callbacks = TableCallbacks::new();
        let seen = Rc::new(RefCell::new(None));

        let sink = Rc::clone(&seen);
        callbacks.on_update(Box::new(move |_, old, new| {
            *sink.borrow_mut() = Some((old.clone(), new.clone()));
        }));

        let old = sample_row();
        let new = ProductValue {
            elements: vec![AlgebraicValue::U32(2)],
        };
        callbacks.dispatch_update(&ctx(), &old, &new);
        assert_eq!(*seen.borrow(), Some((old, new)));
    }

    #[test]
    fn callback_ids_are_unique() {
        let mut callbacks = TableCallbacks::new();
        let a = callbacks.on_insert(Box::new(|_, _| {}));
        let b = callbacks.on_insert(Box::new(|_, _| {}));
        assert_ne!(a, b);
    }
}
