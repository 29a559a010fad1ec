//! Interactive form widgets
//!
//! Each widget owns its state and its markup. Callers drive it only through
//! its operations (the equivalent of user events) and observe it only through
//! its change notifications and read accessors. Markup is rebuilt in full on
//! every state change; the widgets target datasets of tens to low hundreds of
//! rows and are not meant to scale beyond that without incremental rendering.
//!
//! - [`dropdown`]: multi-select dropdown with checkbox semantics
//! - [`select`]: single-value select that picks its first option on refill
//! - [`table`]: sortable, row-selectable data table

pub mod dropdown;
pub mod select;
pub mod table;

pub use dropdown::{DropdownChange, DropdownState, MultiselectDropdown};
pub use select::DynamicSelect;
pub use table::{DataTable, SelectAllState, SortDirection, SortState};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// Synchronous change notification fan-out. Listeners run in subscription
/// order, on the caller's stack, before the triggering operation returns.
pub struct Emitter<T> {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
    next_id: usize,
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_listeners_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = Emitter::new();

        let a = Rc::clone(&seen);
        emitter.subscribe(move |v: &u32| a.borrow_mut().push(("a", *v)));
        let b = Rc::clone(&seen);
        emitter.subscribe(move |v: &u32| b.borrow_mut().push(("b", *v)));

        emitter.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter = Emitter::new();

        let c = Rc::clone(&count);
        let id = emitter.subscribe(move |_: &()| *c.borrow_mut() += 1);
        emitter.emit(&());
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(&());

        assert_eq!(*count.borrow(), 1);
        assert!(emitter.is_empty());
    }
}
