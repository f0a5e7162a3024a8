//! Ordered handler registry.
//!
//! `Signal<E>` is the primitive behind per-object pointer events: every
//! handler sees the same event, in the order it was added.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use anyhow::Result;

/// Identifies a handler within one [`Signal`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HandlerId(u64);

type Handler<E> = Rc<RefCell<dyn FnMut(&E) -> Result<()>>>;

pub struct Signal<E> {
    next_id: u64,
    handlers: Vec<(HandlerId, Handler<E>)>,
}

impl<E> Signal<E> {
    pub fn new() -> Self {
        Self { next_id: 0, handlers: Vec::new() }
    }

    pub fn add<F>(&mut self, handler: F) -> HandlerId
    where
        F: FnMut(&E) -> Result<()> + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Rc::new(RefCell::new(handler))));
        id
    }

    pub fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invokes every handler with `event`, stopping at the first error.
    pub fn run(&self, event: &E) -> Result<()> {
        let snapshot: Vec<Handler<E>> = self.handlers.iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in snapshot {
            (&mut *handler.borrow_mut())(event)?;
        }
        Ok(())
    }
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            next_id: self.next_id,
            handlers: self.handlers.clone(),
        }
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").field("handlers", &self.handlers.len()).finish()
    }
}
