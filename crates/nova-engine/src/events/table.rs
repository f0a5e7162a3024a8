use std::collections::HashMap;

use anyhow::Result;

use crate::input::PointerEventType;
use crate::signal::{HandlerId, Signal};

use super::Hit;

/// Per-object handler table: one signal per event type.
#[derive(Debug, Clone, Default)]
pub struct Events {
    signals: HashMap<PointerEventType, Signal<Hit>>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: PointerEventType, handler: F) -> HandlerId
    where
        F: FnMut(&Hit) -> Result<()> + 'static,
    {
        self.signals.entry(kind).or_default().add(handler)
    }

    pub fn off(&mut self, kind: &PointerEventType, id: HandlerId) -> bool {
        let Some(signal) = self.signals.get_mut(kind) else {
            return false;
        };
        let removed = signal.remove(id);
        if signal.is_empty() {
            self.signals.remove(kind);
        }
        removed
    }

    pub fn signal(&self, kind: &PointerEventType) -> Option<&Signal<Hit>> {
        self.signals.get(kind)
    }

    pub fn handles(&self, kind: &PointerEventType) -> bool {
        self.signals.get(kind).is_some_and(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
