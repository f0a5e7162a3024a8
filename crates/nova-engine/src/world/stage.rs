use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::coords::Viewport;
use crate::events::EventManager;
use crate::gfx::SharedRenderer;
use crate::input::PointerEventType;

/// Everything the worlds of one app share.
///
/// Cloning a stage clones handles: every clone sees the same renderer, the same
/// live viewport and the same set of event managers.
#[derive(Clone)]
pub struct Stage {
    renderer: SharedRenderer,
    viewport: Rc<Cell<Viewport>>,
    normal_events: Rc<[PointerEventType]>,
    gesture_events: Rc<[PointerEventType]>,
    managers: Rc<RefCell<Vec<Weak<EventManager>>>>,
}

impl Stage {
    pub fn new(
        renderer: SharedRenderer,
        viewport: Viewport,
        normal_events: Vec<PointerEventType>,
        gesture_events: Vec<PointerEventType>,
    ) -> Self {
        Self {
            renderer,
            viewport: Rc::new(Cell::new(viewport)),
            normal_events: normal_events.into(),
            gesture_events: gesture_events.into(),
            managers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    #[inline]
    pub fn renderer(&self) -> &SharedRenderer {
        &self.renderer
    }

    /// Viewport size in logical pixels as of the last resize.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    pub(crate) fn live_viewport(&self) -> Rc<Cell<Viewport>> {
        self.viewport.clone()
    }

    pub fn normal_events(&self) -> Rc<[PointerEventType]> {
        self.normal_events.clone()
    }

    pub fn gesture_events(&self) -> Rc<[PointerEventType]> {
        self.gesture_events.clone()
    }

    pub(crate) fn register(&self, manager: &Rc<EventManager>) {
        self.managers.borrow_mut().push(Rc::downgrade(manager));
    }

    /// Event managers of every live world on this stage, in creation order.
    pub fn event_managers(&self) -> Vec<Rc<EventManager>> {
        let mut managers = self.managers.borrow_mut();
        managers.retain(|m| m.strong_count() > 0);
        managers.iter().filter_map(Weak::upgrade).collect()
    }
}
