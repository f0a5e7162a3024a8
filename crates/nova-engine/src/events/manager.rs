use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use anyhow::Result;

use crate::coords::Viewport;
use crate::gfx::{Intersection, NodeHandle, SharedRenderer};
use crate::input::{PointerEvent, PointerEventType, RawPointerEvent};
use crate::signal::HandlerId;
use crate::world::{Stage, World};

use super::Events;

/// What a receiver's handler gets: the canonical event and the winning hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub event: PointerEvent,
    pub intersection: Intersection,
}

#[derive(Default)]
struct Receiver {
    events: Events,
    penetrated: bool,
}

/// Ray-cast dispatcher of one world.
///
/// Receivers are the current top-level members of the world's scene, re-read
/// from the renderer on every event. Handlers and the penetration flag are
/// attached per node through this manager; scene membership itself is only
/// ever changed by the renderer's owner.
pub struct EventManager {
    world: Weak<World>,
    renderer: SharedRenderer,
    viewport: Rc<Cell<Viewport>>,
    normal_events: Rc<[PointerEventType]>,
    gesture_events: Rc<[PointerEventType]>,

    enabled: Cell<bool>,
    deep: Cell<bool>,
    receivers: RefCell<HashMap<NodeHandle, Receiver>>,
}

impl EventManager {
    pub(crate) fn new(world: Weak<World>, stage: &Stage) -> Self {
        Self {
            world,
            renderer: stage.renderer().clone(),
            viewport: stage.live_viewport(),
            normal_events: stage.normal_events(),
            gesture_events: stage.gesture_events(),
            enabled: Cell::new(true),
            deep: Cell::new(true),
            receivers: RefCell::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Whether the cast also tests descendants of the receivers. On by default.
    #[inline]
    pub fn is_deep(&self) -> bool {
        self.deep.get()
    }

    pub fn set_deep(&self, deep: bool) {
        self.deep.set(deep);
    }

    /// Registers `handler` for `kind` events hitting `node`.
    ///
    /// Entries outlive the node's scene membership: call [`forget`](Self::forget)
    /// when a node is removed for good, or [`prune_detached`](Self::prune_detached)
    /// after removing several.
    pub fn on<F>(&self, node: NodeHandle, kind: impl Into<PointerEventType>, handler: F) -> HandlerId
    where
        F: FnMut(&Hit) -> Result<()> + 'static,
    {
        self.receivers
            .borrow_mut()
            .entry(node)
            .or_default()
            .events
            .on(kind.into(), handler)
    }

    pub fn off(&self, node: NodeHandle, kind: &PointerEventType, id: HandlerId) -> bool {
        self.receivers
            .borrow_mut()
            .get_mut(&node)
            .is_some_and(|r| r.events.off(kind, id))
    }

    /// Drops every handler and flag attached to `node`.
    pub fn forget(&self, node: NodeHandle) {
        self.receivers.borrow_mut().remove(&node);
    }

    /// Drops the entries of nodes that are no longer top-level members of the
    /// world's scene. Returns how many were dropped.
    pub fn prune_detached(&self) -> usize {
        let Some(world) = self.world.upgrade() else {
            return 0;
        };
        let live = self.renderer.borrow().scene_children(world.scene());

        let mut receivers = self.receivers.borrow_mut();
        let before = receivers.len();
        receivers.retain(|node, _| live.contains(node));
        let dropped = before - receivers.len();
        if dropped > 0 {
            log::debug!("pruned {dropped} detached receivers");
        }
        dropped
    }

    /// A penetrated node is transparent to picking: the cast continues to the
    /// next hit behind it.
    pub fn set_penetrated(&self, node: NodeHandle, penetrated: bool) {
        self.receivers.borrow_mut().entry(node).or_default().penetrated = penetrated;
    }

    pub fn is_penetrated(&self, node: NodeHandle) -> bool {
        self.receivers.borrow().get(&node).is_some_and(|r| r.penetrated)
    }

    /// Primitive event path. Events not in the configured list are ignored.
    pub fn handle_raw(&self, raw: &RawPointerEvent) -> Result<bool> {
        if !self.normal_events.contains(&raw.kind) {
            return Ok(false);
        }
        self.dispatch(&PointerEvent::from_raw(raw))
    }

    /// Gesture event path. Events not in the configured list are ignored.
    pub fn handle_gesture(&self, event: &PointerEvent) -> Result<bool> {
        if !self.gesture_events.contains(&event.kind) {
            return Ok(false);
        }
        self.dispatch(event)
    }

    /// Ray-casts `event` into the world and returns the nearest hit that is
    /// not penetrated.
    ///
    /// Returns `None` when disabled, when the world is gone, when the viewport
    /// has no area, or when nothing pickable is under the pointer.
    pub fn pick(&self, event: &PointerEvent) -> Option<Intersection> {
        if !self.enabled.get() {
            return None;
        }

        let world = self.world.upgrade()?;
        let viewport = self.viewport.get();
        if !viewport.is_valid() {
            return None;
        }

        let ndc = viewport.to_ndc(event.center);
        let camera = world.camera().borrow().handle();

        let hits = {
            let renderer = self.renderer.borrow();
            let candidates = renderer.scene_children(world.scene());
            if candidates.is_empty() {
                return None;
            }
            renderer.raycast(camera, ndc, &candidates, self.deep.get())
        };

        let receivers = self.receivers.borrow();
        hits.into_iter()
            .find(|hit| !receivers.get(&hit.node).is_some_and(|r| r.penetrated))
    }

    /// Picks and notifies the winning node's handlers for `event.kind`.
    ///
    /// Returns whether any handler ran. Only the winner is notified; handler
    /// errors are returned unchanged.
    pub fn dispatch(&self, event: &PointerEvent) -> Result<bool> {
        let Some(intersection) = self.pick(event) else {
            return Ok(false);
        };

        let signal = self
            .receivers
            .borrow()
            .get(&intersection.node)
            .and_then(|r| r.events.signal(&event.kind))
            .cloned();

        let Some(signal) = signal else {
            return Ok(false);
        };

        log::debug!("{} hit node {}", event.kind, intersection.node.raw());

        signal.run(&Hit { event: event.clone(), intersection })?;
        Ok(true)
    }
}
