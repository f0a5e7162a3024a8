use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;

use super::LoopKey;

/// Shared, identity-comparable loop callback.
///
/// Register the same `LoopCallback` through [`LoopManager::add_callback`] to be
/// able to remove it later by value with [`LoopManager::remove_callback`].
pub type LoopCallback = Rc<RefCell<dyn FnMut() -> Result<()>>>;

/// Wraps a closure into a [`LoopCallback`].
pub fn callback<F>(f: F) -> LoopCallback
where
    F: FnMut() -> Result<()> + 'static,
{
    Rc::new(RefCell::new(f))
}

/// Ordered set of zero-argument callbacks invoked once per accepted tick.
///
/// Every call to [`update`](Self::update) advances `tick_count`, enabled or
/// not. Callbacks run only when the manager is enabled and
/// `tick_count % tick_divisor == 0` (tested before the increment), so the
/// first update always fires and a divisor of `n` fires on ticks
/// `0, n, 2n, …`. Disabling and re-enabling keeps that alignment.
///
/// All methods take `&self`: a callback may add or remove entries of the
/// manager that is running it. `update` works on a snapshot, so such changes
/// apply from the next update on.
pub struct LoopManager {
    enabled: Cell<bool>,
    tick_divisor: Cell<u32>,
    tick_count: Cell<u64>,
    entries: RefCell<Vec<(LoopKey, LoopCallback)>>,
}

impl LoopManager {
    pub fn new() -> Self {
        Self::with_divisor(1)
    }

    /// Creates a manager that fires on every `divisor`-th update.
    ///
    /// A divisor of `0` is treated as `1`.
    pub fn with_divisor(divisor: u32) -> Self {
        Self {
            enabled: Cell::new(true),
            tick_divisor: Cell::new(divisor.max(1)),
            tick_count: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    #[inline]
    pub fn tick_divisor(&self) -> u32 {
        self.tick_divisor.get()
    }

    pub fn set_tick_divisor(&self, divisor: u32) {
        self.tick_divisor.set(divisor.max(1));
    }

    /// Number of `update` calls so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.get()
    }

    /// Registers `f` under a freshly generated key and returns that key.
    pub fn add<F>(&self, f: F) -> LoopKey
    where
        F: FnMut() -> Result<()> + 'static,
    {
        self.add_callback(callback(f), None)
    }

    /// Registers `f` under `key`.
    ///
    /// If `key` is already present, its callback is replaced and keeps its
    /// position in the invocation order.
    pub fn add_with_key<F>(&self, key: impl Into<LoopKey>, f: F) -> LoopKey
    where
        F: FnMut() -> Result<()> + 'static,
    {
        self.add_callback(callback(f), Some(key.into()))
    }

    /// Registers an existing callback, generating a key when none is given.
    pub fn add_callback(&self, cb: LoopCallback, key: Option<LoopKey>) -> LoopKey {
        let key = key.unwrap_or_else(LoopKey::generate);
        let mut entries = self.entries.borrow_mut();

        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = cb,
            None => entries.push((key.clone(), cb)),
        }

        key
    }

    /// Removes the entry stored under `key`. Returns `false` if there was none.
    pub fn remove(&self, key: &LoopKey) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(k, _)| k == key) {
            Some(i) => {
                entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Removes the first entry (in invocation order) holding `cb`.
    ///
    /// The same callback may be registered under several keys; only the first
    /// match is removed.
    pub fn remove_callback(&self, cb: &LoopCallback) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(_, c)| Rc::ptr_eq(c, cb)) {
            Some(i) => {
                entries.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn remove_all(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn contains(&self, key: &LoopKey) -> bool {
        self.entries.borrow().iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Keys in invocation order.
    pub fn keys(&self) -> Vec<LoopKey> {
        self.entries.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Runs one tick. Returns whether the callbacks were invoked.
    ///
    /// The first callback error aborts the remaining callbacks of this tick and
    /// is returned as-is.
    pub fn update(&self) -> Result<bool> {
        let count = self.tick_count.get();
        self.tick_count.set(count.wrapping_add(1));

        if !self.enabled.get() || count % u64::from(self.tick_divisor.get()) != 0 {
            return Ok(false);
        }

        let snapshot: Vec<LoopCallback> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();

        for cb in snapshot {
            (&mut *cb.borrow_mut())()?;
        }

        Ok(true)
    }
}

impl Default for LoopManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() -> Result<()> + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move || {
            h.set(h.get() + 1);
            Ok(())
        })
    }

    #[test]
    fn divisor_fires_on_multiples_only() {
        let lm = LoopManager::with_divisor(3);
        let fired: Vec<bool> = (0..7).map(|_| lm.update().unwrap()).collect();
        assert_eq!(fired, [true, false, false, true, false, false, true]);
        assert_eq!(lm.tick_count(), 7);
    }

    #[test]
    fn disabling_keeps_modulo_alignment() {
        let lm = LoopManager::with_divisor(2);
        let (hits, f) = counter();
        lm.add(f);

        lm.update().unwrap(); // tick 0 fires
        lm.set_enabled(false);
        lm.update().unwrap(); // tick 1
        lm.update().unwrap(); // tick 2 would fire, but disabled
        lm.set_enabled(true);
        assert!(!lm.update().unwrap()); // tick 3
        assert!(lm.update().unwrap()); // tick 4
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn zero_divisor_is_clamped() {
        let lm = LoopManager::with_divisor(0);
        assert_eq!(lm.tick_divisor(), 1);
        lm.set_tick_divisor(0);
        assert_eq!(lm.tick_divisor(), 1);
    }

    #[test]
    fn generated_key_removes_exactly_once() {
        let lm = LoopManager::new();
        let (_, f) = counter();
        let key = lm.add(f);
        assert!(key.is_generated());
        assert!(lm.remove(&key));
        assert!(!lm.remove(&key));
        assert!(lm.is_empty());
    }

    #[test]
    fn callbacks_run_in_insertion_order() {
        let lm = LoopManager::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let o = order.clone();
            lm.add(move || {
                o.borrow_mut().push(i);
                Ok(())
            });
        }
        lm.update().unwrap();
        assert_eq!(*order.borrow(), [0, 1, 2]);
    }

    #[test]
    fn reusing_a_key_replaces_in_place() {
        let lm = LoopManager::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let push = |tag: &'static str| {
            let o = order.clone();
            move || {
                o.borrow_mut().push(tag);
                Ok(())
            }
        };
        lm.add_with_key("a", push("a1"));
        lm.add_with_key("b", push("b"));
        lm.add_with_key("a", push("a2"));
        assert_eq!(lm.len(), 2);
        lm.update().unwrap();
        assert_eq!(*order.borrow(), ["a2", "b"]);
    }

    #[test]
    fn remove_by_callback_takes_first_match_only() {
        let lm = LoopManager::new();
        let (hits, f) = counter();
        let cb = callback(f);
        lm.add_callback(cb.clone(), Some("first".into()));
        lm.add_callback(cb.clone(), Some("second".into()));

        assert!(lm.remove_callback(&cb));
        assert_eq!(lm.keys(), [LoopKey::from("second")]);
        lm.update().unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn error_aborts_rest_of_tick() {
        let lm = LoopManager::new();
        let (hits, f) = counter();
        lm.add(|| anyhow::bail!("boom"));
        lm.add(f);

        let err = lm.update().unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn removal_inside_callback_applies_next_tick() {
        let lm = Rc::new(LoopManager::new());
        let (hits, f) = counter();
        let victim = lm.add(f);

        let lm2 = lm.clone();
        lm.add_with_key("remover", move || {
            lm2.remove(&victim);
            Ok(())
        });

        lm.update().unwrap();
        lm.update().unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(lm.len(), 1);
    }
}
