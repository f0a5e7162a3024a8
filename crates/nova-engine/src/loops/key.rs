use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATED: AtomicU64 = AtomicU64::new(1);

/// Identifies one entry of a [`LoopManager`](super::LoopManager).
///
/// Generated keys come from a process-wide counter and never collide with each
/// other; named keys are chosen by the caller.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum LoopKey {
    Generated(u64),
    Named(String),
}

impl LoopKey {
    /// Returns a fresh key that no other call has returned.
    pub fn generate() -> Self {
        LoopKey::Generated(NEXT_GENERATED.fetch_add(1, Ordering::Relaxed))
    }

    pub fn named(name: impl Into<String>) -> Self {
        LoopKey::Named(name.into())
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        matches!(self, LoopKey::Generated(_))
    }
}

impl From<&str> for LoopKey {
    fn from(name: &str) -> Self {
        LoopKey::Named(name.to_string())
    }
}

impl From<String> for LoopKey {
    fn from(name: String) -> Self {
        LoopKey::Named(name)
    }
}

impl fmt::Display for LoopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopKey::Generated(id) => write!(f, "#{id}"),
            LoopKey::Named(name) => f.write_str(name),
        }
    }
}
