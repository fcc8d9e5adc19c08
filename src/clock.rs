//! Process-global modification clock.
//!
//! Every mutable entity in the pipeline (node configuration, data object)
//! stamps itself with a tick from this clock on mutation. Ticks are totally
//! ordered; comparing ticks is the sole staleness signal used by the
//! executive's caches.

use std::sync::atomic::{AtomicU64, Ordering};

/// A modification timestamp. Tick 0 is reserved for "never modified".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ModTick(pub u64);

impl ModTick {
    /// The "never modified" tick, older than any tick the clock hands out.
    pub const NONE: ModTick = ModTick(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl std::fmt::Debug for ModTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "ModTick(NONE)")
        } else {
            write!(f, "ModTick({})", self.0)
        }
    }
}

static CLOCK: AtomicU64 = AtomicU64::new(1);

/// Return the next tick. Strictly increasing across the whole process;
/// safe to call from multiple threads.
#[inline]
pub fn next_tick() -> ModTick {
    ModTick(CLOCK.fetch_add(1, Ordering::Relaxed))
}
