//! The at-most-one-drain fence
//!
//! A process-wide boolean guard: whoever wins the acquire owns the drain,
//! everyone else returns immediately. Two realizations, selected by the
//! `isr-fence` cargo feature:
//!
//! - default: a native atomic exchange, which on multi-core targets also
//!   excludes a drain on another core;
//! - `isr-fence`: a load/store pair inside an interrupt-masked
//!   `critical_section::with`, for cores whose ISRs share the consumer's
//!   stack but which lack an atomic exchange.
//!
//! Only the drain touches the fence. The submission path is the only
//! ISR-reachable surface and it never interacts with the fence, so
//! masking interrupts around the acquire cannot deadlock a producer.

use core::sync::atomic::{AtomicBool, Ordering};

pub(crate) struct Fence {
    taken: AtomicBool,
}

impl Fence {
    pub(crate) const fn new() -> Self {
        Self {
            taken: AtomicBool::new(false),
        }
    }

    /// True when the caller won the race and now owns the drain.
    #[cfg(not(feature = "isr-fence"))]
    pub(crate) fn try_acquire(&self) -> bool {
        !self.taken.swap(true, Ordering::AcqRel)
    }

    /// True when the caller won the race and now owns the drain.
    #[cfg(feature = "isr-fence")]
    pub(crate) fn try_acquire(&self) -> bool {
        critical_section::with(|_| {
            if self.taken.load(Ordering::Relaxed) {
                false
            } else {
                self.taken.store(true, Ordering::Relaxed);
                true
            }
        })
    }

    pub(crate) fn release(&self) {
        self.taken.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_loses_until_release() {
        let fence = Fence::new();
        assert!(fence.try_acquire());
        assert!(!fence.try_acquire());
        fence.release();
        assert!(fence.try_acquire());
    }
}
