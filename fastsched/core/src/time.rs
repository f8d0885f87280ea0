//! Microsecond time and the polled periodic-timeout primitive

use core::fmt;

/// Wrap-safe stamp of the host's monotonic microsecond clock.
///
/// The clock is a free-running `u32` that wraps about every 71.6 minutes;
/// all comparisons go through [`Micros::elapsed_since`] so that wraparound
/// is handled by the arithmetic rather than by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Micros(u32);

impl Micros {
    /// Zero stamp
    pub const ZERO: Self = Self(0);

    /// Create a stamp from a raw clock reading
    pub const fn new(us: u32) -> Self {
        Self(us)
    }

    /// Get the raw clock reading
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Microseconds elapsed since an earlier stamp (wrap-safe)
    pub const fn elapsed_since(self, earlier: Micros) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// The stamp `us` microseconds after this one (wrap-safe)
    pub const fn advanced_by(self, us: u32) -> Self {
        Self(self.0.wrapping_add(us))
    }
}

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Micros {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}us", self.0);
    }
}

/// Polled periodic timeout with auto-rearm.
///
/// The boolean query [`PeriodicUs::expired`] answers "has the period
/// elapsed since the last firing?" and, when it has, rearms for the next
/// period. A period of zero is the always-expired sentinel used by
/// one-shot items: every query answers true without touching state.
///
/// Rearming advances the phase by whole multiples of the period, so a
/// long gap between polls yields a single firing rather than a burst of
/// catch-up firings.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicUs {
    period: u32,
    last: Micros,
}

impl PeriodicUs {
    /// The always-expired sentinel: every poll fires.
    pub const fn always_expired() -> Self {
        Self {
            period: 0,
            last: Micros::ZERO,
        }
    }

    /// A timeout that first fires once `period_us` has elapsed past `now`.
    pub const fn new(period_us: u32, now: Micros) -> Self {
        Self {
            period: period_us,
            last: now,
        }
    }

    /// Rearm with a new period, phase-anchored at `now`.
    pub fn reset(&mut self, period_us: u32, now: Micros) {
        self.period = period_us;
        self.last = now;
    }

    /// The configured period; zero for the always-expired sentinel.
    pub const fn period_us(&self) -> u32 {
        self.period
    }

    /// Poll the timeout against the current clock, rearming on expiry.
    pub fn expired(&mut self, now: Micros) -> bool {
        if self.period == 0 {
            return true;
        }
        let elapsed = now.elapsed_since(self.last);
        if elapsed < self.period {
            return false;
        }
        let missed = elapsed / self.period;
        self.last = self.last.advanced_by(missed.wrapping_mul(self.period));
        true
    }
}

impl Default for PeriodicUs {
    fn default() -> Self {
        Self::always_expired()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PeriodicUs {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "PeriodicUs{{period: {}us}}", self.period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_wrap_safe() {
        let before = Micros::new(u32::MAX - 10);
        let after = before.advanced_by(30);
        assert_eq!(after.elapsed_since(before), 30);
    }

    #[test]
    fn always_expired_fires_on_every_poll() {
        let mut timeout = PeriodicUs::always_expired();
        assert!(timeout.expired(Micros::ZERO));
        assert!(timeout.expired(Micros::ZERO));
        assert!(timeout.expired(Micros::new(12345)));
    }

    #[test]
    fn periodic_throttles_until_elapsed() {
        let mut timeout = PeriodicUs::new(1000, Micros::ZERO);
        assert!(!timeout.expired(Micros::new(500)));
        assert!(timeout.expired(Micros::new(1100)));
        // rearmed at phase 1000; not due again before 2000
        assert!(!timeout.expired(Micros::new(1900)));
        assert!(timeout.expired(Micros::new(2500)));
    }

    #[test]
    fn long_gap_fires_once_not_in_a_burst() {
        let mut timeout = PeriodicUs::new(1000, Micros::ZERO);
        assert!(timeout.expired(Micros::new(5500)));
        // phase caught up to 5000; the next poll inside the window is quiet
        assert!(!timeout.expired(Micros::new(5600)));
        assert!(timeout.expired(Micros::new(6000)));
    }

    #[test]
    fn periodic_survives_clock_wraparound() {
        let start = Micros::new(u32::MAX - 100);
        let mut timeout = PeriodicUs::new(1000, start);
        assert!(!timeout.expired(start.advanced_by(500)));
        assert!(timeout.expired(start.advanced_by(1001)));
    }

    #[test]
    fn reset_rearms_from_now() {
        let mut timeout = PeriodicUs::always_expired();
        timeout.reset(2000, Micros::new(1_000_000));
        assert_eq!(timeout.period_us(), 2000);
        assert!(!timeout.expired(Micros::new(1_001_000)));
        assert!(timeout.expired(Micros::new(1_002_000)));
    }
}
