//! Host platform contract consumed by the executor

use crate::Micros;

/// Services the host firmware supplies to the scheduler.
///
/// The executor needs exactly two things from its environment: a
/// monotonic microsecond clock and the cooperative yield primitive it
/// calls during long drains. Implementations on real hardware forward to
/// the platform's `micros()`/`yield()`; test suites implement the trait
/// with a manually advanced clock.
///
/// `yield_now` may re-enter the executor (the host yield path usually
/// drains the schedule queue itself); the executor's fence makes such
/// re-entry a no-op.
pub trait Platform {
    /// Current value of the monotonic microsecond clock.
    fn micros(&self) -> Micros;

    /// Give the rest of the firmware a chance to run.
    fn yield_now(&self);
}
