//! The scheduled-item record

use alloc::boxed::Box;

use fastsched_core::{PeriodicUs, SchedulePolicy};

/// Owning, type-erased work callable.
///
/// Returns `true` to stay scheduled for the next drain, `false` to be
/// dropped after this run. Whatever state the callable needs, it owns by
/// capture; the scheduler neither copies nor extends the lifetime of
/// user data.
pub type ScheduledFn = Box<dyn FnMut() -> bool + Send>;

/// Optional early-wake predicate attached to a recurrent item.
///
/// When present and returning `true`, the item fires regardless of how
/// much of its interval remains. Typically polls a flag set from an ISR.
pub type AlarmFn = Box<dyn FnMut() -> bool + Send>;

/// One enqueued work unit: the callable plus its gates.
pub(crate) struct ScheduledItem {
    pub(crate) func: ScheduledFn,
    /// Interval throttle; the always-expired sentinel for one-shots.
    pub(crate) call_now: PeriodicUs,
    pub(crate) policy: SchedulePolicy,
    pub(crate) alarm: Option<AlarmFn>,
}
