//! The scheduler executor: submission API, per-item gating, and the drain

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use alloc::boxed::Box;

use fastsched_core::{Micros, PeriodicUs, Platform, SchedError, SchedResult, SchedulePolicy};
use fastsched_queue::MpScheduleQueue;

use crate::fence::Fence;
use crate::item::{AlarmFn, ScheduledItem};

/// Default compile-time capacity of the schedule queue.
pub const SCHEDULED_FN_MAX_COUNT: usize = 32;

/// Wall time between the internal yields a long drain performs, so the
/// rest of the firmware is not starved while the queue is worked off.
pub const YIELD_INTERVAL_US: u32 = 10_000;

/// Cooperative recurrent-function scheduler.
///
/// Const-constructible so the host can place it in a `static` and share
/// it freely: every method takes `&self`. Submissions are ISR-safe;
/// the drain runs only on the cooperative main-loop stack.
///
/// `N` is the queue capacity and must be a power of two.
///
/// Multi-core note: the queue is single-consumer, so all drains must be
/// routed through one core. The default atomic fence turns a stray drain
/// from a second core into a silent no-op, but that is a safety net, not
/// a supported topology.
pub struct Scheduler<P: Platform, const N: usize = SCHEDULED_FN_MAX_COUNT> {
    platform: P,
    queue: MpScheduleQueue<ScheduledItem, N>,
    fence: Fence,
    /// Context tag of the drain in progress; written under the fence,
    /// read only from within the fenced region.
    active_policy: AtomicU8,
    /// Clock stamp of the last internal yield.
    yield_stamp: AtomicU32,
}

impl<P: Platform, const N: usize> Scheduler<P, N> {
    /// Create a scheduler driven by the given platform.
    pub const fn new(platform: P) -> Self {
        Self {
            platform,
            queue: MpScheduleQueue::new(),
            fence: Fence::new(),
            active_policy: AtomicU8::new(SchedulePolicy::FromLoop.raw()),
            yield_stamp: AtomicU32::new(0),
        }
    }

    /// Enqueue a one-shot callable.
    ///
    /// Runs at most once, on the first drain whose context the policy
    /// permits. Callable from any context, including ISRs; never blocks.
    pub fn schedule_function<F>(&self, func: F, policy: SchedulePolicy) -> SchedResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut func = Some(func);
        self.schedule_recurrent_function_us(
            move || {
                if let Some(func) = func.take() {
                    func();
                }
                false
            },
            0,
            None,
            policy,
        )
    }

    /// Enqueue a recurrent callable.
    ///
    /// `repeat_us` is the interval throttle: zero makes the item eligible
    /// on every pass, a non-zero value makes it eligible once per elapsed
    /// interval. The optional `alarm` predicate forces an early firing
    /// when it returns true, bypassing the throttle. The callable stays
    /// scheduled while it returns true and is dropped when it returns
    /// false. Callable from any context, including ISRs; never blocks.
    pub fn schedule_recurrent_function_us<F>(
        &self,
        func: F,
        repeat_us: u32,
        alarm: Option<AlarmFn>,
        policy: SchedulePolicy,
    ) -> SchedResult<()>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let mut call_now = PeriodicUs::always_expired();
        if repeat_us > 0 {
            call_now.reset(repeat_us, self.platform.micros());
        }
        let item = ScheduledItem {
            func: Box::new(func),
            call_now,
            policy,
            alarm,
        };
        self.queue.push(item).map_err(|_| SchedError::QueueFull)
    }

    /// Drain the schedule queue once.
    ///
    /// Visits each item enqueued before the drain began exactly once and
    /// applies the gating algorithm; items submitted mid-drain wait for
    /// the next drain. Re-entry — from the host yield path or from user
    /// code inside a scheduled callable — is a silent no-op.
    ///
    /// There is no API to remove a scheduled item: items leave the queue
    /// only from this drain, which never runs on an ISR stack.
    pub fn run_scheduled_functions(&self, policy: SchedulePolicy) {
        if !self.fence.try_acquire() {
            return;
        }
        self.active_policy.store(policy.raw(), Ordering::Relaxed);
        self.yield_stamp
            .store(self.platform.micros().raw(), Ordering::Relaxed);
        self.queue.for_each_requeue(|item| self.visit(item));
        self.fence.release();
    }

    /// Main-loop entry point: run the user loop body once, then drain.
    pub fn run_loop_iteration<F: FnOnce()>(&self, user_loop: F) {
        user_loop();
        self.run_scheduled_functions(SchedulePolicy::FromLoop);
    }

    /// Yield-path entry point: perform the platform yield, then drain
    /// the items whose policy permits running outside the main loop.
    pub fn run_yield(&self) {
        self.platform.yield_now();
        self.run_scheduled_functions(SchedulePolicy::WithoutYieldDelayCalls);
    }

    /// Number of items currently scheduled
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Gating algorithm for one visited item; the return value decides
    /// whether the item stays queued.
    fn visit(&self, item: &mut ScheduledItem) -> bool {
        self.maintain_yield();

        // Deferred: a loop-only item while draining from the yield path.
        if !item.policy.runs_during_yield() && self.active() != SchedulePolicy::FromLoop {
            return true;
        }

        // Alarm first, then the periodic check. Both are always
        // evaluated, so the throttle rearms even on an alarm-driven pass.
        let wakeup = item.alarm.as_mut().is_some_and(|alarm| alarm());
        let call_now = item.call_now.expired(self.platform.micros());
        if !(wakeup || call_now) {
            return true;
        }
        (item.func)()
    }

    /// Yield to the rest of the firmware roughly every 10 ms of drain
    /// wall time.
    fn maintain_yield(&self) {
        let now = self.platform.micros();
        let stamp = Micros::new(self.yield_stamp.load(Ordering::Relaxed));
        if now.elapsed_since(stamp) > YIELD_INTERVAL_US {
            self.platform.yield_now();
            self.yield_stamp
                .store(self.platform.micros().raw(), Ordering::Relaxed);
        }
    }

    fn active(&self) -> SchedulePolicy {
        SchedulePolicy::from_raw(self.active_policy.load(Ordering::Relaxed))
    }
}

#[cfg(feature = "defmt")]
impl<P: Platform, const N: usize> defmt::Format for Scheduler<P, N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Scheduler{{pending: {}/{}}}", self.pending(), N);
    }
}
