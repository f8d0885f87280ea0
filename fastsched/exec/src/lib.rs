#![no_std]
#![forbid(unsafe_code)]

//! # FastSched Executor
//!
//! The scheduler executor: a multi-producer / single-consumer queue of
//! scheduled callables, drained cooperatively on the main-loop stack.
//!
//! Other subsystems — application code, driver callbacks, ISRs — submit
//! one-shot or recurrent callables through [`Scheduler::schedule_function`]
//! and [`Scheduler::schedule_recurrent_function_us`]. The host drives
//! [`Scheduler::run_scheduled_functions`] after each main-loop iteration
//! and, on platforms that hook it, from inside the yield path. Each drain
//! visits every queued item once, applies the per-item gates (execution
//! policy, periodic interval, optional alarm), invokes the callable when
//! it fires, and keeps or drops it according to the callable's return
//! value.
//!
//! A process-wide fence makes the drain non-reentrant: user code inside a
//! scheduled callable may yield, and the yield path may call back into
//! the executor, without recursing.

extern crate alloc;

mod fence;
mod item;
mod scheduler;

pub use fastsched_core::{
    Micros, PeriodicUs, Platform, SchedError, SchedResult, SchedulePolicy, VERSION,
};
pub use item::{AlarmFn, ScheduledFn};
pub use scheduler::{Scheduler, SCHEDULED_FN_MAX_COUNT, YIELD_INTERVAL_US};
