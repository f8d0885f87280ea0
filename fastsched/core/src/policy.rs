//! Execution-policy tags for scheduled items

/// Per-item declaration of the contexts in which the item may run.
///
/// The executor is driven from two places in the host firmware: after
/// each main-loop iteration, and from inside the host yield path on
/// platforms that hook it. The policy tag gates which of those contexts
/// is allowed to invoke the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SchedulePolicy {
    /// Run only when the executor is driven from the main loop.
    #[default]
    FromLoop = 0,
    /// Run from the main loop or from inside the host yield path.
    WithoutYieldDelayCalls = 1,
}

impl SchedulePolicy {
    /// Whether an item with this policy may run when the executor was
    /// entered through the host yield path.
    pub const fn runs_during_yield(self) -> bool {
        matches!(self, Self::WithoutYieldDelayCalls)
    }

    /// Raw tag value, for storage in an atomic cell.
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Reconstruct a policy from its raw tag value.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::FromLoop,
            _ => Self::WithoutYieldDelayCalls,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SchedulePolicy {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::FromLoop => defmt::write!(fmt, "FromLoop"),
            Self::WithoutYieldDelayCalls => defmt::write!(fmt, "WithoutYieldDelayCalls"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_from_loop() {
        assert_eq!(SchedulePolicy::default(), SchedulePolicy::FromLoop);
        assert!(!SchedulePolicy::FromLoop.runs_during_yield());
        assert!(SchedulePolicy::WithoutYieldDelayCalls.runs_during_yield());
    }

    #[test]
    fn raw_round_trip() {
        for policy in [
            SchedulePolicy::FromLoop,
            SchedulePolicy::WithoutYieldDelayCalls,
        ] {
            assert_eq!(SchedulePolicy::from_raw(policy.raw()), policy);
        }
    }
}
