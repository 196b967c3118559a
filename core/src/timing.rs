use std::time::Duration;

use crate::rotation::SpinAnimation;

/// Total length of a roll, measured from the tap.
pub const DEFAULT_ROLL_DURATION: Duration = Duration::from_millis(1_200);
/// Period of the face shuffle while rolling.
pub const DEFAULT_SHUFFLE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_SPIN_CYCLES: u32 = 4;
/// Length of one full turn of the spin.
pub const DEFAULT_SPIN_CYCLE: Duration = Duration::from_millis(200);
/// How often the spin publishes a new rotation value (~60 fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Timing of one roll. The spin is cosmetic; only `duration` decides when the
/// roll settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollTiming {
    pub duration: Duration,
    pub shuffle_interval: Duration,
    pub spin_cycles: u32,
    pub spin_cycle: Duration,
    pub frame_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTiming {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("spin_cycles must be at least 1")]
    NoSpinCycles,
}

impl Default for RollTiming {
    fn default() -> Self {
        Self {
            duration: DEFAULT_ROLL_DURATION,
            shuffle_interval: DEFAULT_SHUFFLE_INTERVAL,
            spin_cycles: DEFAULT_SPIN_CYCLES,
            spin_cycle: DEFAULT_SPIN_CYCLE,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl RollTiming {
    pub fn validate(&self) -> Result<(), InvalidTiming> {
        for (name, value) in [
            ("duration_ms", self.duration),
            ("shuffle_interval_ms", self.shuffle_interval),
            ("spin_cycle_ms", self.spin_cycle),
            ("frame_interval_ms", self.frame_interval),
        ] {
            if value.is_zero() {
                return Err(InvalidTiming::ZeroDuration(name));
            }
        }
        if self.spin_cycles == 0 {
            return Err(InvalidTiming::NoSpinCycles);
        }
        Ok(())
    }

    pub fn spin(&self) -> SpinAnimation {
        SpinAnimation::new(self.spin_cycles, self.spin_cycle)
    }

    /// Time between the spin coming to rest and the roll settling. Zero when
    /// the spin is still running at the deadline.
    pub fn settle_margin(&self) -> Duration {
        self.duration.saturating_sub(self.spin().total_duration())
    }
}
