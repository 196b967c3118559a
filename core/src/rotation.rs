use std::time::Duration;

/// Maps rotation progress onto an angle in degrees, one unit per full turn.
///
/// Progress keeps growing across cycles, so the angle wraps from just under
/// 360 back to 0 at the exact point where the die looks the same. Driving the
/// progress back to zero every cycle would instead show a visible snap-back.
pub fn rotation_degrees(progress: f64) -> f64 {
    if !progress.is_finite() {
        return 0.0;
    }
    progress.rem_euclid(1.0) * 360.0
}

/// Linear spin of a fixed number of full turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinAnimation {
    cycles: u32,
    cycle: Duration,
}

impl SpinAnimation {
    pub fn new(cycles: u32, cycle: Duration) -> Self {
        Self { cycles, cycle }
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Time taken by all cycles back to back.
    pub fn total_duration(&self) -> Duration {
        self.cycle.saturating_mul(self.cycles)
    }

    /// Progress reached `elapsed` after the spin started, capped at `cycles`.
    pub fn progress_at(&self, elapsed: Duration) -> f64 {
        let end = f64::from(self.cycles);
        if self.is_finished_at(elapsed) {
            return end;
        }
        (elapsed.as_secs_f64() / self.cycle.as_secs_f64()).min(end)
    }

    pub fn is_finished_at(&self, elapsed: Duration) -> bool {
        elapsed >= self.total_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn angle_is_linear_within_a_turn() {
        assert_close(rotation_degrees(0.0), 0.0);
        assert_close(rotation_degrees(0.25), 90.0);
        assert_close(rotation_degrees(0.5), 180.0);
    }

    #[test]
    fn angle_is_continuous_across_cycle_boundaries() {
        let before = rotation_degrees(1.999_999);
        let after = rotation_degrees(2.000_001);
        // Both sides sit next to the 0/360 seam rather than jumping back
        // through the whole circle.
        assert!(before > 359.99, "before = {before}");
        assert!(after < 0.01, "after = {after}");
        assert_close(rotation_degrees(3.25), 90.0);
    }

    #[test]
    fn non_finite_progress_renders_upright() {
        assert_close(rotation_degrees(f64::NAN), 0.0);
        assert_close(rotation_degrees(f64::INFINITY), 0.0);
    }

    #[test]
    fn spin_progress_is_linear_and_capped() {
        let spin = SpinAnimation::new(4, Duration::from_millis(200));
        assert_eq!(spin.total_duration(), Duration::from_millis(800));
        assert_close(spin.progress_at(Duration::ZERO), 0.0);
        assert_close(spin.progress_at(Duration::from_millis(100)), 0.5);
        assert_close(spin.progress_at(Duration::from_millis(650)), 3.25);
        assert_close(spin.progress_at(Duration::from_millis(1_200)), 4.0);
        assert!(!spin.is_finished_at(Duration::from_millis(799)));
        assert!(spin.is_finished_at(Duration::from_millis(800)));
    }
}
