use strum_macros::Display;

use crate::face::FaceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RollPhase {
    #[default]
    Idle,
    Rolling,
}

/// Everything the presentation layer needs to draw the die.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollState {
    pub current_face: FaceId,
    /// Spin driver; one unit is one full turn.
    pub rotation_progress: f64,
    pub phase: RollPhase,
    /// Id of the most recently started roll, 0 before the first one.
    pub roll_id: u64,
}

impl RollState {
    pub fn with_face(current_face: FaceId) -> Self {
        Self {
            current_face,
            rotation_progress: 0.0,
            phase: RollPhase::Idle,
            roll_id: 0,
        }
    }

    pub fn is_rolling(&self) -> bool {
        self.phase == RollPhase::Rolling
    }

    /// True while `roll_id` is the roll that owns this state.
    pub(crate) fn is_owned_by(&self, roll_id: u64) -> bool {
        self.roll_id == roll_id && self.is_rolling()
    }
}

impl Default for RollState {
    fn default() -> Self {
        Self::with_face(FaceId::default())
    }
}

/// Authoritative result of a roll that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOutcome {
    pub roll_id: u64,
    pub face: FaceId,
}
