use dieroll_core::RollOutcome;
use dieroll_core::RollState;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AppEvent {
    /// The user tapped the roll button.
    Roll,

    /// Request to exit the application gracefully.
    ExitRequest,

    /// Snapshot published by the sequencer after any change.
    RollStateChanged(RollState),

    /// A roll reached its deadline and committed this face.
    RollSettled(RollOutcome),
}
