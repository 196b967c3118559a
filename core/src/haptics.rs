//! Device haptic service seam.
//!
//! The roll asks for a pulse and never looks at the answer beyond logging it:
//! an unsupported device or a user who turned haptics off must not change how
//! a roll plays out.

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;
use strum_macros::EnumIter;

/// Named intensity category for a haptic pulse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ImpactStyle {
    Selection,
    ImpactLight,
    ImpactMedium,
    #[default]
    ImpactHeavy,
    Rigid,
    Soft,
    NotificationSuccess,
    NotificationWarning,
    NotificationError,
}

/// Per-request knobs forwarded to the haptic service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticOptions {
    /// Fall back to a plain vibration when the device has no haptic engine.
    pub enable_vibrate_fallback: bool,
    /// Fire even if the user disabled haptics at the OS level.
    pub ignore_system_settings: bool,
}

impl Default for HapticOptions {
    fn default() -> Self {
        Self {
            enable_vibrate_fallback: true,
            ignore_system_settings: false,
        }
    }
}

/// One pulse request: what to play and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HapticRequest {
    pub style: ImpactStyle,
    pub options: HapticOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum HapticError {
    #[error("haptic feedback is not supported on this device")]
    Unsupported,

    #[error("haptic feedback is disabled by system settings")]
    Disabled,

    #[error("failed to deliver haptic pulse: {0}")]
    Io(#[from] std::io::Error),
}

pub trait HapticFeedback: Send + Sync {
    fn trigger(&self, style: ImpactStyle, options: HapticOptions) -> Result<(), HapticError>;
}

/// Haptic service for hosts without any output channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHaptics;

impl HapticFeedback for NoopHaptics {
    fn trigger(&self, _style: ImpactStyle, _options: HapticOptions) -> Result<(), HapticError> {
        Ok(())
    }
}

/// Fire-and-forget pulse. Failures are logged at debug level and dropped.
pub fn pulse(haptics: &dyn HapticFeedback, request: HapticRequest) {
    if let Err(err) = haptics.trigger(request.style, request.options) {
        tracing::debug!("haptic pulse {} skipped: {err}", request.style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    struct Unsupported;

    impl HapticFeedback for Unsupported {
        fn trigger(&self, _: ImpactStyle, _: HapticOptions) -> Result<(), HapticError> {
            Err(HapticError::Unsupported)
        }
    }

    #[test]
    fn default_request_is_heavy_with_fallback() {
        let request = HapticRequest::default();
        assert_eq!(request.style, ImpactStyle::ImpactHeavy);
        assert!(request.options.enable_vibrate_fallback);
        assert!(!request.options.ignore_system_settings);
    }

    #[test]
    fn style_names_match_config_spelling() {
        assert_eq!(ImpactStyle::ImpactHeavy.to_string(), "impact-heavy");
        assert_eq!(ImpactStyle::NotificationWarning.to_string(), "notification-warning");
        assert_eq!(ImpactStyle::iter().count(), 9);
    }

    #[test]
    fn pulse_swallows_failures() {
        pulse(&Unsupported, HapticRequest::default());
    }
}
