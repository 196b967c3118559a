use std::io::Write;
use std::sync::Mutex;
use std::sync::PoisonError;

use dieroll_core::haptics::HapticError;
use dieroll_core::haptics::HapticFeedback;
use dieroll_core::haptics::HapticOptions;
use dieroll_core::haptics::ImpactStyle;

const BEL: &[u8] = b"\x07";

/// Haptic service for a terminal: the closest thing to a buzz is the bell.
pub(crate) struct TerminalHaptics<W: Write + Send> {
    out: Mutex<W>,
    enabled: bool,
}

impl<W: Write + Send> TerminalHaptics<W> {
    /// `enabled` mirrors the `haptics.enabled` config switch and plays the
    /// role of the OS-level haptics setting.
    pub(crate) fn new(out: W, enabled: bool) -> Self {
        Self {
            out: Mutex::new(out),
            enabled,
        }
    }
}

fn bell_count(style: ImpactStyle) -> usize {
    match style {
        ImpactStyle::NotificationWarning => 2,
        ImpactStyle::NotificationError => 3,
        _ => 1,
    }
}

impl<W: Write + Send> HapticFeedback for TerminalHaptics<W> {
    fn trigger(&self, style: ImpactStyle, options: HapticOptions) -> Result<(), HapticError> {
        if !self.enabled && !options.ignore_system_settings {
            return Err(HapticError::Disabled);
        }
        // There is no haptic engine here, only the vibrate-style fallback.
        if !options.enable_vibrate_fallback {
            return Err(HapticError::Unsupported);
        }
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(&BEL.repeat(bell_count(style)))?;
        out.flush()?;
        Ok(())
    }
}
