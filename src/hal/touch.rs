//! Touch source contract

use crate::touch::TouchSample;

/// Calibrated, debounced touch panel
///
/// The source owns raw ADC polling and calibration. It must not accept a
/// new raw sample sooner than [`TOUCH_DEBOUNCE_MS`] after the previous one;
/// between accepted samples it keeps reporting the last one.
pub trait TouchSource {
    /// Current touch state, sampled at most once per tick
    fn sample(&mut self, now_ms: u64) -> TouchSample;
}

/// Minimum spacing between accepted raw samples
pub const TOUCH_DEBOUNCE_MS: u64 = 50;
