//! Time conversion and display utilities.
//!
//! Media positions arrive as floating-point seconds from the audio resource.
//! This module provides saturating conversions to whole seconds and the
//! `m:ss` clock format used by the player.

/// Upper bound used when saturating seconds into a `u64`.
const MAX_WHOLE_SECS: f64 = 18_446_744_073_709_549_568.0;

/// Extension trait for media positions expressed as `f64` seconds.
pub trait SecondsExt {
    /// Whole seconds, floored.
    ///
    /// NaN, infinities and negative values map to 0; values beyond `u64::MAX`
    /// saturate.
    fn whole_secs(&self) -> u64;

    /// Format as `m:ss` (minutes are not wrapped into hours).
    fn clock_display(&self) -> String;
}

impl SecondsExt for f64 {
    fn whole_secs(&self) -> u64 {
        if !self.is_finite() || *self <= 0.0 {
            return 0;
        }
        if *self >= MAX_WHOLE_SECS {
            return u64::MAX;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let secs = self.floor() as u64;
        secs
    }

    fn clock_display(&self) -> String {
        let total = self.whole_secs();
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Sanitize a position reported by the resource: non-finite or negative
/// values become 0.
#[must_use]
pub fn sanitize_secs(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        0.0
    }
}
