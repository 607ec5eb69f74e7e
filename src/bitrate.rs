//! Target-size bitrate planning.
//!
//! The size budget is split between a fixed 128 kbps audio track and the video
//! stream; the video stream gets whatever is left, but never less than
//! 100 kbps. With a tiny target or a long clip the floor wins and the encode
//! overshoots the requested size; `BitratePlan::overshoots_target` reports that.

use crate::constants::{
    AUDIO_BITRATE_KBPS, AUDIO_BITS_PER_SECOND, BITS_PER_MEGABYTE, MIN_VIDEO_BITRATE_KBPS,
};
use crate::error::{CompressionError, Result};

/// Unclamped video bitrate in kbps. Can be negative.
fn raw_bitrate_kbps(duration_s: f64, target_mb: f64) -> f64 {
    let target_bits = target_mb * BITS_PER_MEGABYTE;
    let audio_bits = AUDIO_BITS_PER_SECOND * duration_s;
    ((target_bits - audio_bits) / duration_s / 1000.0).floor()
}

/// Video bitrate in kbps for a clip of `duration_s` seconds to fit `target_mb`.
///
/// ```
/// use media_squeeze::bitrate::bitrate_kbps;
///
/// assert_eq!(bitrate_kbps(120.0, 50.0), 3367);
/// assert_eq!(bitrate_kbps(3600.0, 1.0), 100);
/// ```
pub fn bitrate_kbps(duration_s: f64, target_mb: f64) -> u32 {
    let raw = raw_bitrate_kbps(duration_s, target_mb);
    if raw.is_nan() || raw < MIN_VIDEO_BITRATE_KBPS as f64 {
        return MIN_VIDEO_BITRATE_KBPS;
    }
    // `as` saturates at u32::MAX for absurd inputs.
    raw as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitratePlan {
    pub duration_s: f64,
    pub target_mb: f64,
    pub video_kbps: u32,
    pub audio_kbps: u32,
    pub raw_video_kbps: f64,
}

impl BitratePlan {
    pub fn new(duration_s: f64, target_mb: f64) -> Result<Self> {
        if !duration_s.is_finite() || duration_s <= 0.0 {
            return Err(CompressionError::InvalidTarget(format!(
                "duration must be a positive number of seconds, got {}",
                duration_s
            )));
        }
        if !target_mb.is_finite() || target_mb <= 0.0 {
            return Err(CompressionError::InvalidTarget(format!(
                "target size must be a positive number of MB, got {}",
                target_mb
            )));
        }

        Ok(Self {
            duration_s,
            target_mb,
            video_kbps: bitrate_kbps(duration_s, target_mb),
            audio_kbps: AUDIO_BITRATE_KBPS,
            raw_video_kbps: raw_bitrate_kbps(duration_s, target_mb),
        })
    }

    /// True when the 100 kbps floor was applied.
    pub fn overshoots_target(&self) -> bool {
        self.raw_video_kbps < self.video_kbps as f64
    }

    /// Expected output size in bytes, ignoring container overhead.
    pub fn estimated_bytes(&self) -> u64 {
        let total_kbps = self.video_kbps as f64 + self.audio_kbps as f64;
        (total_kbps * 1000.0 * self.duration_s / 8.0) as u64
    }

    pub fn target_bytes(&self) -> u64 {
        (self.target_mb * 1024.0 * 1024.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_value() {
        // 50 MB = 419,430,400 bits; minus 15,360,000 audio bits over 120 s.
        assert_eq!(bitrate_kbps(120.0, 50.0), 3367);
    }

    #[test]
    fn test_floor_applies_when_audio_exceeds_budget() {
        // 1 MB over an hour cannot even hold the audio track.
        assert_eq!(bitrate_kbps(3600.0, 1.0), MIN_VIDEO_BITRATE_KBPS);
    }

    #[test]
    fn test_degenerate_inputs_floor_rather_than_panic() {
        assert_eq!(bitrate_kbps(0.0, 50.0), u32::MAX);
        assert_eq!(bitrate_kbps(f64::NAN, 50.0), MIN_VIDEO_BITRATE_KBPS);
        assert_eq!(bitrate_kbps(60.0, 0.0), MIN_VIDEO_BITRATE_KBPS);
    }

    #[test]
    fn test_plan_reports_overshoot() {
        let plan = BitratePlan::new(3600.0, 1.0).unwrap();
        assert_eq!(plan.video_kbps, 100);
        assert_eq!(plan.audio_kbps, 128);
        assert!(plan.overshoots_target());
        assert!(plan.estimated_bytes() > plan.target_bytes());

        let plan = BitratePlan::new(120.0, 50.0).unwrap();
        assert!(!plan.overshoots_target());
        assert!(plan.estimated_bytes() <= plan.target_bytes());
    }

    #[test]
    fn test_plan_rejects_non_positive_inputs() {
        assert!(matches!(
            BitratePlan::new(0.0, 50.0),
            Err(CompressionError::InvalidTarget(_))
        ));
        assert!(matches!(
            BitratePlan::new(120.0, -1.0),
            Err(CompressionError::InvalidTarget(_))
        ));
        assert!(matches!(
            BitratePlan::new(f64::INFINITY, 50.0),
            Err(CompressionError::InvalidTarget(_))
        ));
    }
}
