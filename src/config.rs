// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{camera, encoder};
use std::path::PathBuf;

/// Encoder parameters for one recording session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// GStreamer encoder element (e.g., "x264enc")
    pub element: String,
    /// Target bitrate in bits per second
    pub bitrate_bps: u32,
    /// Frame rate the stream is timestamped at
    pub framerate: u32,
    /// Frames between keyframes
    pub gop_size: u32,
    /// Maximum consecutive B-frames
    pub max_b_frames: u32,
    /// Quantizer ceiling
    pub qp_max: u32,
    /// Speed preset name
    pub speed_preset: String,
    /// Tuning flags
    pub tune: String,
    /// H.264 profile
    pub profile: String,
}

impl EncoderSettings {
    /// Settings for a frame rate, with the GOP following it
    pub fn with_framerate(mut self, framerate: u32) -> Self {
        self.framerate = framerate.max(1);
        self.gop_size = encoder::gop_size(self.framerate);
        self
    }

    pub fn with_bitrate(mut self, bitrate_bps: u32) -> Self {
        self.bitrate_bps = bitrate_bps;
        self
    }

    /// Bitrate rounded to the kbit/s unit x264enc expects
    pub fn bitrate_kbps(&self) -> u32 {
        (self.bitrate_bps / 1000).max(1)
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            element: encoder::ELEMENT.to_string(),
            bitrate_bps: encoder::BITRATE_BPS,
            framerate: encoder::FRAMERATE,
            gop_size: encoder::gop_size(encoder::FRAMERATE),
            max_b_frames: encoder::MAX_B_FRAMES,
            qp_max: encoder::QP_MAX,
            speed_preset: encoder::SPEED_PRESET.to_string(),
            tune: encoder::TUNE.to_string(),
            profile: encoder::PROFILE.to_string(),
        }
    }
}

/// Everything a recording run needs, assembled from the command line
#[derive(Debug, Clone)]
pub struct RecordConfig {
    /// Output elementary stream path
    pub output: PathBuf,
    /// GStreamer source fragment feeding the camera branch
    pub source: String,
    /// Render the terminal preview (headless otherwise)
    pub preview: bool,
    /// Stop after this many submitted frames
    pub max_frames: Option<u64>,
    pub encoder: EncoderSettings,
}

impl RecordConfig {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            source: camera::DEFAULT_SOURCE.to_string(),
            preview: true,
            max_frames: None,
            encoder: EncoderSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoder_settings() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.bitrate_bps, 500_000);
        assert_eq!(settings.framerate, 30);
        assert_eq!(settings.gop_size, 15);
        assert_eq!(settings.max_b_frames, 2);
        assert_eq!(settings.qp_max, 55);
        assert_eq!(settings.bitrate_kbps(), 500);
    }

    #[test]
    fn test_gop_follows_framerate() {
        let settings = EncoderSettings::default().with_framerate(60);
        assert_eq!(settings.gop_size, 30);

        // A single frame per second still yields a usable GOP
        let settings = EncoderSettings::default().with_framerate(1);
        assert_eq!(settings.gop_size, 1);
    }
}
