// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// H.264 encoder defaults
pub mod encoder {
    /// GStreamer element used for H.264 encoding
    pub const ELEMENT: &str = "x264enc";

    /// Target bitrate in bits per second
    pub const BITRATE_BPS: u32 = 500_000;

    /// Frames per second the stream is timestamped at
    pub const FRAMERATE: u32 = 30;

    /// Highest frame rate accepted on the command line
    pub const MAX_FRAMERATE: u32 = 1000;

    /// Accepted bitrate range in bits per second (x264enc takes kbit/s)
    pub const MIN_BITRATE_BPS: u32 = 1000;
    pub const MAX_BITRATE_BPS: u32 = 2_000_000_000;

    /// Maximum consecutive B-frames between references
    pub const MAX_B_FRAMES: u32 = 2;

    /// Quantizer ceiling (bounds the worst-case quality loss)
    pub const QP_MAX: u32 = 55;

    /// x264 speed preset
    pub const SPEED_PRESET: &str = "ultrafast";

    /// x264 tuning flags
    pub const TUNE: &str = "zerolatency";

    /// H.264 profile advertised in the output caps
    pub const PROFILE: &str = "main";

    /// Keyframe interval for a given frame rate (half a second of frames)
    pub fn gop_size(framerate: u32) -> u32 {
        (framerate / 2).max(1)
    }
}

/// Camera pipeline constants
pub mod camera {
    /// Default GStreamer source element (PipeWire picks the default camera)
    pub const DEFAULT_SOURCE: &str = "pipewiresrc";

    /// Raw format requested from the camera branch of the pipeline
    pub const NATIVE_FORMAT: &str = "RGB";

    /// Name of the appsink element frames are pulled from
    pub const SINK_NAME: &str = "sink";
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// How long the preview waits for a key press per iteration
    pub const KEY_POLL_TIMEOUT: Duration = Duration::from_millis(33);

    /// Window in which a freshly started pipeline may report an error
    pub const START_ERROR_WINDOW_MS: u64 = 500;

    /// Upper bound for one drain pull once end-of-stream was sent
    pub const DRAIN_PULL_TIMEOUT_SECS: u64 = 5;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;
}

/// Number of leading packet bytes printed in the per-packet diagnostic
pub const PACKET_DUMP_BYTES: usize = 7;

/// Process exit codes for each failure site
pub mod exit_code {
    pub const SUCCESS: u8 = 0;
    /// Missing arguments and any uncategorised runtime failure
    pub const FAILURE: u8 = 1;
    pub const OUTPUT_OPEN: u8 = 2;
    pub const ENCODER_NOT_FOUND: u8 = 3;
    pub const ENCODER_ALLOCATION: u8 = 4;
    pub const ENCODER_OPEN: u8 = 5;
    pub const CONVERTER: u8 = 6;
}
