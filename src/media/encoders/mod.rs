// SPDX-License-Identifier: MPL-2.0

//! H.264 encoder abstraction
//!
//! The capture-encode loop drives an encoder through a single call that
//! optionally takes a frame and returns at most one compressed packet:
//!
//! - `encode(Some(frame))` submits a frame and returns a packet if one is ready
//! - `encode(None)` drains buffered output; `Ok(None)` means fully drained

pub mod detection;
pub mod x264;

pub use detection::{detect_h264_encoders, is_element_available};
pub use x264::{GstEncoderProvider, X264Encoder};

use crate::config::EncoderSettings;
use crate::constants::PACKET_DUMP_BYTES;
use crate::errors::{EncodeError, EncoderError};
use crate::media::yuv_frame::YuvFrame;

/// One compressed access unit in Annex-B byte-stream format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    pub data: Vec<u8>,
    /// Presentation timestamp in nanoseconds, if the encoder set one
    pub pts: Option<u64>,
    /// Whether the packet starts with a keyframe
    pub keyframe: bool,
}

impl EncodedPacket {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            pts: None,
            keyframe: false,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Hex dump of the leading bytes ("00 00 00 01 67 42 c0")
    pub fn head_hex(&self) -> String {
        self.data
            .iter()
            .take(PACKET_DUMP_BYTES)
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An open encoder session at a fixed resolution
pub trait VideoEncoder {
    /// Element or codec name, for logging
    fn name(&self) -> &str;

    /// Submit a frame (or `None` to drain) and collect at most one packet
    fn encode(&mut self, frame: Option<&YuvFrame>) -> Result<Option<EncodedPacket>, EncodeError>;
}

/// Opens encoder sessions
pub trait EncoderProvider {
    /// Find, allocate and open an encoder for `width`x`height`
    fn open(
        &self,
        settings: &EncoderSettings,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn VideoEncoder>, EncoderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_hex_takes_seven_bytes() {
        let packet = EncodedPacket::new(vec![0, 0, 0, 1, 0x67, 0x42, 0xc0, 0x1e, 0xff]);
        assert_eq!(packet.head_hex(), "00 00 00 01 67 42 c0");
    }

    #[test]
    fn test_head_hex_of_short_packet() {
        let packet = EncodedPacket::new(vec![0xab, 0x01]);
        assert_eq!(packet.head_hex(), "ab 01");
        assert_eq!(packet.len(), 2);
    }
}
