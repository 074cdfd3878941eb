// SPDX-License-Identifier: MPL-2.0

//! Preview surfaces for the recorder
//!
//! The preview is cosmetic: it shows frames, reports packets and is polled
//! once per loop iteration for the stop request. Rendering failures never
//! stop a recording.

pub mod headless;
pub mod terminal;

pub use headless::HeadlessPreview;
pub use terminal::TerminalPreview;

use crate::backends::camera::types::CameraFrame;
use crate::errors::PreviewError;
use crate::media::encoders::EncodedPacket;
use std::fmt;
use std::path::Path;

/// Recording parameters announced once the encoder is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo<'a> {
    pub output: &'a Path,
    pub encoder: &'a str,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl fmt::Display for SessionInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "outfile: {}", self.output.display())?;
        writeln!(f, "vcodec:  {}", self.encoder)?;
        writeln!(f, "size:    {}x{}", self.width, self.height)?;
        write!(f, "fps:     {}", self.fps)
    }
}

/// Display surface polled by the capture-encode loop
pub trait Preview {
    /// Called once before the first frame is shown
    fn recording_started(&mut self, _info: &SessionInfo<'_>) {}

    /// Show a camera frame
    fn show(&mut self, frame: &CameraFrame) -> Result<(), PreviewError>;

    /// Poll for a stop request; may block for a short timeout
    fn poll_stop(&mut self) -> bool;

    /// Called after packet number `index` (0-based) reached the output
    fn packet_written(&mut self, _index: u64, _packet: &EncodedPacket) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_banner() {
        let info = SessionInfo {
            output: Path::new("out.h264"),
            encoder: "x264enc",
            width: 640,
            height: 480,
            fps: 30,
        };
        assert_eq!(
            info.to_string(),
            "outfile: out.h264\nvcodec:  x264enc\nsize:    640x480\nfps:     30"
        );
    }
}
