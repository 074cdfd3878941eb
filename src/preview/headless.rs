// SPDX-License-Identifier: MPL-2.0

//! Preview without rendering: Ctrl+C stops, diagnostics go to stdout

use super::{Preview, SessionInfo};
use crate::backends::camera::types::CameraFrame;
use crate::errors::PreviewError;
use crate::media::encoders::EncodedPacket;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

pub struct HeadlessPreview {
    stop_flag: Arc<AtomicBool>,
}

impl HeadlessPreview {
    /// Install the Ctrl+C handler that requests the stop
    ///
    /// The handler only raises a flag; the loop sees it at its next poll.
    pub fn new() -> Result<Self, ctrlc::Error> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let handler_flag = stop_flag.clone();
        ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        })?;
        info!("Headless preview: press Ctrl+C to stop recording");
        Ok(Self { stop_flag })
    }

    /// Build around an existing flag (no signal handler)
    pub fn with_flag(stop_flag: Arc<AtomicBool>) -> Self {
        Self { stop_flag }
    }
}

impl Preview for HeadlessPreview {
    fn recording_started(&mut self, info: &SessionInfo<'_>) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", info);
    }

    fn show(&mut self, _frame: &CameraFrame) -> Result<(), PreviewError> {
        Ok(())
    }

    fn poll_stop(&mut self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    fn packet_written(&mut self, index: u64, packet: &EncodedPacket) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{} {}", index, packet.head_hex());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_requests_stop() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut preview = HeadlessPreview::with_flag(flag.clone());
        assert!(!preview.poll_stop());
        flag.store(true, Ordering::SeqCst);
        assert!(preview.poll_stop());
    }
}
