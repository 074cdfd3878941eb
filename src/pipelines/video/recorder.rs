// SPDX-License-Identifier: MPL-2.0

//! Capture-encode loop
//!
//! Drives frames from the camera to the output file with no queueing:
//! one frame is acquired, shown, converted and submitted per iteration, and
//! the encoder is asked for at most one packet per iteration. After a stop
//! request the loop keeps calling the encoder without input until it has
//! nothing left.

use super::sink::OutputSink;
use crate::backends::camera::CameraSource;
use crate::backends::camera::types::{FrameLayout, PixelFormat};
use crate::config::EncoderSettings;
use crate::constants::timing;
use crate::errors::{RecordError, RecordResult};
use crate::media::converter::{ConverterProvider, CpuConverterProvider};
use crate::media::encoders::EncoderProvider;
use crate::media::yuv_frame::YuvFrame;
use crate::preview::{Preview, SessionInfo};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Whether new frames are still being fed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Recording,
    Draining,
}

/// Why the loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The preview reported a stop request; the encoder was drained
    Cancelled,
    /// The configured frame limit was reached; the encoder was drained
    FrameLimit,
    /// Converting, encoding or writing failed; output up to that point is kept
    Failed(String),
}

/// Outcome of a completed recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub encoder: String,
    pub width: u32,
    pub height: u32,
    /// Frames handed to the encoder
    pub frames_submitted: u64,
    pub packets_written: u64,
    pub bytes_written: u64,
    pub stop_reason: StopReason,
}

/// One recording run wired to its collaborators
pub struct CaptureSession<'a> {
    camera: &'a mut dyn CameraSource,
    encoders: &'a dyn EncoderProvider,
    converters: &'a dyn ConverterProvider,
    preview: &'a mut dyn Preview,
    settings: EncoderSettings,
    max_frames: Option<u64>,
}

impl<'a> CaptureSession<'a> {
    pub fn new(
        camera: &'a mut dyn CameraSource,
        encoders: &'a dyn EncoderProvider,
        preview: &'a mut dyn Preview,
        settings: EncoderSettings,
    ) -> Self {
        Self {
            camera,
            encoders,
            converters: &CpuConverterProvider,
            preview,
            settings,
            max_frames: None,
        }
    }

    /// Use a different pixel converter implementation
    pub fn with_converters(mut self, converters: &'a dyn ConverterProvider) -> Self {
        self.converters = converters;
        self
    }

    /// Stop (and drain) after this many submitted frames
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Record to `output` until stopped
    ///
    /// The camera is started before the output file is created, so a camera
    /// that fails to start leaves no file behind.
    pub fn run(&mut self, output: &Path) -> RecordResult<RecordSummary> {
        self.camera.start()?;
        let result = self.record(output);
        self.camera.stop();
        result
    }

    fn record(&mut self, output: &Path) -> RecordResult<RecordSummary> {
        let mut sink = OutputSink::create(output)?;

        // The first frame only tells us the resolution
        let first = self.camera.wait_for_frame()?;
        let (width, height) = (first.width, first.height);

        let mut encoder = self.encoders.open(&self.settings, width, height)?;
        let mut converter = self
            .converters
            .create(
                first.layout(),
                FrameLayout::new(PixelFormat::I420, width, height),
            )
            .map_err(RecordError::Converter)?;
        drop(first);

        info!(
            output = %output.display(),
            encoder = encoder.name(),
            width,
            height,
            fps = self.settings.framerate,
            "Recording started"
        );

        self.preview.recording_started(&SessionInfo {
            output,
            encoder: encoder.name(),
            width,
            height,
            fps: self.settings.framerate,
        });

        let mut encoder_frame = YuvFrame::new(width, height);
        let mut state = StreamState::Recording;
        let mut stop_reason = StopReason::Cancelled;
        let mut frame_pts: i64 = 0;

        loop {
            let frame = self.camera.wait_for_frame()?;

            if state == StreamState::Recording {
                if let Err(e) = self.preview.show(&frame) {
                    debug!(error = %e, "Preview failed");
                }

                if self.preview.poll_stop() {
                    info!(frames = frame_pts, "Stop requested, draining encoder");
                    state = StreamState::Draining;
                } else if self
                    .max_frames
                    .is_some_and(|max| frame_pts as u64 >= max)
                {
                    info!(frames = frame_pts, "Frame limit reached, draining encoder");
                    state = StreamState::Draining;
                    stop_reason = StopReason::FrameLimit;
                }
            }

            if state == StreamState::Recording {
                if let Err(e) = converter.convert(&frame, &mut encoder_frame) {
                    error!(error = %e, frame = frame_pts, "Failed to convert frame");
                    stop_reason = StopReason::Failed(e.to_string());
                    break;
                }
                encoder_frame.pts = frame_pts;
                frame_pts += 1;
            }
            drop(frame);

            // Called every iteration, even while recording
            let input = (state == StreamState::Recording).then_some(&encoder_frame);
            let got_packet = match encoder.encode(input) {
                Ok(Some(packet)) => {
                    let index = sink.packets_written();
                    if let Err(e) = sink.write_packet(&packet) {
                        error!(error = %e, packet = index, "Failed to write packet");
                        stop_reason =
                            StopReason::Failed(format!("Failed to write output: {}", e));
                        break;
                    }
                    self.preview.packet_written(index, &packet);
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    error!(error = %e, frame = frame_pts, "Failed to encode frame");
                    stop_reason = StopReason::Failed(e.to_string());
                    break;
                }
            };

            if got_packet && sink.packets_written() % timing::FRAME_LOG_INTERVAL == 0 {
                debug!(
                    frames = frame_pts,
                    packets = sink.packets_written(),
                    bytes = sink.bytes_written(),
                    "Recording progress"
                );
            }

            if state == StreamState::Draining && !got_packet {
                break;
            }
        }

        let summary = RecordSummary {
            encoder: encoder.name().to_string(),
            width,
            height,
            frames_submitted: frame_pts as u64,
            packets_written: sink.packets_written(),
            bytes_written: sink.bytes_written(),
            stop_reason,
        };

        drop(converter);
        drop(encoder);
        match sink.finish() {
            Ok(()) => {}
            // The loop already failed on output; keep its reason
            Err(e) if matches!(summary.stop_reason, StopReason::Failed(_)) => {
                warn!(error = %e, "Failed to close output after an earlier failure");
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            frames = summary.frames_submitted,
            packets = summary.packets_written,
            bytes = summary.bytes_written,
            reason = ?summary.stop_reason,
            "Recording finished"
        );
        Ok(summary)
    }
}
