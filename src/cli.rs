// SPDX-License-Identifier: GPL-3.0-only

//! Command-line operations
//!
//! - Listing the installed H.264 encoders
//! - Recording the camera to a file

use camera_record::backends::camera::pipewire::is_pipewire_available;
use camera_record::constants::{camera, exit_code};
use camera_record::media::encoders::detect_h264_encoders;
use camera_record::preview::{HeadlessPreview, Preview, TerminalPreview};
use camera_record::{
    CaptureSession, GstEncoderProvider, PipeWireCamera, RecordConfig, RecordSummary, StopReason,
};
use std::process::ExitCode;
use tracing::{info, warn};

/// Print the H.264 encoders GStreamer can find
pub fn list_encoders() -> ExitCode {
    let encoders = detect_h264_encoders();

    if encoders.is_empty() {
        println!("No H.264 encoders found.");
        return ExitCode::from(exit_code::ENCODER_NOT_FOUND);
    }

    println!("Available H.264 encoders:");
    for (element, name) in encoders {
        println!("  {:<14} {}", element, name);
    }

    ExitCode::SUCCESS
}

/// Record until the preview stops the session
pub fn record(config: RecordConfig) -> ExitCode {
    if config.source == camera::DEFAULT_SOURCE && !is_pipewire_available() {
        warn!("pipewiresrc is not installed; pass --source to use another GStreamer source");
    }

    let mut camera = PipeWireCamera::new(config.source.as_str());
    let mut preview = open_preview(config.preview);

    let result = CaptureSession::new(
        &mut camera,
        &GstEncoderProvider,
        preview.as_mut(),
        config.encoder,
    )
    .with_max_frames(config.max_frames)
    .run(&config.output);

    // Restore the terminal before reporting
    drop(preview);

    match result {
        Ok(summary) => {
            report(&summary);
            ExitCode::from(exit_code::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn open_preview(terminal: bool) -> Box<dyn Preview> {
    if terminal {
        match TerminalPreview::new() {
            Ok(preview) => return Box::new(preview),
            Err(e) => warn!(error = %e, "Terminal preview unavailable, recording headless"),
        }
    }

    match HeadlessPreview::new() {
        Ok(preview) => Box::new(preview),
        Err(e) => {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            Box::new(HeadlessPreview::with_flag(Default::default()))
        }
    }
}

fn report(summary: &RecordSummary) {
    if let StopReason::Failed(reason) = &summary.stop_reason {
        eprintln!("Recording stopped early: {}", reason);
    }

    info!(
        encoder = %summary.encoder,
        width = summary.width,
        height = summary.height,
        bytes = summary.bytes_written,
        "Recording saved"
    );
    println!("{} frames encoded", summary.packets_written);
}
