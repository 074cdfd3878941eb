// SPDX-License-Identifier: MPL-2.0

//! GStreamer bus helpers shared by the camera and encoder pipelines

use gstreamer::prelude::*;
use tracing::{error, warn};

/// Pop the first error on the pipeline bus within `timeout_ms`
///
/// Warnings seen on the way are logged and skipped.
pub fn first_error(pipeline: &gstreamer::Pipeline, timeout_ms: u64) -> Option<String> {
    let bus = pipeline.bus()?;

    while let Some(msg) = bus.timed_pop_filtered(
        gstreamer::ClockTime::from_mseconds(timeout_ms),
        &[
            gstreamer::MessageType::Error,
            gstreamer::MessageType::Warning,
        ],
    ) {
        match msg.view() {
            gstreamer::MessageView::Error(err) => {
                error!(
                    error = %err.error(),
                    debug = ?err.debug(),
                    source = ?err.src().map(|s| s.name()),
                    "GStreamer error"
                );
                return Some(err.error().to_string());
            }
            gstreamer::MessageView::Warning(warn_msg) => {
                warn!(
                    warning = %warn_msg.error(),
                    debug = ?warn_msg.debug(),
                    source = ?warn_msg.src().map(|s| s.name()),
                    "GStreamer warning"
                );
            }
            _ => {}
        }
    }

    None
}

/// Set the pipeline to NULL so GStreamer releases devices and buffers
pub fn shutdown(pipeline: &gstreamer::Pipeline) {
    if let Err(e) = pipeline.set_state(gstreamer::State::Null) {
        warn!(error = %e, "Failed to set pipeline to NULL");
    }
}
