// SPDX-License-Identifier: MPL-2.0

//! PipeWire camera backend
//!
//! Captures the default PipeWire camera through a GStreamer pipeline that
//! ends in an appsink. The source element can be swapped for any other
//! GStreamer source (v4l2src, videotestsrc, ...).

mod pipeline;

pub use pipeline::PipeWireCamera;

/// Check whether the PipeWire source element is installed
pub fn is_pipewire_available() -> bool {
    if gstreamer::init().is_err() {
        return false;
    }

    gstreamer::ElementFactory::find("pipewiresrc").is_some()
}
