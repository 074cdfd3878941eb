// SPDX-License-Identifier: MPL-2.0

//! GStreamer pipeline for camera capture

use super::super::types::*;
use super::super::{CameraResult, CameraSource};
use crate::constants::{camera, timing};
use crate::errors::CameraError;
use crate::media::bus;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use tracing::{debug, info, warn};

/// Camera session backed by `<source> ! videoconvert ! RGB ! appsink`
///
/// Frames are pulled synchronously from the appsink; the appsink keeps a
/// single buffer so the recorder always sees the most recent frame.
pub struct PipeWireCamera {
    source: String,
    pipeline: Option<gstreamer::Pipeline>,
    appsink: Option<AppSink>,
    sequence: u64,
}

impl PipeWireCamera {
    /// Create a camera for the given GStreamer source fragment
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pipeline: None,
            appsink: None,
            sequence: 0,
        }
    }

    /// Full pipeline description for this camera
    pub fn pipeline_description(&self) -> String {
        format!(
            "{} ! videoconvert ! video/x-raw,format={} ! appsink name={} sync=false max-buffers=1 drop=true enable-last-sample=false",
            self.source,
            camera::NATIVE_FORMAT,
            camera::SINK_NAME
        )
    }

    fn launch(&self) -> CameraResult<(gstreamer::Pipeline, AppSink)> {
        let description = self.pipeline_description();
        info!(pipeline = %description, "Launching camera pipeline");

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| CameraError::new("parse_launch", &description, e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                CameraError::new("parse_launch", &description, "Result is not a pipeline")
            })?;

        let appsink = pipeline
            .by_name(camera::SINK_NAME)
            .ok_or_else(|| CameraError::new("by_name", camera::SINK_NAME, "Appsink not found"))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| {
                CameraError::new("dynamic_cast", camera::SINK_NAME, "Element is not an appsink")
            })?;

        Ok((pipeline, appsink))
    }
}

impl CameraSource for PipeWireCamera {
    fn start(&mut self) -> CameraResult<()> {
        gstreamer::init().map_err(|e| CameraError::new("gst_init", "", e.to_string()))?;

        let (pipeline, appsink) = self.launch()?;

        if let Err(e) = pipeline.set_state(gstreamer::State::Playing) {
            let message = bus::first_error(&pipeline, timing::START_ERROR_WINDOW_MS)
                .unwrap_or_else(|| e.to_string());
            bus::shutdown(&pipeline);
            return Err(CameraError::new("set_state", "Playing", message));
        }

        // Missing devices usually surface as a bus error right after start
        if let Some(message) = bus::first_error(&pipeline, timing::START_ERROR_WINDOW_MS) {
            bus::shutdown(&pipeline);
            return Err(CameraError::new("start", &self.source, message));
        }

        info!(source = %self.source, "Camera streaming");
        self.pipeline = Some(pipeline);
        self.appsink = Some(appsink);
        Ok(())
    }

    fn wait_for_frame(&mut self) -> CameraResult<CameraFrame> {
        let (Some(pipeline), Some(appsink)) = (&self.pipeline, &self.appsink) else {
            return Err(CameraError::new(
                "wait_for_frame",
                "",
                "Camera was not started",
            ));
        };

        let sample = appsink.pull_sample().map_err(|_| {
            let message = bus::first_error(pipeline, 0)
                .unwrap_or_else(|| "Camera stream ended".to_string());
            CameraError::new("pull_sample", camera::SINK_NAME, message)
        })?;

        let caps = sample
            .caps()
            .ok_or_else(|| CameraError::new("caps", "sample", "No caps in sample"))?;
        let video_info = VideoInfo::from_caps(caps)
            .map_err(|e| CameraError::new("VideoInfo::from_caps", caps.to_string(), e.to_string()))?;
        let format = PixelFormat::from_gst(video_info.format()).ok_or_else(|| {
            CameraError::new(
                "VideoInfo::format",
                format!("{:?}", video_info.format()),
                "Unsupported camera pixel format",
            )
        })?;

        let buffer = sample
            .buffer_owned()
            .ok_or_else(|| CameraError::new("buffer", "sample", "No buffer in sample"))?;
        if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
            warn!(sequence = self.sequence, "Camera buffer marked as corrupted");
        }
        let mapped = buffer
            .into_mapped_buffer_readable()
            .map_err(|_| CameraError::new("map_readable", "buffer", "Failed to map buffer"))?;

        let frame = CameraFrame {
            width: video_info.width(),
            height: video_info.height(),
            data: FrameData::from_mapped_buffer(mapped),
            format,
            stride: video_info.stride()[0] as u32,
            sequence: self.sequence,
        };

        if self.sequence % timing::FRAME_LOG_INTERVAL == 0 {
            debug!(
                sequence = self.sequence,
                width = frame.width,
                height = frame.height,
                stride = frame.stride,
                format = %frame.format,
                "Camera frame"
            );
        }
        self.sequence += 1;

        Ok(frame)
    }

    fn stop(&mut self) {
        self.appsink = None;
        if let Some(pipeline) = self.pipeline.take() {
            info!("Stopping camera pipeline");
            bus::shutdown(&pipeline);
        }
    }
}

impl Drop for PipeWireCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_description_uses_source() {
        let camera = PipeWireCamera::new("videotestsrc is-live=true");
        let description = camera.pipeline_description();
        assert!(description.starts_with("videotestsrc is-live=true ! videoconvert"));
        assert!(description.contains("format=RGB"));
        assert!(description.contains("appsink name=sink"));
    }

    #[test]
    fn test_wait_before_start_is_an_error() {
        let mut camera = PipeWireCamera::new("videotestsrc");
        let err = camera.wait_for_frame().unwrap_err();
        assert_eq!(err.function, "wait_for_frame");
    }
}
