// SPDX-License-Identifier: MPL-2.0

//! GStreamer H.264 encoder session
//!
//! Pipeline: `appsrc (I420) ! <encoder> ! video/x-h264 (byte-stream, au) ! appsink`

use super::{EncodedPacket, EncoderProvider, VideoEncoder};
use crate::config::EncoderSettings;
use crate::constants::timing;
use crate::errors::{EncodeError, EncoderError};
use crate::media::bus;
use crate::media::yuv_frame::{YuvFrame, YuvLayout};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use tracing::{debug, info, warn};

/// Opens [`X264Encoder`] sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct GstEncoderProvider;

impl EncoderProvider for GstEncoderProvider {
    fn open(
        &self,
        settings: &EncoderSettings,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn VideoEncoder>, EncoderError> {
        Ok(Box::new(X264Encoder::open(settings, width, height)?))
    }
}

/// Synchronous wrapper around a GStreamer encoding pipeline
pub struct X264Encoder {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    appsink: gst_app::AppSink,
    element: String,
    /// Buffer layout the appsrc caps describe
    layout: YuvLayout,
    frame_duration_ns: u64,
    eos_sent: bool,
}

impl X264Encoder {
    /// Find, allocate, configure and start the encoder
    pub fn open(settings: &EncoderSettings, width: u32, height: u32) -> Result<Self, EncoderError> {
        gst::init().map_err(|e| EncoderError::Allocation(e.to_string()))?;

        let factory =
            gst::ElementFactory::find(&settings.element).ok_or_else(|| EncoderError::NotFound {
                codec: settings.element.clone(),
            })?;

        let encoder = factory
            .create()
            .build()
            .map_err(|e| EncoderError::Allocation(format!("{}: {}", settings.element, e)))?;
        configure_encoder(&encoder, settings);

        let fps = i32::try_from(settings.framerate).map_err(|_| {
            EncoderError::Open(format!("Invalid frame rate {}", settings.framerate))
        })?;
        let video_info =
            gst_video::VideoInfo::builder(gst_video::VideoFormat::I420, width, height)
                .fps(gst::Fraction::new(fps.max(1), 1))
                .build()
                .map_err(|e| EncoderError::Open(format!("Invalid video info: {}", e)))?;
        let raw_caps = video_info
            .to_caps()
            .map_err(|e| EncoderError::Open(format!("Invalid raw caps: {}", e)))?;
        let layout = YuvLayout::from_video_info(&video_info);

        let appsrc = gst_app::AppSrc::builder()
            .name("src")
            .caps(&raw_caps)
            .format(gst::Format::Time)
            .block(true)
            .build();

        let h264_caps = gst::Caps::builder("video/x-h264")
            .field("stream-format", "byte-stream")
            .field("alignment", "au")
            .field("profile", settings.profile.as_str())
            .build();

        let capsfilter = gst::ElementFactory::make("capsfilter")
            .property("caps", &h264_caps)
            .build()
            .map_err(|e| EncoderError::Allocation(format!("capsfilter: {}", e)))?;

        let appsink = gst_app::AppSink::builder().name("sink").sync(false).build();

        let pipeline = gst::Pipeline::new();
        pipeline
            .add_many([
                appsrc.upcast_ref(),
                &encoder,
                &capsfilter,
                appsink.upcast_ref(),
            ])
            .map_err(|e| EncoderError::Allocation(format!("Failed to add elements: {}", e)))?;

        gst::Element::link_many([
            appsrc.upcast_ref(),
            &encoder,
            &capsfilter,
            appsink.upcast_ref(),
        ])
        .map_err(|e| EncoderError::Open(format!("Failed to link encoder: {}", e)))?;

        if let Err(e) = pipeline.set_state(gst::State::Playing) {
            bus::shutdown(&pipeline);
            return Err(EncoderError::Open(e.to_string()));
        }
        if let Some(message) = bus::first_error(&pipeline, 0) {
            bus::shutdown(&pipeline);
            return Err(EncoderError::Open(message));
        }

        info!(
            encoder = %settings.element,
            width,
            height,
            fps = settings.framerate,
            bitrate_kbps = settings.bitrate_kbps(),
            gop = settings.gop_size,
            "Encoder opened"
        );

        Ok(Self {
            pipeline,
            appsrc,
            appsink,
            element: settings.element.clone(),
            layout,
            frame_duration_ns: (1_000_000_000 / settings.framerate.max(1) as u64).max(1),
            eos_sent: false,
        })
    }

    fn submit(&self, frame: &YuvFrame) -> Result<(), EncodeError> {
        let bytes = if frame.layout() == &self.layout {
            frame.as_bytes().to_vec()
        } else {
            repack(frame, &self.layout)
        };
        let mut buffer = gst::Buffer::from_slice(bytes);
        {
            let buffer_ref = buffer
                .get_mut()
                .ok_or_else(|| EncodeError::Submit("Buffer is not writable".to_string()))?;
            let pts = frame.pts.max(0) as u64 * self.frame_duration_ns;
            buffer_ref.set_pts(gst::ClockTime::from_nseconds(pts));
            buffer_ref.set_duration(gst::ClockTime::from_nseconds(self.frame_duration_ns));
        }

        self.appsrc
            .push_buffer(buffer)
            .map_err(|e| EncodeError::Submit(format!("{:?}", e)))?;
        Ok(())
    }

    fn packet_from_sample(sample: &gst::Sample) -> Result<EncodedPacket, EncodeError> {
        let buffer = sample
            .buffer()
            .ok_or_else(|| EncodeError::Pipeline("No buffer in sample".to_string()))?;
        let map = buffer
            .map_readable()
            .map_err(|e| EncodeError::Pipeline(format!("Failed to map packet: {}", e)))?;

        Ok(EncodedPacket {
            data: map.as_slice().to_vec(),
            pts: buffer.pts().map(|t| t.nseconds()),
            keyframe: !buffer.flags().contains(gst::BufferFlags::DELTA_UNIT),
        })
    }
}

impl VideoEncoder for X264Encoder {
    fn name(&self) -> &str {
        &self.element
    }

    fn encode(&mut self, frame: Option<&YuvFrame>) -> Result<Option<EncodedPacket>, EncodeError> {
        match frame {
            Some(frame) => {
                self.submit(frame)?;
                if let Some(message) = bus::first_error(&self.pipeline, 0) {
                    return Err(EncodeError::Pipeline(message));
                }
                self.appsink
                    .try_pull_sample(gst::ClockTime::ZERO)
                    .map(|sample| Self::packet_from_sample(&sample))
                    .transpose()
            }
            None => {
                if !self.eos_sent {
                    debug!("Sending end-of-stream to encoder");
                    self.appsrc
                        .end_of_stream()
                        .map_err(|e| EncodeError::Submit(format!("{:?}", e)))?;
                    self.eos_sent = true;
                }

                match self
                    .appsink
                    .try_pull_sample(gst::ClockTime::from_seconds(timing::DRAIN_PULL_TIMEOUT_SECS))
                {
                    Some(sample) => Self::packet_from_sample(&sample).map(Some),
                    None if self.appsink.is_eos() => Ok(None),
                    None => Err(EncodeError::Pipeline(
                        bus::first_error(&self.pipeline, 0)
                            .unwrap_or_else(|| "Timed out draining encoder".to_string()),
                    )),
                }
            }
        }
    }
}

impl Drop for X264Encoder {
    fn drop(&mut self) {
        bus::shutdown(&self.pipeline);
    }
}

/// Apply encoder settings, skipping properties this element does not have
fn configure_encoder(encoder: &gst::Element, settings: &EncoderSettings) {
    set_uint(encoder, "bitrate", settings.bitrate_kbps());
    set_uint(encoder, "key-int-max", settings.gop_size);
    set_uint(encoder, "bframes", settings.max_b_frames);
    set_uint(encoder, "qp-max", settings.qp_max);
    set_from_str(encoder, "speed-preset", &settings.speed_preset);
    set_from_str(encoder, "tune", &settings.tune);
}

fn set_uint(element: &gst::Element, name: &str, value: u32) {
    let Some(pspec) = element.find_property(name) else {
        warn!(property = name, "Encoder property not supported, skipping");
        return;
    };
    let Some(range) = pspec.downcast_ref::<gst::glib::ParamSpecUInt>() else {
        warn!(property = name, "Encoder property is not an unsigned integer, skipping");
        return;
    };

    let clamped = clamp_to_range(value, range.minimum(), range.maximum());
    if clamped != value {
        warn!(
            property = name,
            requested = value,
            applied = clamped,
            "Encoder property out of range, clamped"
        );
    }
    element.set_property(name, clamped);
    debug!(property = name, value = clamped, "Encoder property set");
}

fn clamp_to_range(value: u32, minimum: u32, maximum: u32) -> u32 {
    value.clamp(minimum, maximum.max(minimum))
}

/// Copy the visible rows of `frame` into a buffer laid out as `layout`
fn repack(frame: &YuvFrame, layout: &YuvLayout) -> Vec<u8> {
    let mut data = vec![0u8; layout.size];
    for plane in 0..3 {
        let stride = layout.strides[plane];
        let offset = layout.offsets[plane];
        for (row, samples) in frame.plane_rows(plane).enumerate() {
            let start = offset + row * stride;
            if let Some(dst) = data.get_mut(start..start + samples.len()) {
                dst.copy_from_slice(samples);
            }
        }
    }
    data
}

fn set_from_str(element: &gst::Element, name: &str, value: &str) {
    if element.find_property(name).is_some() {
        element.set_property_from_str(name, value);
        debug!(property = name, value, "Encoder property set");
    } else {
        warn!(property = name, "Encoder property not supported, skipping");
    }
}
