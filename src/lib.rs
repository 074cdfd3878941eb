// SPDX-License-Identifier: MPL-2.0

//! camera-record - record the default camera to a raw H.264 stream
//!
//! Frames are captured from the camera, shown on a preview surface,
//! converted to I420, encoded to H.264 and appended to an Annex-B
//! elementary stream file.
//!
//! # Architecture
//!
//! - [`backends`]: camera session (GStreamer appsink)
//! - [`media`]: pixel conversion and H.264 encoding
//! - [`pipelines`]: the capture-encode loop and output sink
//! - [`preview`]: terminal and headless preview surfaces
//! - [`config`]: encoder settings and run configuration
//!
//! # Example
//!
//! ```ignore
//! let mut camera = PipeWireCamera::new("pipewiresrc");
//! let mut preview = HeadlessPreview::new()?;
//! let summary = CaptureSession::new(
//!     &mut camera,
//!     &GstEncoderProvider,
//!     &mut preview,
//!     EncoderSettings::default(),
//! )
//! .run(Path::new("out.h264"))?;
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod preview;

// Re-export commonly used types
pub use backends::camera::{CameraSource, PipeWireCamera};
pub use config::{EncoderSettings, RecordConfig};
pub use errors::{RecordError, RecordResult};
pub use media::encoders::GstEncoderProvider;
pub use pipelines::video::{CaptureSession, RecordSummary, StopReason};
