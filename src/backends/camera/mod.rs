// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! The recorder only needs a blocking frame source. [`CameraSource`] is the
//! seam between the capture-encode loop and the concrete backend:
//!
//! ```text
//! ┌──────────────────────┐
//! │ Capture-encode loop  │
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │  CameraSource trait  │  ← start / wait_for_frame / stop
//! └──────────┬───────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │PipeWire│  ← GStreamer appsink implementation
//!       └────────┘
//! ```

pub mod pipewire;
pub mod types;

pub use pipewire::PipeWireCamera;
pub use types::*;

use crate::errors::CameraError;

/// Result type for camera operations
pub type CameraResult<T> = Result<T, CameraError>;

/// Blocking camera session
pub trait CameraSource {
    /// Start streaming with the device's default configuration
    fn start(&mut self) -> CameraResult<()>;

    /// Block until the next frame is available
    ///
    /// There is no timeout: a stalled device stalls the caller.
    fn wait_for_frame(&mut self) -> CameraResult<CameraFrame>;

    /// Stop streaming and release the device
    fn stop(&mut self) {}
}
