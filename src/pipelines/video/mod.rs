// SPDX-License-Identifier: GPL-3.0-only

//! Video recording pipeline
//!
//! ```text
//! Camera ──▶ Preview
//!    │
//!    ▼
//! Converter (RGB → I420) ──▶ Encoder (H.264) ──▶ OutputSink (.h264)
//! ```

pub mod recorder;
pub mod sink;

pub use recorder::{CaptureSession, RecordSummary, StopReason};
pub use sink::OutputSink;
