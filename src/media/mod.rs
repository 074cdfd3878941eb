// SPDX-License-Identifier: GPL-3.0-only

//! Media processing: pixel conversion and H.264 encoding
//!
//! - [`converter`]: camera-native RGB to planar I420
//! - [`encoders`]: H.264 encoder sessions and detection
//! - [`yuv_frame`]: reusable planar frame handed to the encoder
//! - [`bus`]: GStreamer bus helpers shared by the pipelines

pub mod bus;
pub mod converter;
pub mod encoders;
pub mod yuv_frame;
