// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use gstreamer::buffer::{MappedBuffer, Readable};
use std::sync::Arc;

/// Frame data storage - either pre-copied bytes or zero-copy GStreamer buffer
///
/// The `Mapped` variant keeps the GStreamer buffer mapped and alive until the
/// frame is dropped.
#[derive(Clone)]
pub enum FrameData {
    /// Pre-copied bytes (fakes, tests, converted frames)
    Copied(Arc<[u8]>),
    /// Zero-copy mapped GStreamer buffer
    Mapped(Arc<MappedBuffer<Readable>>),
}

impl FrameData {
    /// Create FrameData from a mapped GStreamer buffer (zero-copy)
    pub fn from_mapped_buffer(buffer: MappedBuffer<Readable>) -> Self {
        FrameData::Mapped(Arc::new(buffer))
    }

    /// Get the length of the frame data in bytes
    pub fn len(&self) -> usize {
        match self {
            FrameData::Copied(data) => data.len(),
            FrameData::Mapped(buf) => buf.len(),
        }
    }

    /// Check if the frame data is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for FrameData {
    fn from(data: Vec<u8>) -> Self {
        FrameData::Copied(Arc::from(data.into_boxed_slice()))
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameData::Copied(data) => write!(f, "FrameData::Copied({} bytes)", data.len()),
            FrameData::Mapped(buf) => write!(f, "FrameData::Mapped({} bytes)", buf.len()),
        }
    }
}

impl AsRef<[u8]> for FrameData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FrameData::Copied(data) => data.as_ref(),
            FrameData::Mapped(buf) => buf.as_slice(),
        }
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_ref()
    }
}

/// Pixel layouts handled by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Packed 8-bit R, G, B
    RGB24,
    /// Packed 8-bit B, G, R
    BGR24,
    /// Packed 8-bit R, G, B, A
    RGBA,
    /// Planar YUV 4:2:0 (Y, then U, then V)
    I420,
}

impl PixelFormat {
    /// Bytes per pixel for packed formats, `None` for planar ones
    pub fn packed_bytes_per_pixel(&self) -> Option<u32> {
        match self {
            PixelFormat::RGB24 | PixelFormat::BGR24 => Some(3),
            PixelFormat::RGBA => Some(4),
            PixelFormat::I420 => None,
        }
    }

    /// Map a GStreamer raw video format to ours
    pub fn from_gst(format: gstreamer_video::VideoFormat) -> Option<Self> {
        use gstreamer_video::VideoFormat;
        match format {
            VideoFormat::Rgb => Some(PixelFormat::RGB24),
            VideoFormat::Bgr => Some(PixelFormat::BGR24),
            VideoFormat::Rgba => Some(PixelFormat::RGBA),
            VideoFormat::I420 => Some(PixelFormat::I420),
            _ => None,
        }
    }

    /// GStreamer caps format string
    pub fn gst_name(&self) -> &'static str {
        match self {
            PixelFormat::RGB24 => "RGB",
            PixelFormat::BGR24 => "BGR",
            PixelFormat::RGBA => "RGBA",
            PixelFormat::I420 => "I420",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.gst_name())
    }
}

/// A pixel format at a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
}

impl FrameLayout {
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
        }
    }
}

impl std::fmt::Display for FrameLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}x{}", self.format, self.width, self.height)
    }
}

/// A single captured frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: FrameData,
    pub format: PixelFormat,
    /// Bytes per row of the first plane
    pub stride: u32,
    /// Position of the frame in the camera stream
    pub sequence: u64,
}

impl CameraFrame {
    /// Create a frame from owned bytes with a tightly packed stride
    pub fn from_bytes(
        format: PixelFormat,
        width: u32,
        height: u32,
        data: Vec<u8>,
        sequence: u64,
    ) -> Self {
        let stride = format.packed_bytes_per_pixel().unwrap_or(1) * width;
        Self {
            width,
            height,
            data: FrameData::from(data),
            format,
            stride,
            sequence,
        }
    }

    /// Get the frame data as a byte slice
    pub fn data_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn layout(&self) -> FrameLayout {
        FrameLayout::new(self.format, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_packs_stride() {
        let frame = CameraFrame::from_bytes(PixelFormat::RGB24, 4, 2, vec![0; 24], 7);
        assert_eq!(frame.stride, 12);
        assert_eq!(frame.sequence, 7);
        assert_eq!(frame.data.len(), 24);
        assert_eq!(frame.layout().to_string(), "RGB 4x2");
    }
}
