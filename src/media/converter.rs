// SPDX-License-Identifier: GPL-3.0-only

//! Pixel format conversion for the encoder and the preview
//!
//! Camera frames arrive as packed RGB. The encoder wants planar I420 with
//! BT.601 coefficients, the preview wants display RGB.

use crate::backends::camera::types::{CameraFrame, FrameLayout, PixelFormat};
use crate::errors::ConvertError;
use crate::media::yuv_frame::{YuvFrame, chroma_size};
use tracing::debug;

/// Builds converters between two frame layouts
pub trait ConverterProvider {
    /// Construct a converter from `src` to `dst`
    fn create(
        &self,
        src: FrameLayout,
        dst: FrameLayout,
    ) -> Result<Box<dyn PixelConverter>, ConvertError>;
}

/// A constructed conversion between fixed layouts
pub trait PixelConverter {
    /// Convert `frame` into `dst`, honoring the frame's stride
    fn convert(&mut self, frame: &CameraFrame, dst: &mut YuvFrame) -> Result<(), ConvertError>;
}

/// CPU converters for packed RGB sources
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuConverterProvider;

impl ConverterProvider for CpuConverterProvider {
    fn create(
        &self,
        src: FrameLayout,
        dst: FrameLayout,
    ) -> Result<Box<dyn PixelConverter>, ConvertError> {
        Ok(Box::new(PackedRgbToI420::new(src, dst)?))
    }
}

/// Byte positions of R, G and B inside one packed pixel
#[derive(Debug, Clone, Copy)]
struct ChannelOrder {
    r: usize,
    g: usize,
    b: usize,
    bytes_per_pixel: usize,
}

impl ChannelOrder {
    fn for_format(format: PixelFormat) -> Option<Self> {
        match format {
            PixelFormat::RGB24 => Some(Self {
                r: 0,
                g: 1,
                b: 2,
                bytes_per_pixel: 3,
            }),
            PixelFormat::BGR24 => Some(Self {
                r: 2,
                g: 1,
                b: 0,
                bytes_per_pixel: 3,
            }),
            PixelFormat::RGBA => Some(Self {
                r: 0,
                g: 1,
                b: 2,
                bytes_per_pixel: 4,
            }),
            PixelFormat::I420 => None,
        }
    }
}

/// Packed RGB24/BGR24/RGBA to I420 at the same resolution
#[derive(Debug)]
pub struct PackedRgbToI420 {
    src: FrameLayout,
    order: ChannelOrder,
}

impl PackedRgbToI420 {
    pub fn new(src: FrameLayout, dst: FrameLayout) -> Result<Self, ConvertError> {
        let unsupported = || ConvertError::Unsupported {
            src: src.to_string(),
            dst: dst.to_string(),
        };

        if dst.format != PixelFormat::I420 {
            return Err(unsupported());
        }
        let order = ChannelOrder::for_format(src.format).ok_or_else(unsupported)?;

        if src.width == 0 || src.height == 0 {
            return Err(ConvertError::InvalidSize {
                width: src.width,
                height: src.height,
            });
        }
        // No scaling: the encoder runs at the camera resolution
        if (src.width, src.height) != (dst.width, dst.height) {
            return Err(unsupported());
        }

        debug!(src = %src, dst = %dst, "Created pixel converter");
        Ok(Self { src, order })
    }
}

impl PixelConverter for PackedRgbToI420 {
    fn convert(&mut self, frame: &CameraFrame, dst: &mut YuvFrame) -> Result<(), ConvertError> {
        let layout = frame.layout();
        if layout != self.src || (dst.width, dst.height) != (self.src.width, self.src.height) {
            return Err(ConvertError::SizeMismatch {
                width: self.src.width,
                height: self.src.height,
                actual_width: frame.width,
                actual_height: frame.height,
            });
        }

        let width = frame.width as usize;
        let height = frame.height as usize;
        let stride = frame.stride as usize;
        let bpp = self.order.bytes_per_pixel;
        let data = frame.data_slice();

        let expected = stride * (height - 1) + width * bpp;
        if stride < width * bpp || data.len() < expected {
            return Err(ConvertError::ShortBuffer {
                len: data.len(),
                expected,
            });
        }

        let (chroma_w, chroma_h) = chroma_size(frame.width, frame.height);
        let (chroma_w, chroma_h) = (chroma_w as usize, chroma_h as usize);
        let order = self.order;
        let [luma_stride, chroma_stride, _] = dst.strides();
        let (y_plane, u_plane, v_plane) = dst.planes_mut();

        let pixel = |x: usize, y: usize| -> (i32, i32, i32) {
            let idx = y * stride + x * bpp;
            (
                data[idx + order.r] as i32,
                data[idx + order.g] as i32,
                data[idx + order.b] as i32,
            )
        };

        for y in 0..height {
            for x in 0..width {
                let (r, g, b) = pixel(x, y);
                y_plane[y * luma_stride + x] = rgb_to_luma(r, g, b);
            }
        }

        // Each chroma sample averages its 2x2 block (clipped at odd edges)
        for cy in 0..chroma_h {
            for cx in 0..chroma_w {
                let (mut r, mut g, mut b, mut n) = (0, 0, 0, 0);
                for y in (cy * 2)..((cy * 2 + 2).min(height)) {
                    for x in (cx * 2)..((cx * 2 + 2).min(width)) {
                        let (pr, pg, pb) = pixel(x, y);
                        r += pr;
                        g += pg;
                        b += pb;
                        n += 1;
                    }
                }
                let (u, v) = rgb_to_chroma(r / n, g / n, b / n);
                u_plane[cy * chroma_stride + cx] = u;
                v_plane[cy * chroma_stride + cx] = v;
            }
        }

        Ok(())
    }
}

/// Convert RGB to limited-range luma (BT.601)
fn rgb_to_luma(r: i32, g: i32, b: i32) -> u8 {
    (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16).clamp(0, 255) as u8
}

/// Convert RGB to limited-range U and V (BT.601)
fn rgb_to_chroma(r: i32, g: i32, b: i32) -> (u8, u8) {
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    (u.clamp(0, 255) as u8, v.clamp(0, 255) as u8)
}

/// Sample one pixel of a packed camera frame in display order (R, G, B)
///
/// Out-of-range coordinates are clamped to the frame edge; truncated
/// buffers and planar frames read as black.
pub fn sample_display_rgb(frame: &CameraFrame, x: u32, y: u32) -> (u8, u8, u8) {
    let Some(order) = ChannelOrder::for_format(frame.format) else {
        return (0, 0, 0);
    };
    if frame.width == 0 || frame.height == 0 {
        return (0, 0, 0);
    }
    let x = x.min(frame.width - 1);
    let y = y.min(frame.height - 1);
    let data = frame.data_slice();

    let idx = (y * frame.stride) as usize + x as usize * order.bytes_per_pixel;
    if idx + order.bytes_per_pixel <= data.len() {
        (data[idx + order.r], data[idx + order.g], data[idx + order.b])
    } else {
        (0, 0, 0)
    }
}
