// SPDX-License-Identifier: MPL-2.0

//! Planar YUV 4:2:0 frame handed to the encoder

/// Plane strides, plane offsets and total size of an I420 buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YuvLayout {
    pub strides: [usize; 3],
    pub offsets: [usize; 3],
    pub size: usize,
}

impl YuvLayout {
    /// Default I420 layout of a `video/x-raw,format=I420` buffer
    ///
    /// Every stride is rounded up to 4 bytes and the chroma planes start
    /// after an even number of luma rows, as `GstVideoInfo` lays it out.
    pub fn i420(width: u32, height: u32) -> Self {
        let width = width as usize;
        let height = height as usize;

        let luma_stride = round_up_4(width);
        let chroma_stride = round_up_4(round_up_2(width) / 2);
        let chroma_rows = round_up_2(height) / 2;

        let u_offset = luma_stride * round_up_2(height);
        let v_offset = u_offset + chroma_stride * chroma_rows;

        Self {
            strides: [luma_stride, chroma_stride, chroma_stride],
            offsets: [0, u_offset, v_offset],
            size: v_offset + chroma_stride * chroma_rows,
        }
    }

    /// Layout described by GStreamer video info
    pub fn from_video_info(info: &gstreamer_video::VideoInfo) -> Self {
        let stride = info.stride();
        let offset = info.offset();
        Self {
            strides: [stride[0] as usize, stride[1] as usize, stride[2] as usize],
            offsets: [offset[0], offset[1], offset[2]],
            size: info.size(),
        }
    }
}

fn round_up_2(value: usize) -> usize {
    value.next_multiple_of(2)
}

fn round_up_4(value: usize) -> usize {
    value.next_multiple_of(4)
}

/// A reusable I420 frame in the default GStreamer layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YuvFrame {
    pub width: u32,
    pub height: u32,
    /// Presentation timestamp in frame units (0, 1, 2, ...)
    pub pts: i64,
    layout: YuvLayout,
    data: Vec<u8>,
}

impl YuvFrame {
    /// Allocate a black frame for the given resolution
    pub fn new(width: u32, height: u32) -> Self {
        let layout = YuvLayout::i420(width, height);

        let mut data = vec![16u8; layout.size];
        data[layout.offsets[1]..].fill(128);

        Self {
            width,
            height,
            pts: 0,
            layout,
            data,
        }
    }

    pub fn layout(&self) -> &YuvLayout {
        &self.layout
    }

    /// Row stride of each plane (Y, U, V)
    pub fn strides(&self) -> [usize; 3] {
        self.layout.strides
    }

    /// Raw bytes of all three planes, padding included
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Visible samples of one plane, row by row
    pub fn plane_rows(&self, plane: usize) -> impl Iterator<Item = &[u8]> {
        let (cols, rows) = self.plane_size(plane);
        let stride = self.layout.strides[plane];
        let start = self.layout.offsets[plane];
        (0..rows).map(move |row| &self.data[start + row * stride..][..cols])
    }

    /// Mutable Y, U and V planes at once, each starting at its offset
    pub fn planes_mut(&mut self) -> (&mut [u8], &mut [u8], &mut [u8]) {
        let [_, u_offset, v_offset] = self.layout.offsets;
        let (y, rest) = self.data.split_at_mut(u_offset);
        let (u, v) = rest.split_at_mut(v_offset - u_offset);
        (y, u, v)
    }

    /// Visible columns and rows of a plane
    fn plane_size(&self, plane: usize) -> (usize, usize) {
        if plane == 0 {
            (self.width as usize, self.height as usize)
        } else {
            let (w, h) = chroma_size(self.width, self.height);
            (w as usize, h as usize)
        }
    }
}

/// Chroma plane size for 4:2:0, rounding odd dimensions up
pub fn chroma_size(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(2), height.div_ceil(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_pads_chroma_stride() {
        let layout = YuvLayout::i420(100, 75);
        assert_eq!(layout.strides, [100, 52, 52]);
        assert_eq!(layout.offsets, [0, 7600, 9576]);
        assert_eq!(layout.size, 11552);
    }

    #[test]
    fn test_layout_for_even_geometry_is_packed() {
        let layout = YuvLayout::i420(640, 480);
        assert_eq!(layout.strides, [640, 320, 320]);
        assert_eq!(layout.offsets, [0, 307200, 384000]);
        assert_eq!(layout.size, 640 * 480 * 3 / 2);
    }

    #[test]
    fn test_layout_matches_video_info() {
        gstreamer::init().unwrap();
        for (width, height) in [(100, 75), (1366, 768), (5, 3), (640, 480)] {
            let info = gstreamer_video::VideoInfo::builder(
                gstreamer_video::VideoFormat::I420,
                width,
                height,
            )
            .build()
            .unwrap();
            assert_eq!(
                YuvLayout::from_video_info(&info),
                YuvLayout::i420(width, height),
                "{}x{}",
                width,
                height
            );
        }
    }

    #[test]
    fn test_frame_size_follows_layout() {
        let frame = YuvFrame::new(100, 75);
        assert_eq!(frame.as_bytes().len(), 11552);
        assert_eq!(frame.strides(), [100, 52, 52]);
        assert_eq!(frame.plane_rows(0).count(), 75);
        assert_eq!(frame.plane_rows(1).count(), 38);
        assert!(frame.plane_rows(2).all(|row| row.len() == 50));
    }

    #[test]
    fn test_new_frame_is_black() {
        let frame = YuvFrame::new(5, 3);
        assert!(frame.plane_rows(0).flatten().all(|&y| y == 16));
        assert!(frame.plane_rows(1).flatten().all(|&u| u == 128));
        assert!(frame.plane_rows(2).flatten().all(|&v| v == 128));
    }
}
