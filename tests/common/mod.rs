// SPDX-License-Identifier: MPL-2.0

//! Fakes for driving the capture-encode loop without GStreamer

#![allow(dead_code)]

use camera_record::backends::camera::types::{CameraFrame, FrameLayout, PixelFormat};
use camera_record::backends::camera::{CameraResult, CameraSource};
use camera_record::config::EncoderSettings;
use camera_record::errors::{CameraError, ConvertError, EncodeError, EncoderError, PreviewError};
use camera_record::media::converter::{ConverterProvider, PixelConverter};
use camera_record::media::encoders::{EncodedPacket, EncoderProvider, VideoEncoder};
use camera_record::media::yuv_frame::YuvFrame;
use camera_record::preview::{Preview, SessionInfo};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const WIDTH: u32 = 4;
pub const HEIGHT: u32 = 2;

/// Camera producing an endless stream of small RGB frames
#[derive(Default)]
pub struct FakeCamera {
    pub fail_start: bool,
    /// Frame size switches to 2x2 from this sequence number on
    pub resize_at: Option<u64>,
    pub started: bool,
    pub stopped: bool,
    pub frames_served: u64,
}

impl CameraSource for FakeCamera {
    fn start(&mut self) -> CameraResult<()> {
        if self.fail_start {
            return Err(CameraError::new("start", "fake", "No camera connected"));
        }
        self.started = true;
        Ok(())
    }

    fn wait_for_frame(&mut self) -> CameraResult<CameraFrame> {
        let sequence = self.frames_served;
        self.frames_served += 1;

        let (width, height) = match self.resize_at {
            Some(at) if sequence >= at => (2, 2),
            _ => (WIDTH, HEIGHT),
        };
        let data = vec![(sequence % 256) as u8; (width * height * 3) as usize];
        Ok(CameraFrame::from_bytes(
            PixelFormat::RGB24,
            width,
            height,
            data,
            sequence,
        ))
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// What the fake encoder saw and produced
#[derive(Debug, Default)]
pub struct EncoderLog {
    pub opened: Option<(u32, u32)>,
    /// One entry per encode call: the frame's pts, or `None` for a drain call
    pub calls: Vec<Option<i64>>,
    pub produced: Vec<Vec<u8>>,
}

/// Encoder holding back `lag` frames before emitting packets
pub struct FakeEncoder {
    log: Rc<RefCell<EncoderLog>>,
    pending: VecDeque<i64>,
    lag: usize,
    fail_on_call: Option<usize>,
    min_packet_len: usize,
}

impl FakeEncoder {
    fn packet_for(&self, pts: i64) -> Vec<u8> {
        // Variable length so concatenation order is observable
        let mut data = vec![0, 0, 0, 1];
        data.extend(std::iter::repeat_n(pts as u8, (pts % 3) as usize + 1));
        if data.len() < self.min_packet_len {
            data.resize(self.min_packet_len, pts as u8);
        }
        data
    }
}

impl VideoEncoder for FakeEncoder {
    fn name(&self) -> &str {
        "fake"
    }

    fn encode(&mut self, frame: Option<&YuvFrame>) -> Result<Option<EncodedPacket>, EncodeError> {
        let mut log = self.log.borrow_mut();
        log.calls.push(frame.map(|f| f.pts));

        if self.fail_on_call == Some(log.calls.len()) {
            return Err(EncodeError::Pipeline("status -22".to_string()));
        }

        let ready = match frame {
            Some(frame) => {
                self.pending.push_back(frame.pts);
                if self.pending.len() > self.lag {
                    self.pending.pop_front()
                } else {
                    None
                }
            }
            None => self.pending.pop_front(),
        };

        Ok(ready.map(|pts| {
            let data = self.packet_for(pts);
            log.produced.push(data.clone());
            EncodedPacket::new(data)
        }))
    }
}

pub struct FakeEncoderProvider {
    pub log: Rc<RefCell<EncoderLog>>,
    pub open_error: Option<EncoderError>,
    pub lag: usize,
    pub fail_on_call: Option<usize>,
    /// Pad every packet to at least this many bytes
    pub min_packet_len: usize,
}

impl FakeEncoderProvider {
    pub fn new(lag: usize) -> Self {
        Self {
            log: Rc::default(),
            open_error: None,
            lag,
            fail_on_call: None,
            min_packet_len: 0,
        }
    }

    pub fn failing(error: EncoderError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::new(0)
        }
    }
}

impl EncoderProvider for FakeEncoderProvider {
    fn open(
        &self,
        _settings: &EncoderSettings,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn VideoEncoder>, EncoderError> {
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        self.log.borrow_mut().opened = Some((width, height));
        Ok(Box::new(FakeEncoder {
            log: self.log.clone(),
            pending: VecDeque::new(),
            lag: self.lag,
            fail_on_call: self.fail_on_call,
            min_packet_len: self.min_packet_len,
        }))
    }
}

/// Converter provider that refuses every layout
pub struct RejectingConverters;

impl ConverterProvider for RejectingConverters {
    fn create(
        &self,
        src: FrameLayout,
        dst: FrameLayout,
    ) -> Result<Box<dyn PixelConverter>, ConvertError> {
        Err(ConvertError::Unsupported {
            src: src.to_string(),
            dst: dst.to_string(),
        })
    }
}

/// Preview requesting a stop on poll number `stop_on_poll` (1-based)
#[derive(Default)]
pub struct FakePreview {
    pub stop_on_poll: Option<usize>,
    pub polls: usize,
    pub shown: usize,
    pub packets: Vec<(u64, String)>,
    pub banner: Option<String>,
}

impl FakePreview {
    /// Stop after `frames` frames were submitted
    pub fn stopping_after(frames: usize) -> Self {
        Self {
            stop_on_poll: Some(frames + 1),
            ..Default::default()
        }
    }
}

impl Preview for FakePreview {
    fn recording_started(&mut self, info: &SessionInfo<'_>) {
        self.banner = Some(info.to_string());
    }

    fn show(&mut self, _frame: &CameraFrame) -> Result<(), PreviewError> {
        self.shown += 1;
        // Rendering failures must not end the recording
        Err(PreviewError::Terminal(std::io::Error::other("fake preview")))
    }

    fn poll_stop(&mut self) -> bool {
        self.polls += 1;
        self.stop_on_poll == Some(self.polls)
    }

    fn packet_written(&mut self, index: u64, packet: &EncodedPacket) {
        self.packets.push((index, packet.head_hex()));
    }
}
