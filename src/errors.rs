// SPDX-License-Identifier: MPL-2.0

//! Error types for the recorder

use crate::constants::exit_code;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using RecordError
pub type RecordResult<T> = Result<T, RecordError>;

/// Top-level error, one variant family per failure site
#[derive(Debug, Error)]
pub enum RecordError {
    /// The output file could not be created
    #[error("Can not open {} for writing: {source}", path.display())]
    OutputOpen { path: PathBuf, source: io::Error },
    /// Encoder lookup, allocation or open failed
    #[error(transparent)]
    Encoder(#[from] EncoderError),
    /// The pixel converter could not be constructed
    #[error("Failed to create pixel converter: {0}")]
    Converter(#[source] ConvertError),
    /// Any error raised by the camera session
    #[error(transparent)]
    Camera(#[from] CameraError),
    /// Writing to the output sink failed
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl RecordError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            RecordError::OutputOpen { .. } => exit_code::OUTPUT_OPEN,
            RecordError::Encoder(EncoderError::NotFound { .. }) => exit_code::ENCODER_NOT_FOUND,
            RecordError::Encoder(EncoderError::Allocation(_)) => exit_code::ENCODER_ALLOCATION,
            RecordError::Encoder(EncoderError::Open(_)) => exit_code::ENCODER_OPEN,
            RecordError::Converter(_) => exit_code::CONVERTER,
            RecordError::Camera(_) | RecordError::Io(_) => exit_code::FAILURE,
        }
    }
}

/// Camera session error
///
/// Carries the name of the failed operation and its arguments next to the
/// message so the top level can print a precise diagnostic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Camera error calling {function}({args}):\n    {message}")]
pub struct CameraError {
    pub function: String,
    pub args: String,
    pub message: String,
}

impl CameraError {
    pub fn new(
        function: impl Into<String>,
        args: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            function: function.into(),
            args: args.into(),
            message: message.into(),
        }
    }
}

/// Errors while setting up an encoder session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncoderError {
    /// No encoder for the requested codec is installed
    #[error("Unable to find video encoder: {codec}")]
    NotFound { codec: String },
    /// The encoder instance could not be created
    #[error("Unable to allocate encoder context: {0}")]
    Allocation(String),
    /// The encoder rejected its parameters or failed to start
    #[error("Could not open the encoder: {0}")]
    Open(String),
}

/// Failure of a single encode call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A raw frame could not be handed to the encoder
    #[error("Failed to submit frame: {0}")]
    Submit(String),
    /// The encoder pipeline reported an error
    #[error("Encoder pipeline error: {0}")]
    Pipeline(String),
}

/// Pixel conversion errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConvertError {
    /// The conversion between these formats is not supported
    #[error("Unsupported conversion: {src} -> {dst}")]
    Unsupported { src: String, dst: String },
    /// Zero-sized frames cannot be converted
    #[error("Invalid frame size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    /// The frame does not match the geometry the converter was built for
    #[error("Frame {actual_width}x{actual_height} does not match converter {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    /// The frame buffer is shorter than its stride and height require
    #[error("Frame buffer too short: {len} bytes, expected {expected}")]
    ShortBuffer { len: usize, expected: usize },
}

/// Preview rendering errors (never fatal to the recording)
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Preview terminal error: {0}")]
    Terminal(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_startup_site() {
        let codes = [
            RecordError::OutputOpen {
                path: PathBuf::from("/nope"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }
            .exit_code(),
            RecordError::Encoder(EncoderError::NotFound {
                codec: "h264".into(),
            })
            .exit_code(),
            RecordError::Encoder(EncoderError::Allocation("oom".into())).exit_code(),
            RecordError::Encoder(EncoderError::Open("bad".into())).exit_code(),
            RecordError::Converter(ConvertError::InvalidSize {
                width: 0,
                height: 0,
            })
            .exit_code(),
        ];

        assert_eq!(codes, [2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_camera_error_is_generic_failure() {
        let err = RecordError::from(CameraError::new("start", "", "no device"));
        assert_eq!(err.exit_code(), exit_code::FAILURE);
    }

    #[test]
    fn test_camera_error_display_names_call() {
        let err = CameraError::new("pull_sample", "sink", "stream stopped");
        assert_eq!(
            err.to_string(),
            "Camera error calling pull_sample(sink):\n    stream stopped"
        );
    }
}
