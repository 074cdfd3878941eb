// SPDX-License-Identifier: GPL-3.0-only

use camera_record::RecordConfig;
use camera_record::constants::{camera, encoder, exit_code};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "camera-record")]
#[command(about = "Record the default camera to a raw H.264 elementary stream")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Output file for the H.264 elementary stream (e.g. out.h264)
    #[arg(required_unless_present = "list_encoders")]
    output: Option<PathBuf>,

    /// Frame rate the stream is timestamped at
    #[arg(
        long,
        default_value_t = encoder::FRAMERATE,
        value_parser = clap::value_parser!(u32).range(1..=encoder::MAX_FRAMERATE as i64)
    )]
    fps: u32,

    /// Target bitrate in bits per second
    #[arg(
        long,
        default_value_t = encoder::BITRATE_BPS,
        value_parser = clap::value_parser!(u32)
            .range(encoder::MIN_BITRATE_BPS as i64..=encoder::MAX_BITRATE_BPS as i64)
    )]
    bitrate: u32,

    /// GStreamer source element feeding the camera (e.g. "v4l2src")
    #[arg(long, default_value = camera::DEFAULT_SOURCE)]
    source: String,

    /// Do not render the terminal preview (Ctrl+C stops)
    #[arg(long)]
    no_preview: bool,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// List available H.264 encoders and exit
    #[arg(long)]
    list_encoders: bool,
}

impl Cli {
    fn into_config(self, output: PathBuf) -> RecordConfig {
        let mut config = RecordConfig::new(output);
        config.source = self.source;
        config.preview = !self.no_preview;
        config.max_frames = self.max_frames;
        config.encoder = config
            .encoder
            .with_framerate(self.fps)
            .with_bitrate(self.bitrate);
        config
    }
}

fn main() -> ExitCode {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=camera_record=debug, RUST_LOG=info
    // Logs go to stderr; stdout carries the packet dump in headless mode
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(exit_code::FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if cli.list_encoders {
        return cli::list_encoders();
    }

    match cli.output.clone() {
        Some(output) => cli::record(cli.into_config(output)),
        None => ExitCode::from(exit_code::FAILURE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_required() {
        let err = Cli::try_parse_from(["camera-record"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_list_encoders_needs_no_output() {
        let cli = Cli::try_parse_from(["camera-record", "--list-encoders"]).unwrap();
        assert!(cli.list_encoders);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_options_reach_config() {
        let cli = Cli::try_parse_from([
            "camera-record",
            "--fps",
            "60",
            "--bitrate",
            "2000000",
            "--source",
            "videotestsrc is-live=true",
            "--no-preview",
            "--max-frames",
            "90",
            "out.h264",
        ])
        .unwrap();
        let config = cli.into_config(PathBuf::from("out.h264"));

        assert_eq!(config.output, PathBuf::from("out.h264"));
        assert_eq!(config.source, "videotestsrc is-live=true");
        assert!(!config.preview);
        assert_eq!(config.max_frames, Some(90));
        assert_eq!(config.encoder.framerate, 60);
        assert_eq!(config.encoder.gop_size, 30);
        assert_eq!(config.encoder.bitrate_bps, 2_000_000);
    }

    #[test]
    fn test_fps_bounds() {
        for fps in ["0", "1001", "4294967295"] {
            let parsed = Cli::try_parse_from(["camera-record", "--fps", fps, "out.h264"]);
            assert!(parsed.is_err(), "fps {} should be rejected", fps);
        }
        let cli = Cli::try_parse_from(["camera-record", "--fps", "1000", "out.h264"]).unwrap();
        assert_eq!(cli.fps, 1000);
    }

    #[test]
    fn test_bitrate_bounds() {
        for bitrate in ["999", "3000000000"] {
            let parsed = Cli::try_parse_from(["camera-record", "--bitrate", bitrate, "out.h264"]);
            assert!(parsed.is_err(), "bitrate {} should be rejected", bitrate);
        }
        let cli =
            Cli::try_parse_from(["camera-record", "--bitrate", "2000000000", "out.h264"]).unwrap();
        assert_eq!(cli.bitrate, 2_000_000_000);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["camera-record", "out.h264"]).unwrap();
        let config = cli.into_config(PathBuf::from("out.h264"));

        assert_eq!(config.source, "pipewiresrc");
        assert!(config.preview);
        assert_eq!(config.max_frames, None);
        assert_eq!(config.encoder, camera_record::EncoderSettings::default());
    }
}
