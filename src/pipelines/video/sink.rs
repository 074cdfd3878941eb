// SPDX-License-Identifier: MPL-2.0

//! Append-only output for the raw H.264 elementary stream

use crate::errors::{RecordError, RecordResult};
use crate::media::encoders::EncodedPacket;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Output file receiving packet bytes back-to-back, without framing
pub struct OutputSink {
    writer: BufWriter<File>,
    path: PathBuf,
    bytes_written: u64,
    packets_written: u64,
}

impl OutputSink {
    /// Create or truncate the output file
    pub fn create(path: &Path) -> RecordResult<Self> {
        let file = File::create(path).map_err(|source| RecordError::OutputOpen {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "Output opened");
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            bytes_written: 0,
            packets_written: 0,
        })
    }

    /// Append one packet
    pub fn write_packet(&mut self, packet: &EncodedPacket) -> io::Result<()> {
        self.writer.write_all(&packet.data)?;
        self.bytes_written += packet.len() as u64;
        self.packets_written += 1;
        debug!(
            packet = self.packets_written,
            size = packet.len(),
            keyframe = packet.keyframe,
            "Packet written"
        );
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    /// Flush and close the file
    pub fn finish(self) -> io::Result<()> {
        let file = self.writer.into_inner().map_err(|e| e.into_error())?;
        // Not every output supports fsync (pipes, character devices)
        if let Err(e) = file.sync_all() {
            warn!(path = %self.path.display(), error = %e, "Failed to sync output");
        }
        info!(
            path = %self.path.display(),
            bytes = self.bytes_written,
            packets = self.packets_written,
            "Output closed"
        );
        Ok(())
    }
}
