//! Streaming media buffers
//!
//! A media buffer accepts opaque encoded chunks one at a time and exposes a
//! timeline offset: the playback position, in seconds, at which the next
//! appended chunk is placed.

use crate::utils::MonitorResult;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Streaming buffer fed by the segment loop.
///
/// `append` must not be called again until the previous call has completed.
#[async_trait]
pub trait MediaBuffer: Send {
    /// Append one chunk; completes when the buffer has taken it
    async fn append(&mut self, chunk: Vec<u8>) -> MonitorResult<()>;

    /// Timeline position of the next append, in seconds
    fn timestamp_offset(&self) -> f64;

    fn set_timestamp_offset(&mut self, offset: f64);
}

/// Appends segments back to back into a single file on disk
#[derive(Debug)]
pub struct FileMediaBuffer {
    file: File,
    timestamp_offset: f64,
    bytes_written: u64,
}

impl FileMediaBuffer {
    /// Open (or create) `path` for appending
    pub async fn open(path: impl AsRef<Path>) -> MonitorResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path).await?;
        tracing::info!("Writing live feed to {:?}", path);

        Ok(Self {
            file,
            timestamp_offset: 0.0,
            bytes_written: 0,
        })
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

#[async_trait]
impl MediaBuffer for FileMediaBuffer {
    async fn append(&mut self, chunk: Vec<u8>) -> MonitorResult<()> {
        self.file.write_all(&chunk).await?;
        self.file.flush().await?;
        self.bytes_written += chunk.len() as u64;

        tracing::debug!(
            "Appended {} bytes at {:.3}s ({} bytes total)",
            chunk.len(),
            self.timestamp_offset,
            self.bytes_written
        );
        Ok(())
    }

    fn timestamp_offset(&self) -> f64 {
        self.timestamp_offset
    }

    fn set_timestamp_offset(&mut self, offset: f64) {
        self.timestamp_offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_buffer_appends_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feeds").join("live.mp4");

        let mut buffer = FileMediaBuffer::open(&path).await.unwrap();
        buffer.append(vec![1, 2, 3]).await.unwrap();
        buffer.append(vec![4, 5]).await.unwrap();
        buffer.set_timestamp_offset(8.0);

        assert_eq!(buffer.bytes_written(), 5);
        assert_eq!(buffer.timestamp_offset(), 8.0);
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4, 5]);
    }
}
