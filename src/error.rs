use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while walking the frames of a trajectory.
///
/// Note that a truncated last frame is not an error. A walk simply ends at the last complete
/// header it could read.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The input could not be opened.
    #[error("could not open {}: {}", .path.display(), .source)]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a single complete frame header could be read.
    #[error("no complete frame found, the file is empty or corrupt")]
    EmptyOrCorruptFile,

    /// A frame header did not start with [`Header::MAGIC`](crate::Header::MAGIC).
    ///
    /// Only reported when [`ScanOptions::strict_magic`](crate::ScanOptions::strict_magic) is set.
    #[error("found invalid magic number '{magic}' ({magic:#0x}) for frame {frame} at byte {offset}")]
    InvalidMagic { frame: u64, offset: u64, magic: u32 },

    /// The walk was interrupted through a [`CancelToken`](crate::CancelToken).
    #[error("scan was cancelled after {frames} frames")]
    Cancelled { frames: u64 },

    /// Reading or seeking the opened source failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
