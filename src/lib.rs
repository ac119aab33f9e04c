//! Walk the frames of an xtc trajectory without decoding them.
//!
//! An xtc frame has no fixed size. Its length depends on how well its positions compressed. The
//! only way to find the next frame is to read the header of the current one, which tells how many
//! bytes of payload follow it, and skip past those. This crate does exactly that, and nothing
//! more, which makes counting the frames of a large trajectory very cheap.
//!
//! ```no_run
//! let summary = xtclen::scan("trajectory.xtc")?;
//! println!("{} frames of {} atoms", summary.frame_count, summary.atom_count);
//! # Ok::<(), xtclen::ScanError>(())
//! ```

use std::io::{Read, Seek, SeekFrom};
use std::iter::FusedIterator;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Mat3;

pub use crate::error::ScanError;
pub use crate::header::Header;
pub use crate::progress::{ProgressEstimator, ProgressReport};
pub use crate::reader::{padding, round_up};

mod error;
mod header;
pub mod progress;
pub mod reader;

pub type BoxVec = Mat3;

/// A handle to interrupt a running walk from elsewhere.
///
/// Cloned handles share their state. The token is checked once per frame.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
    /// Return [`ScanError::InvalidMagic`] when a header does not start with [`Header::MAGIC`].
    ///
    /// By default, a bad magic number is only logged and the frame is counted anyway.
    pub strict_magic: bool,
    pub cancel: Option<CancelToken>,
}

impl ScanOptions {
    pub fn strict_magic(mut self, strict: bool) -> Self {
        self.strict_magic = strict;
        self
    }

    pub fn cancel_with(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Metadata for a single frame, as found by an [`XTCWalker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Index of this frame in the trajectory, starting at zero.
    pub index: u64,
    /// Position of the frame header, relative to where the walk started.
    pub offset: u64,
    pub header: Header,
    /// The number of bytes this frame occupies, header and padding included.
    pub size: u64,
}

/// The result of walking an entire trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySummary {
    pub frame_count: u64,
    /// The number of atoms, as reported by the last frame.
    pub atom_count: u32,
    /// Time of the last frame in picoseconds.
    pub final_sim_time_ps: f32,
    pub final_step: u32,
    /// The number of bytes covered by the frames that were walked.
    pub nbytes: u64,
}

impl TrajectorySummary {
    fn from_last(last: &FrameInfo) -> Self {
        Self {
            frame_count: last.index + 1,
            atom_count: last.header.natoms,
            final_sim_time_ps: last.header.time,
            final_step: last.header.step,
            nbytes: last.offset + last.size,
        }
    }
}

/// Walks the chain of frames in an xtc trajectory, one header at a time.
#[derive(Debug, Clone)]
pub struct XTCWalker<R> {
    pub file: R,
    options: ScanOptions,
    /// Offset of the next header, relative to the start of the walk.
    offset: u64,
    nframes: u64,
    /// Stream position of the first header, known once the walk has begun.
    start: Option<u64>,
    /// The most recent frame, which the summary is built from.
    last: Option<FrameInfo>,
    /// Set once the walk ended, either at the end of the source or on an error.
    done: bool,
    warned_magic: bool,
}

impl XTCWalker<std::fs::File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        Self::open_with_options(path, ScanOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        options: ScanOptions,
    ) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ScanError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::with_options(file, options))
    }
}

impl<R: Read + Seek> XTCWalker<R> {
    /// Create a walker over `reader`, which must be positioned at the start of a frame.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ScanOptions::default())
    }

    pub fn with_options(reader: R, options: ScanOptions) -> Self {
        Self {
            file: reader,
            options,
            offset: 0,
            nframes: 0,
            start: None,
            last: None,
            done: false,
            warned_magic: false,
        }
    }

    /// The number of frames walked so far.
    pub fn frames(&self) -> u64 {
        self.nframes
    }

    /// Reads the next header and skips past its payload.
    ///
    /// Returns `Ok(None)` once no complete header can be read anymore. A partial header at the
    /// end of the source is treated the same as a clean end of file.
    ///
    /// After the walk has ended, or after an error, this keeps returning `Ok(None)` until the
    /// walker is sent [`home`](XTCWalker::home).
    pub fn next_frame(&mut self) -> Result<Option<FrameInfo>, ScanError> {
        if self.done {
            return Ok(None);
        }
        let next = self.advance();
        match &next {
            Ok(Some(frame)) => self.last = Some(*frame),
            Ok(None) | Err(_) => self.done = true,
        }
        next
    }

    fn advance(&mut self) -> Result<Option<FrameInfo>, ScanError> {
        if self.options.is_cancelled() {
            return Err(ScanError::Cancelled {
                frames: self.nframes,
            });
        }

        if self.start.is_none() {
            self.start = Some(self.file.stream_position()?);
        }

        let mut buf = [0; Header::SIZE];
        match self.file.read_exact(&mut buf) {
            Ok(()) => {}
            // We have found the end of the file. No more frames, we're done.
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                tracing::debug!(
                    frames = self.nframes,
                    offset = self.offset,
                    "no complete header left, ending walk"
                );
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }
        let Some(header) = Header::decode(&buf) else {
            return Ok(None);
        };

        if !header.has_valid_magic() {
            if self.options.strict_magic {
                return Err(ScanError::InvalidMagic {
                    frame: self.nframes,
                    offset: self.offset,
                    magic: header.magic,
                });
            }
            if !self.warned_magic {
                tracing::warn!(
                    frame = self.nframes,
                    offset = self.offset,
                    magic = header.magic,
                    "found unexpected magic number, continuing anyway"
                );
                self.warned_magic = true;
            }
        }

        // Skipping beyond the end is fine. The next header read will just come up short.
        let skip = header.skip();
        self.file.seek(SeekFrom::Current(skip as i64))?;

        let frame = FrameInfo {
            index: self.nframes,
            offset: self.offset,
            header,
            size: header.frame_size(),
        };
        tracing::trace!(
            index = frame.index,
            offset = frame.offset,
            natoms = header.natoms,
            time = header.time,
            nbytes = header.nbytes,
            "frame"
        );
        self.offset += frame.size;
        self.nframes += 1;

        Ok(Some(frame))
    }

    /// Walk all remaining frames, calling `on_frame` for each of them.
    ///
    /// The summary covers every frame since the start of the walk, including those that were
    /// walked before this call.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EmptyOrCorruptFile`] if no frame at all was found.
    pub fn walk<F: FnMut(&FrameInfo)>(
        &mut self,
        mut on_frame: F,
    ) -> Result<TrajectorySummary, ScanError> {
        while let Some(frame) = self.next_frame()? {
            on_frame(&frame);
        }

        let summary = self
            .last
            .as_ref()
            .map(TrajectorySummary::from_last)
            .ok_or(ScanError::EmptyOrCorruptFile)?;
        tracing::debug!(
            frames = summary.frame_count,
            natoms = summary.atom_count,
            nbytes = summary.nbytes,
            "walk complete"
        );
        Ok(summary)
    }

    /// Go back to where the walk started, and reset the frame count.
    pub fn home(&mut self) -> std::io::Result<()> {
        if let Some(start) = self.start {
            self.file.seek(SeekFrom::Start(start))?;
        }
        self.offset = 0;
        self.nframes = 0;
        self.last = None;
        self.done = false;
        self.warned_magic = false;
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for XTCWalker<R> {
    type Item = Result<FrameInfo, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

impl<R: Read + Seek> FusedIterator for XTCWalker<R> {}

/// Walk the trajectory at `path` and summarize it.
///
/// The file is closed again before this function returns, whether it succeeds or not.
pub fn scan<P: AsRef<Path>>(path: P) -> Result<TrajectorySummary, ScanError> {
    scan_path_with(path, &ScanOptions::default(), |_| {})
}

/// Walk a trajectory from any seekable source, starting at its current position.
pub fn scan_reader<R: Read + Seek>(reader: R) -> Result<TrajectorySummary, ScanError> {
    scan_with(reader, &ScanOptions::default(), |_| {})
}

/// Like [`scan_reader`], but calls `on_frame` for every frame that is found.
pub fn scan_with<R, F>(
    reader: R,
    options: &ScanOptions,
    on_frame: F,
) -> Result<TrajectorySummary, ScanError>
where
    R: Read + Seek,
    F: FnMut(&FrameInfo),
{
    XTCWalker::with_options(reader, options.clone()).walk(on_frame)
}

/// Like [`scan`], but calls `on_frame` for every frame that is found.
pub fn scan_path_with<P, F>(
    path: P,
    options: &ScanOptions,
    on_frame: F,
) -> Result<TrajectorySummary, ScanError>
where
    P: AsRef<Path>,
    F: FnMut(&FrameInfo),
{
    XTCWalker::open_with_options(path, options.clone())?.walk(on_frame)
}

/// Returns the offsets of all frames in `reader`.
///
/// The first value is always zero, relative to the starting position of `reader`. An empty
/// trajectory produces an empty list rather than an error.
pub fn frame_offsets<R: Read + Seek>(reader: R) -> Result<Box<[u64]>, ScanError> {
    XTCWalker::new(reader)
        .map(|frame| frame.map(|frame| frame.offset))
        .collect()
}
