//! Projections of the total number of frames and the total duration of a trajectory, made while
//! it is still being walked.
//!
//! These estimates assume that all frames are about the same size. That is often true, but not
//! always (the compression ratio of a frame depends on its contents). Use the
//! [`TrajectorySummary`](crate::TrajectorySummary) of a finished walk for the actual values.

use crate::FrameInfo;

/// A report is produced every `REPORT_INTERVAL` frames.
pub const REPORT_INTERVAL: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    /// The number of frames observed so far.
    pub frames: u64,
    pub estimated_total_frames: f64,
    /// Projected time of the last frame in picoseconds.
    pub estimated_total_time: f64,
    pub percent_complete: f64,
}

/// Keeps a running mean of the number of bytes per frame.
#[derive(Debug, Default, Clone)]
pub struct ProgressEstimator {
    mean_frame_size: f64,
}

impl ProgressEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mean frame size over all frames observed so far.
    pub fn mean_frame_size(&self) -> f64 {
        self.mean_frame_size
    }

    /// Register a frame and, every [`REPORT_INTERVAL`] frames, return a [`ProgressReport`].
    ///
    /// - `frames` is the number of frames observed so far, including this one (1-based).
    /// - `nbytes` is the number of bytes this frame occupies, header and padding included.
    /// - `time` is the time of this frame in picoseconds.
    /// - `total_size` is the size of the whole source in bytes.
    ///
    /// A `frames` value of zero is ignored.
    pub fn on_frame_observed(
        &mut self,
        frames: u64,
        nbytes: u64,
        time: f32,
        total_size: u64,
    ) -> Option<ProgressReport> {
        if frames == 0 {
            return None;
        }

        self.mean_frame_size += (nbytes as f64 - self.mean_frame_size) / frames as f64;

        if frames % REPORT_INTERVAL != 0 || self.mean_frame_size <= 0.0 {
            return None;
        }

        let estimated_total_frames = total_size as f64 / self.mean_frame_size;
        Some(ProgressReport {
            frames,
            estimated_total_frames,
            estimated_total_time: time as f64 * estimated_total_frames / frames as f64,
            percent_complete: 100.0 * frames as f64 / estimated_total_frames,
        })
    }

    /// Convenience wrapper around [`ProgressEstimator::on_frame_observed`] for a [`FrameInfo`]
    /// as produced by the walker.
    pub fn observe(&mut self, frame: &FrameInfo, total_size: u64) -> Option<ProgressReport> {
        self.on_frame_observed(frame.index + 1, frame.size, frame.header.time, total_size)
    }
}
