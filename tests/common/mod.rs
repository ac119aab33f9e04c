//! Synthetic trajectories for the tests.
//!
//! The walker never looks at the payload of a frame, so these frames carry meaningless payload
//! bytes of the requested length. The headers are laid out like those of a real compressed xtc
//! frame.
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

pub const MAGIC: u32 = 1995;
pub const HEADER_SIZE: usize = 92;

#[derive(Debug, Clone, Copy)]
pub struct SyntheticFrame {
    pub magic: u32,
    pub natoms: u32,
    pub step: u32,
    pub time: f32,
    /// Value of the payload size field.
    pub nbytes: u32,
}

impl SyntheticFrame {
    pub fn new(natoms: u32, step: u32, time: f32, nbytes: u32) -> Self {
        Self {
            magic: MAGIC,
            natoms,
            step,
            time,
            nbytes,
        }
    }

    pub fn with_magic(self, magic: u32) -> Self {
        Self { magic, ..self }
    }

    pub fn header(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend(self.magic.to_be_bytes());
        bytes.extend(self.natoms.to_be_bytes());
        bytes.extend(self.step.to_be_bytes());
        bytes.extend(self.time.to_be_bytes());
        // Box vectors.
        for v in [5.0f32, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 5.0] {
            bytes.extend(v.to_be_bytes());
        }
        bytes.extend(self.natoms.to_be_bytes());
        bytes.extend(1000.0f32.to_be_bytes()); // Precision.
        // Minimum and maximum integer coordinates, and the smallidx.
        for v in [0i32, 0, 0, 5000, 5000, 5000, 12] {
            bytes.extend(v.to_be_bytes());
        }
        bytes.extend(self.nbytes.to_be_bytes());
        assert_eq!(bytes.len(), HEADER_SIZE);
        bytes
    }

    /// The header, followed by `nbytes` of payload and its padding.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = self.header();
        let nbytes = self.nbytes as usize;
        bytes.extend(std::iter::repeat(0xa5).take(nbytes));
        bytes.extend(std::iter::repeat(0).take((4 - nbytes % 4) % 4));
        bytes
    }

    pub fn encoded_len(&self) -> u64 {
        let nbytes = self.nbytes as u64;
        HEADER_SIZE as u64 + nbytes + (4 - nbytes % 4) % 4
    }
}

/// Frames with varying payload sizes, a step of 1000 and 2 ps between them.
pub fn frames(nframes: u32, natoms: u32) -> Vec<SyntheticFrame> {
    (0..nframes)
        .map(|i| SyntheticFrame::new(natoms, i * 1000, i as f32 * 2.0, 1000 + (i * 7) % 13))
        .collect()
}

pub fn trajectory(frames: &[SyntheticFrame]) -> Vec<u8> {
    frames.iter().flat_map(SyntheticFrame::encode).collect()
}

pub fn temp_trajectory(bytes: &[u8]) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

/// Write a real xtc trajectory using xdrfile.
///
/// Make sure to use more than nine atoms. Smaller frames are not compressed by the writer and do
/// not carry the compressed header layout.
pub fn write_xdr_trajectory(path: &Path, natoms: usize, nframes: usize) {
    use xdrfile::{Frame, Trajectory, XTCTrajectory};

    assert!(natoms > 9, "frames with nine atoms or fewer are stored uncompressed");
    let mut traj = XTCTrajectory::open_write(path).expect("could not open xtc file for writing");
    for fi in 0..nframes {
        let mut frame = Frame::new();
        frame.step = fi * 10;
        frame.time = fi as f32 * 0.5;
        frame.box_vector = [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]];
        frame.coords.extend((0..natoms).map(|ai| {
            let v = (ai * 3 + fi) as f32 * 0.013;
            [v % 4.0, (v * 1.7) % 4.0, (v * 2.3) % 4.0]
        }));
        traj.write(&frame).expect("could not write frame");
    }
}
