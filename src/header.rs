use crate::reader::{read_boxvec_at, read_f32_at, read_u32_at, round_up};
use crate::BoxVec;

/// The fixed-size header at the start of every xtc frame.
///
/// Only a handful of fields matter for walking a trajectory: the number of atoms, the time, and
/// above all `nbytes`, which tells how far the next frame lies.
///
/// # Layout
///
/// | offset | field             | type        |
/// |--------|-------------------|-------------|
/// | 0      | `magic`           | `u32`       |
/// | 4      | `natoms`          | `u32`       |
/// | 8      | `step`            | `u32`       |
/// | 12     | `time`            | `f32`       |
/// | 16     | `boxvec`          | `[f32; 9]`  |
/// | 52     | `natoms_repeated` | `u32`       |
/// | 56     | `precision`       | `f32`       |
/// | 60..88 | compression parameters (ignored) |
/// | 88     | `nbytes`          | `u32`       |
///
/// All values are big-endian.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Header {
    pub magic: u32,
    pub natoms: u32,
    pub step: u32,
    /// Time in picoseconds.
    pub time: f32,
    pub boxvec: BoxVec,
    pub natoms_repeated: u32,
    pub precision: f32,
    /// The number of payload bytes that follow this header, before padding.
    pub nbytes: u32,
}

impl Header {
    /// The size of an encoded header in bytes.
    pub const SIZE: usize = 92;
    pub const MAGIC: u32 = 1995;

    const OFFSET_NATOMS: usize = 4;
    const OFFSET_STEP: usize = 8;
    const OFFSET_TIME: usize = 12;
    const OFFSET_BOXVEC: usize = 16;
    const OFFSET_NATOMS_REPEATED: usize = 52;
    const OFFSET_PRECISION: usize = 56;
    const OFFSET_NBYTES: usize = 88;

    /// Decode a [`Header`] from the first [`Header::SIZE`] bytes of `bytes`.
    ///
    /// Returns [`None`] if fewer than [`Header::SIZE`] bytes are provided.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..Self::SIZE)?;
        Some(Self {
            magic: read_u32_at(bytes, 0)?,
            natoms: read_u32_at(bytes, Self::OFFSET_NATOMS)?,
            step: read_u32_at(bytes, Self::OFFSET_STEP)?,
            time: read_f32_at(bytes, Self::OFFSET_TIME)?,
            boxvec: read_boxvec_at(bytes, Self::OFFSET_BOXVEC)?,
            natoms_repeated: read_u32_at(bytes, Self::OFFSET_NATOMS_REPEATED)?,
            precision: read_f32_at(bytes, Self::OFFSET_PRECISION)?,
            nbytes: read_u32_at(bytes, Self::OFFSET_NBYTES)?,
        })
    }

    pub const fn has_valid_magic(&self) -> bool {
        self.magic == Self::MAGIC
    }

    /// The number of bytes between the end of this header and the start of the next one.
    ///
    /// This is `nbytes` rounded up to a whole number of words.
    pub const fn skip(&self) -> u64 {
        round_up(self.nbytes as u64)
    }

    /// The total number of bytes this frame occupies, header included.
    pub const fn frame_size(&self) -> u64 {
        Self::SIZE as u64 + self.skip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(natoms: u32, step: u32, time: f32, nbytes: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Header::SIZE);
        bytes.extend(Header::MAGIC.to_be_bytes());
        bytes.extend(natoms.to_be_bytes());
        bytes.extend(step.to_be_bytes());
        bytes.extend(time.to_be_bytes());
        for v in [2.5f32, 0.0, 0.0, 0.0, 3.5, 0.0, 0.0, 0.0, 4.5] {
            bytes.extend(v.to_be_bytes());
        }
        bytes.extend(natoms.to_be_bytes());
        bytes.extend(1000.0f32.to_be_bytes());
        bytes.resize(Header::OFFSET_NBYTES, 0);
        bytes.extend(nbytes.to_be_bytes());
        bytes
    }

    #[test]
    fn decode_fields() {
        let bytes = encoded(1000, 250, 12.5, 4021);
        assert_eq!(bytes.len(), Header::SIZE);
        let header = Header::decode(&bytes).unwrap();
        assert!(header.has_valid_magic());
        assert_eq!(header.natoms, 1000);
        assert_eq!(header.natoms_repeated, 1000);
        assert_eq!(header.step, 250);
        assert_eq!(header.time, 12.5);
        assert_eq!(header.precision, 1000.0);
        let boxvec = header.boxvec;
        assert_eq!([boxvec.x_axis.x, boxvec.y_axis.y, boxvec.z_axis.z], [2.5, 3.5, 4.5]);
        assert_eq!(boxvec.x_axis.y, 0.0);
        assert_eq!(header.nbytes, 4021);
        assert_eq!(header.skip(), 4024);
        assert_eq!(header.frame_size(), 92 + 4024);
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut bytes = encoded(12, 0, 0.0, 8);
        bytes.extend([0xff; 8]);
        let header = Header::decode(&bytes).unwrap();
        assert_eq!(header.nbytes, 8);
    }

    #[test]
    fn decode_short() {
        let bytes = encoded(12, 0, 0.0, 8);
        assert!(Header::decode(&bytes[..Header::SIZE - 1]).is_none());
        assert!(Header::decode(&[]).is_none());
    }

    #[test]
    fn unexpected_magic() {
        let mut bytes = encoded(12, 0, 0.0, 0);
        bytes[..4].copy_from_slice(&2023u32.to_be_bytes());
        let header = Header::decode(&bytes).unwrap();
        assert!(!header.has_valid_magic());
        assert_eq!(header.magic, 2023);
    }
}
