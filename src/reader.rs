//! Big-endian decoding of the fixed-width values in an xtc frame header.
//!
//! Everything in an xtc file is stored as XDR, which means big-endian 32-bit words. These
//! functions read such words from a byte slice at some offset. They return [`None`] rather than
//! panicking when the slice is too short.

use crate::BoxVec;

/// The number of bytes in one XDR word.
pub const WORD: usize = 4;

#[inline]
fn word_at(bytes: &[u8], at: usize) -> Option<[u8; WORD]> {
    let end = at.checked_add(WORD)?;
    bytes.get(at..end)?.try_into().ok()
}

#[inline]
pub fn read_u32_at(bytes: &[u8], at: usize) -> Option<u32> {
    word_at(bytes, at).map(u32::from_be_bytes)
}

#[inline]
pub fn read_i32_at(bytes: &[u8], at: usize) -> Option<i32> {
    word_at(bytes, at).map(i32::from_be_bytes)
}

#[inline]
pub fn read_f32_at(bytes: &[u8], at: usize) -> Option<f32> {
    word_at(bytes, at).map(f32::from_be_bytes)
}

/// Reads the nine values of a box matrix starting at `at`.
///
/// The values are stored as three consecutive box vectors, which become the columns of the
/// returned [`BoxVec`].
pub fn read_boxvec_at(bytes: &[u8], at: usize) -> Option<BoxVec> {
    let mut values = [0.0; 9];
    for (i, value) in values.iter_mut().enumerate() {
        *value = read_f32_at(bytes, at + i * WORD)?;
    }
    let cols = [
        [values[0], values[1], values[2]],
        [values[3], values[4], values[5]],
        [values[6], values[7], values[8]],
    ];
    Some(BoxVec::from_cols_array_2d(&cols))
}

/// The number of padding bytes the XDR encoder appends after `nbytes` of opaque data, such that
/// the next value starts on a word boundary.
#[inline]
pub const fn padding(nbytes: u64) -> u64 {
    (WORD as u64 - nbytes % WORD as u64) % WORD as u64
}

/// Rounds `nbytes` up to the next multiple of four. Multiples of four are left alone.
#[inline]
pub const fn round_up(nbytes: u64) -> u64 {
    nbytes + padding(nbytes)
}
