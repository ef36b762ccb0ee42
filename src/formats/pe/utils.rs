//! Utility functions for PE parsing

use encoding_rs::{CoderResult, UTF_16LE};
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::formats::pe::types::{PeError, Result};

/// Extension trait for reading primitive types from byte slices
pub trait ReadExt {
    fn read_u16_le_at(&self, offset: usize) -> Option<u16>;
    fn read_u32_le_at(&self, offset: usize) -> Option<u32>;
    fn read_u64_le_at(&self, offset: usize) -> Option<u64>;
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]>;
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u16_le_at(&self, offset: usize) -> Option<u16> {
        self.read_slice_at(offset, 2)
            .and_then(|b| b.try_into().ok())
            .map(u16::from_le_bytes)
    }

    #[inline(always)]
    fn read_u32_le_at(&self, offset: usize) -> Option<u32> {
        self.read_slice_at(offset, 4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }

    #[inline(always)]
    fn read_u64_le_at(&self, offset: usize) -> Option<u64> {
        self.read_slice_at(offset, 8)
            .and_then(|b| b.try_into().ok())
            .map(u64::from_le_bytes)
    }

    #[inline(always)]
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.get(offset..end)
    }
}

/// Bounds oracle over a mapped image.
///
/// Every structure reached through a file-controlled offset goes through
/// `can_read` before its fields are looked at.
pub trait BoundsCheck {
    /// True iff `[offset, offset + len)` lies entirely inside the image.
    fn can_read(&self, offset: usize, len: usize) -> bool;
}

impl BoundsCheck for [u8] {
    #[inline(always)]
    fn can_read(&self, offset: usize, len: usize) -> bool {
        offset
            .checked_add(len)
            .is_some_and(|end| end <= self.len())
    }
}

/// Borrow a fixed-layout structure at `offset`, or `None` when it does not fit.
///
/// The returned reference points into `data`; nothing is copied.
#[inline]
pub fn read_struct<T>(data: &[u8], offset: usize) -> Option<&T>
where
    T: FromBytes + KnownLayout + Immutable,
{
    if !data.can_read(offset, std::mem::size_of::<T>()) {
        return None;
    }
    T::ref_from_prefix(&data[offset..]).ok().map(|(value, _)| value)
}

/// Decode UTF-16LE bytes, appending to `dst`.
///
/// Room for the worst-case output is reserved up front with a fallible
/// reservation, so running out of memory comes back as
/// `PeError::AllocationFailed` instead of aborting. Unpaired surrogates and a
/// dangling odd byte decode to U+FFFD. Returns whether any replacement
/// happened.
pub fn decode_utf16le_into(dst: &mut String, src: &[u8]) -> Result<bool> {
    let mut decoder = UTF_16LE.new_decoder_without_bom_handling();
    let needed = decoder
        .max_utf8_buffer_length(src.len())
        .ok_or(PeError::AllocationFailed {
            what: "decoded string",
            requested: usize::MAX,
        })?;
    dst.try_reserve(needed)
        .map_err(|_| PeError::AllocationFailed {
            what: "decoded string",
            requested: needed,
        })?;

    let (result, _read, had_errors) = decoder.decode_to_string(src, dst, true);
    match result {
        CoderResult::InputEmpty => Ok(had_errors),
        // Capacity was reserved for the worst case, so this means the
        // decoder's bound was wrong; treat it like any other allocation miss.
        CoderResult::OutputFull => Err(PeError::AllocationFailed {
            what: "decoded string",
            requested: needed,
        }),
    }
}

/// Wide-to-narrow decode of a resource name payload.
///
/// When `dst` is `None` a fresh buffer sized for the decoded text is
/// allocated; otherwise the caller's buffer is cleared and reused.
pub fn decode_wide_to_narrow(dst: Option<String>, src: &[u8]) -> Result<String> {
    let mut out = dst.unwrap_or_default();
    out.clear();
    decode_utf16le_into(&mut out, src)?;
    Ok(out)
}
