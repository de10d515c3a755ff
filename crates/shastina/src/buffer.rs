use alloc::{vec, vec::Vec};
use core::ffi::CStr;
use core::fmt;

use bstr::ByteSlice;

/// Maximum capacity of the block buffer in bytes, including the reserved
/// terminator slot. The longest representable block is one byte shorter.
pub const MAX_BUFFER: usize = 32767;

/// Initial capacity of the block buffer, including the terminator slot.
const MIN_BUFFER: usize = 32;

/// Marker for an append or widen that would exceed [`MAX_BUFFER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BufferFull;

/// The growable output buffer a block reader accumulates token and string
/// bytes into.
///
/// The backing store is kept at capacity length and zero-filled past the
/// data, so `data[len]` is always a zero terminator. A NUL byte appended as
/// data sets a sticky flag that invalidates the C-string view.
pub(crate) struct BlockBuffer {
    data: Vec<u8>,
    len: usize,
    null_seen: bool,
}

impl BlockBuffer {
    pub(crate) fn new() -> Self {
        Self {
            data: vec![0; MIN_BUFFER],
            len: 0,
            null_seen: false,
        }
    }

    /// Empties the buffer and clears the null-seen flag. The backing
    /// allocation is retained and re-zeroed.
    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.null_seen = false;
        self.data.fill(0);
    }

    /// Appends one byte, doubling capacity as needed up to [`MAX_BUFFER`].
    ///
    /// Fails without changing the buffer when the append would consume the
    /// terminator slot of a buffer already at maximum capacity.
    pub(crate) fn push(&mut self, b: u8) -> Result<(), BufferFull> {
        if self.len + 1 >= self.data.len() {
            if self.data.len() >= MAX_BUFFER {
                return Err(BufferFull);
            }
            let cap = (self.data.len() * 2).min(MAX_BUFFER);
            self.data.resize(cap, 0);
        }
        if b == 0 {
            self.null_seen = true;
        }
        self.data[self.len] = b;
        self.len += 1;
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// A NUL-terminated view of the data, or `None` when the data itself
    /// contains a NUL byte.
    pub(crate) fn as_c_str(&self) -> Option<&CStr> {
        if self.null_seen {
            return None;
        }
        CStr::from_bytes_with_nul(&self.data[..=self.len]).ok()
    }
}

impl fmt::Debug for BlockBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockBuffer")
            .field("data", &self.as_bytes().as_bstr())
            .field("null_seen", &self.null_seen)
            .finish()
    }
}
