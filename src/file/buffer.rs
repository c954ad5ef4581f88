use std::sync::Arc;

use crate::{Error::OutOfBounds, Result};

/// A cursored byte reader for class-file structures.
///
/// `Buffer` provides a position-tracked interface for reading binary data in the big-endian
/// layout the class-file format prescribes. It is used internally by the constant pool, the
/// attribute decoder and the class reader, but is also available for callers that need to
/// decode custom attribute blobs.
///
/// The buffer maintains an internal position cursor bounded by a `limit`, and performs bounds
/// checking on every read to prevent overruns when decoding malformed or truncated data. The
/// underlying bytes are shared (`Arc<[u8]>`), so slicing out a sub-range - an attribute body,
/// for instance - never copies.
///
/// # Features
///
/// - **Bounds checking**: all read operations validate data availability against `limit`
/// - **Position tracking**: maintains the current offset for sequential parsing
/// - **Backward seeking**: [`Buffer::reset`] may move the cursor anywhere within the limit,
///   which the class reader relies on for its deferred-completion re-read
/// - **Zero-copy slicing**: sub-buffers share the underlying allocation
///
/// # Examples
///
/// ```rust
/// use jvmscope::Buffer;
///
/// let mut buffer = Buffer::from_vec(vec![0x00, 0x34, 0x01, 0x02, 0x03, 0x04]);
/// assert_eq!(buffer.read_u16()?, 0x0034);
/// assert_eq!(buffer.read_u32()?, 0x0102_0304);
/// assert_eq!(buffer.pos(), 6);
///
/// buffer.reset(0)?;
/// assert_eq!(buffer.read_u8()?, 0x00);
/// # Ok::<(), jvmscope::Error>(())
/// ```
#[derive(Clone)]
pub struct Buffer {
    data: Arc<[u8]>,
    position: usize,
    limit: usize,
}

impl Buffer {
    /// Create a new `Buffer` over shared bytes, with the limit at the end of the data
    ///
    /// ## Arguments
    /// * 'data' - The bytes to read from
    #[must_use]
    pub fn new(data: Arc<[u8]>) -> Self {
        let limit = data.len();
        Buffer {
            data,
            position: 0,
            limit,
        }
    }

    /// Create a new `Buffer` from an owned byte vector
    ///
    /// ## Arguments
    /// * 'data' - The bytes to read from
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Buffer::new(Arc::from(data))
    }

    /// Returns the limit of the buffer, i.e. the number of readable bytes
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns true if the buffer has no readable bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    /// Returns true if there is more data between the cursor and the limit
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.limit
    }

    /// Get the current position of the cursor
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Move the cursor to an absolute position, forward or backward
    ///
    /// `reset(0)` after a full parse is legal and restores the ability to re-read the same
    /// stream.
    ///
    /// ## Arguments
    /// * 'pos' - The position to move the cursor to
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the position is beyond the limit
    pub fn reset(&mut self, pos: usize) -> Result<()> {
        if pos > self.limit {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Peek a single byte without moving the cursor
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the cursor is at or beyond the limit
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.limit {
            return Err(OutOfBounds);
        }
        Ok(self.data[self.position])
    }

    /// Move the cursor forward by N bytes
    ///
    /// ## Arguments
    /// * 'step' - Amount of bytes to skip
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if advancing by step would exceed the limit
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.limit - self.position {
            return Err(OutOfBounds);
        }

        self.position += step;
        Ok(())
    }

    /// Read a u1 from the current position and advance
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.position >= self.limit {
            return Err(OutOfBounds);
        }

        let value = self.data[self.position];
        self.position += 1;
        Ok(value)
    }

    /// Read a big-endian u2 from the current position and advance
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_array::<2>()?;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Read a big-endian u4 from the current position and advance
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Read a big-endian u8 (eight bytes) from the current position and advance
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.read_array::<8>()?;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Read a big-endian signed 32-bit integer from the current position and advance
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_array::<4>()?;
        Ok(i32::from_be_bytes(bytes))
    }

    /// Read a big-endian signed 64-bit integer from the current position and advance
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.read_array::<8>()?;
        Ok(i64::from_be_bytes(bytes))
    }

    /// Read a big-endian IEEE-754 single from the current position and advance
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read a big-endian IEEE-754 double from the current position and advance
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read exactly `out.len()` bytes into the provided slice and advance
    ///
    /// ## Arguments
    /// * 'out' - The destination to fill
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read(&mut self, out: &mut [u8]) -> Result<()> {
        let bytes = self.read_bytes(out.len())?;
        out.copy_from_slice(bytes);
        Ok(())
    }

    /// Borrow the next `len` bytes without copying and advance
    ///
    /// ## Arguments
    /// * 'len' - The number of bytes to read
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if reading would exceed the limit
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        if len > self.limit - self.position {
            return Err(OutOfBounds);
        }

        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    /// Slice out the next `len` bytes as an independent sub-buffer and advance
    ///
    /// The sub-buffer shares the underlying allocation and keeps absolute offsets: its cursor
    /// starts at the current position and its limit is `len` bytes further. Used for attribute
    /// bodies whose declared length is authoritative.
    ///
    /// ## Arguments
    /// * 'len' - The number of bytes the sub-buffer covers
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if slicing would exceed the limit
    pub fn slice(&mut self, len: usize) -> Result<Buffer> {
        if len > self.limit - self.position {
            return Err(OutOfBounds);
        }

        let start = self.position;
        self.position += len;

        Ok(Buffer {
            data: self.data.clone(),
            position: start,
            limit: start + len,
        })
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        if N > self.limit - self.position {
            return Err(OutOfBounds);
        }

        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.position..self.position + N]);
        self.position += N;
        Ok(bytes)
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.data.len())
            .field("position", &self.position)
            .field("limit", &self.limit)
            .finish()
    }
}
