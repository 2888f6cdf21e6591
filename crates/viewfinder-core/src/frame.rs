//! NV21 frame view and frame-level errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("buffer length mismatch: expected {expected} luma/chroma bytes, got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },
    #[error("dimension mismatch: output holds {actual} pixels, frame needs {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("odd frame dimensions {width}x{height}: 4:2:0 chroma needs even width and height")]
    OddDimensions { width: u32, height: u32 },
    #[error("empty frame ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("frame dimensions {width}x{height} overflow the address space")]
    TooLarge { width: u32, height: u32 },
}

/// A borrowed NV21 (YUV420SP) frame.
///
/// Layout: `width * height` luma bytes, then `width * height / 2` bytes of
/// interleaved V/U pairs, one pair per 2×2 luma block.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    /// Wrap a raw buffer, checking that its length matches the dimensions.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, FrameError> {
        let expected = Self::byte_len(width, height)?;
        if data.len() != expected {
            return Err(FrameError::BufferLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Required NV21 byte length for the given dimensions.
    pub fn byte_len(width: u32, height: u32) -> Result<usize, FrameError> {
        let pixels = Self::pixel_count(width, height)?;
        pixels
            .checked_add(pixels / 2)
            .ok_or(FrameError::TooLarge { width, height })
    }

    /// Number of luma samples (and output pixels) for the given dimensions.
    pub fn pixel_count(width: u32, height: u32) -> Result<usize, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(FrameError::OddDimensions { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .ok_or(FrameError::TooLarge { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of luma samples.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Always false: empty frames are rejected by [`Frame::new`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The full-resolution luma plane.
    pub fn luma(&self) -> &'a [u8] {
        &self.data[..self.len()]
    }

    /// The interleaved V/U plane.
    pub fn chroma(&self) -> &'a [u8] {
        &self.data[self.len()..]
    }

    /// The raw NV21 bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }
}
