//! Reusable per-pipeline frame storage.
//!
//! Capture sources recycle their buffers as soon as the delivery callback
//! returns, so each frame is copied into storage owned here. Storage is
//! sized from the first frame and only reallocated when the dimensions
//! change.

use crate::frame::{Frame, FrameError};

#[derive(Debug, Default)]
pub struct FrameBufferManager {
    width: u32,
    height: u32,
    input: Vec<u8>,
    output: Vec<u32>,
    reallocations: u64,
}

impl FrameBufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy a delivered frame into the owned input buffer.
    ///
    /// The frame is validated before any storage is touched: a rejected
    /// frame leaves the previous frame's buffers intact.
    pub fn ingest(&mut self, width: u32, height: u32, data: &[u8]) -> Result<(), FrameError> {
        let frame = Frame::new(width, height, data)?;

        if !self.is_sized_for(width, height) {
            self.reinitialize(width, height, frame.len(), data.len());
        }
        self.input.copy_from_slice(data);
        Ok(())
    }

    fn is_sized_for(&self, width: u32, height: u32) -> bool {
        self.reallocations > 0 && self.width == width && self.height == height
    }

    fn reinitialize(&mut self, width: u32, height: u32, pixels: usize, bytes: usize) {
        if self.reallocations == 0 {
            tracing::info!(width, height, "allocating frame buffers");
        } else {
            tracing::info!(
                old_width = self.width,
                old_height = self.height,
                width,
                height,
                "frame dimensions changed, reallocating buffers"
            );
        }
        self.width = width;
        self.height = height;
        self.input = vec![0; bytes];
        self.output = vec![0; pixels];
        self.reallocations += 1;
    }

    /// Current dimensions, or `None` before the first frame.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        (self.reallocations > 0).then_some((self.width, self.height))
    }

    /// How many times storage has been (re)allocated.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    /// The most recently ingested frame.
    pub fn frame(&self) -> Option<Frame<'_>> {
        let (width, height) = self.dimensions()?;
        Frame::new(width, height, &self.input).ok()
    }

    /// The decoded pixel buffer (`width * height` packed ARGB values).
    pub fn pixels(&self) -> &[u32] {
        &self.output
    }

    /// Borrow the ingested frame and the output buffer together for decoding.
    pub fn split(&mut self) -> Option<(Frame<'_>, &mut [u32])> {
        let (width, height) = self.dimensions()?;
        let frame = Frame::new(width, height, &self.input).ok()?;
        Some((frame, &mut self.output))
    }
}
