//! Clipped global histogram equalization of the luma channel.
//!
//! Builds a luma histogram whose bins saturate at a clip limit, integrates
//! it into a cumulative distribution normalized by the full pixel count,
//! and turns that CDF into a luma tone curve. Mass above the clip limit is
//! discarded rather than redistributed, so the CDF tops out below 1.0 when
//! any bin saturates. There is no spatial tiling.

use crate::convert::offset_luma;
use crate::decode::LumaRemap;
use crate::frame::Frame;
use crate::histogram::{Histogram, BINS};
use thiserror::Error;

/// Clip fraction used by the viewfinder preview.
pub const DEFAULT_CLIP_FRACTION: f64 = 0.10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EqualizeError {
    #[error("invalid clip fraction {0}: must be finite and greater than zero")]
    InvalidClipFraction(f64),
}

/// Normalized cumulative distribution over 256 luma bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Cdf {
    values: [f64; BINS],
}

impl Default for Cdf {
    fn default() -> Self {
        Self { values: [0.0; BINS] }
    }
}

impl Cdf {
    /// Integrate `histogram`, dividing every bin by `total` samples.
    ///
    /// A zero `total` yields an all-zero distribution.
    pub fn integrate(histogram: &Histogram, total: u64) -> Self {
        let mut cdf = Self::default();
        cdf.integrate_into(histogram, total);
        cdf
    }

    fn integrate_into(&mut self, histogram: &Histogram, total: u64) {
        if total == 0 {
            self.values.fill(0.0);
            return;
        }
        let total = total as f64;
        let mut running = 0.0;
        for (v, &count) in self.values.iter_mut().zip(histogram.bins().iter()) {
            running += count as f64 / total;
            *v = running;
        }
    }

    pub fn get(&self, bin: u8) -> f64 {
        self.values[bin as usize]
    }

    pub fn values(&self) -> &[f64; BINS] {
        &self.values
    }
}

/// Luma lookup table derived from a CDF: `round(cdf[y] * 255)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneCurve {
    table: [u8; BINS],
}

impl Default for ToneCurve {
    fn default() -> Self {
        Self::identity()
    }
}

impl ToneCurve {
    pub fn identity() -> Self {
        let mut table = [0u8; BINS];
        for (i, t) in table.iter_mut().enumerate() {
            *t = i as u8;
        }
        Self { table }
    }

    pub fn from_cdf(cdf: &Cdf) -> Self {
        let mut curve = Self { table: [0; BINS] };
        curve.fill_from(cdf);
        curve
    }

    fn fill_from(&mut self, cdf: &Cdf) {
        for (t, &c) in self.table.iter_mut().zip(cdf.values().iter()) {
            *t = (c * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }

    pub fn table(&self) -> &[u8; BINS] {
        &self.table
    }
}

impl LumaRemap for ToneCurve {
    #[inline(always)]
    fn remap(&self, luma: u8) -> u8 {
        self.table[luma as usize]
    }
}

/// Result of equalizing one frame.
#[derive(Debug, Clone, Default)]
pub struct Equalization {
    histogram: Histogram,
    cdf: Cdf,
    curve: ToneCurve,
    clip_limit: u32,
    pixels: u64,
    clipped: u64,
}

impl Equalization {
    /// Clipped luma histogram (indexed by offset luma).
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn cdf(&self) -> &Cdf {
        &self.cdf
    }

    pub fn curve(&self) -> &ToneCurve {
        &self.curve
    }

    /// Per-bin ceiling used for this frame.
    pub fn clip_limit(&self) -> u32 {
        self.clip_limit
    }

    /// Number of luma samples in the frame.
    pub fn pixels(&self) -> u64 {
        self.pixels
    }

    /// Samples discarded because their bin was full.
    pub fn clipped(&self) -> u64 {
        self.clipped
    }

    /// Enhanced value for an offset luma sample.
    pub fn remap(&self, luma: u8) -> u8 {
        self.curve.remap(luma)
    }
}

/// Per-pipeline equalizer owning its histogram/CDF working storage.
#[derive(Debug, Clone)]
pub struct HistogramEqualizer {
    clip_fraction: f64,
    current: Equalization,
}

impl HistogramEqualizer {
    pub fn new(clip_fraction: f64) -> Result<Self, EqualizeError> {
        if !clip_fraction.is_finite() || clip_fraction <= 0.0 {
            return Err(EqualizeError::InvalidClipFraction(clip_fraction));
        }
        Ok(Self {
            clip_fraction,
            current: Equalization::default(),
        })
    }

    pub fn clip_fraction(&self) -> f64 {
        self.clip_fraction
    }

    /// Clip limit for a frame of `pixels` luma samples.
    pub fn clip_limit(&self, pixels: usize) -> u32 {
        // `as` saturates for fractions large enough to exceed u32.
        (pixels as f64 * self.clip_fraction).floor() as u32
    }

    /// Recompute histogram, CDF and tone curve for `frame`.
    pub fn equalize(&mut self, frame: &Frame<'_>) -> &Equalization {
        let pixels = frame.len();
        let limit = self.clip_limit(pixels);
        let eq = &mut self.current;

        eq.histogram.clear();
        let mut clipped = 0u64;
        for &y in frame.luma() {
            if !eq.histogram.add_clipped(offset_luma(y), limit) {
                clipped += 1;
            }
        }

        eq.cdf.integrate_into(&eq.histogram, pixels as u64);
        eq.curve.fill_from(&eq.cdf);
        eq.clip_limit = limit;
        eq.pixels = pixels as u64;
        eq.clipped = clipped;

        tracing::trace!(
            pixels,
            clip_limit = limit,
            clipped,
            cdf_top = eq.cdf.get(255),
            "luma histogram equalized"
        );
        &self.current
    }

    /// Result of the most recent [`equalize`](Self::equalize) call.
    pub fn equalization(&self) -> &Equalization {
        &self.current
    }
}
