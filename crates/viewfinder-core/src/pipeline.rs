//! Per-frame handler: ingest, optional equalization, decode, statistics.

use crate::buffers::FrameBufferManager;
use crate::decode::{decode_grayscale_into, decode_into, LumaRemap};
use crate::equalize::{EqualizeError, Equalization, HistogramEqualizer};
use crate::frame::FrameError;
use crate::stats::{ChannelStatistics, RgbStats};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which decode path a frame takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Plain color conversion.
    #[default]
    Original,
    /// Color conversion after clipped histogram equalization of luma.
    #[serde(alias = "processed")]
    Enhanced,
    /// Luma only.
    Grayscale,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Original => "original",
            Mode::Enhanced => "enhanced",
            Mode::Grayscale => "grayscale",
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "original" => Ok(Mode::Original),
            "enhanced" | "processed" => Ok(Mode::Enhanced),
            "grayscale" | "gray" => Ok(Mode::Grayscale),
            other => Err(format!(
                "unknown mode '{other}' (expected original, enhanced, or grayscale)"
            )),
        }
    }
}

/// Output of one processed frame, borrowed from the processor's storage.
pub struct FrameReport<'a> {
    pub width: u32,
    pub height: u32,
    pub mode: Mode,
    /// Decoded `width * height` packed ARGB pixels.
    pub pixels: &'a [u32],
    /// Luma equalization used for the frame (enhanced mode only).
    pub equalization: Option<&'a Equalization>,
    /// Channel statistics, `None` when disabled or when there was no data.
    pub stats: Option<RgbStats>,
    /// Channel histograms behind `stats`.
    pub histograms: Option<&'a ChannelStatistics>,
}

/// Synchronous frame handler owning all per-pipeline storage.
///
/// Not reentrant: give each concurrent caller its own processor.
pub struct FrameProcessor {
    buffers: FrameBufferManager,
    equalizer: HistogramEqualizer,
    statistics: ChannelStatistics,
    compute_stats: bool,
    frames: u64,
}

impl FrameProcessor {
    pub fn new(clip_fraction: f64, compute_stats: bool) -> Result<Self, EqualizeError> {
        let equalizer = HistogramEqualizer::new(clip_fraction)?;
        tracing::debug!(
            clip_fraction = equalizer.clip_fraction(),
            compute_stats,
            "frame processor ready"
        );
        Ok(Self {
            buffers: FrameBufferManager::new(),
            equalizer,
            statistics: ChannelStatistics::new(),
            compute_stats,
            frames: 0,
        })
    }

    /// Frames processed successfully so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn buffers(&self) -> &FrameBufferManager {
        &self.buffers
    }

    /// Process one delivered frame.
    ///
    /// A failed frame produces no output; the previous frame's pixels stay
    /// in the output buffer untouched.
    pub fn process(
        &mut self,
        width: u32,
        height: u32,
        data: &[u8],
        mode: Mode,
    ) -> Result<FrameReport<'_>, FrameError> {
        self.buffers.ingest(width, height, data)?;

        let (frame, out) = self
            .buffers
            .split()
            .ok_or(FrameError::Empty { width, height })?;
        match mode {
            Mode::Original => decode_into(&frame, None, out)?,
            Mode::Enhanced => {
                let eq = self.equalizer.equalize(&frame);
                decode_into(&frame, Some(eq.curve() as &dyn LumaRemap), out)?;
            }
            Mode::Grayscale => decode_grayscale_into(&frame, out)?,
        }
        self.frames += 1;

        let pixels = self.buffers.pixels();
        let stats = if self.compute_stats {
            match self.statistics.compute_all(pixels) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::debug!(error = %e, "no statistics for frame");
                    None
                }
            }
        } else {
            None
        };

        tracing::debug!(
            frame = self.frames,
            width,
            height,
            %mode,
            "frame processed"
        );

        Ok(FrameReport {
            width,
            height,
            mode,
            pixels,
            equalization: (mode == Mode::Enhanced).then(|| self.equalizer.equalization()),
            histograms: stats.is_some().then_some(&self.statistics),
            stats,
        })
    }
}
