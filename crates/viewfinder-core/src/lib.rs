//! viewfinder-core — Per-frame pixel pipeline for NV21 camera previews.
//!
//! Decodes YUV420SP frames into packed ARGB, optionally flattens the luma
//! distribution with a clipped histogram equalization first, and computes
//! per-channel intensity statistics for on-screen display.

pub mod buffers;
pub mod convert;
pub mod decode;
pub mod equalize;
pub mod frame;
pub mod histogram;
pub mod pipeline;
pub mod stats;

pub use buffers::FrameBufferManager;
pub use decode::{decode_grayscale_into, decode_into, LumaRemap};
pub use equalize::{Cdf, EqualizeError, Equalization, HistogramEqualizer, ToneCurve};
pub use frame::{Frame, FrameError};
pub use histogram::Histogram;
pub use pipeline::{FrameProcessor, FrameReport, Mode};
pub use stats::{Channel, ChannelStatistics, ChannelStats, RgbStats, StatsError};
