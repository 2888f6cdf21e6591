//! Display-side rendering of processed frames: PNG bitmaps and JSON reports.

use anyhow::{Context, Result};
use image::RgbaImage;
use serde::Serialize;
use std::path::Path;
use viewfinder_core::{Channel, FrameReport, Mode, RgbStats};

/// Unpack 0xAARRGGBB pixels into an RGBA8 image.
pub fn to_rgba_image(width: u32, height: u32, pixels: &[u32]) -> Option<RgbaImage> {
    let raw: Vec<u8> = pixels
        .iter()
        .flat_map(|&p| {
            let [a, r, g, b] = p.to_be_bytes();
            [r, g, b, a]
        })
        .collect();
    RgbaImage::from_raw(width, height, raw)
}

pub fn save_png(path: &Path, report: &FrameReport<'_>) -> Result<()> {
    let img = to_rgba_image(report.width, report.height, report.pixels)
        .context("pixel buffer does not match frame dimensions")?;
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote frame");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ChannelHistograms {
    pub red: Vec<u32>,
    pub green: Vec<u32>,
    pub blue: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct LumaReport {
    pub pixels: u64,
    pub clip_limit: u32,
    pub clipped: u64,
    pub histogram: Vec<u32>,
    pub tone_curve: Vec<u8>,
}

/// Serializable summary of one processed frame.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub width: u32,
    pub height: u32,
    pub mode: Mode,
    pub stats: Option<RgbStats>,
    pub histograms: Option<ChannelHistograms>,
    pub luma: Option<LumaReport>,
}

impl StatsReport {
    pub fn from_frame(report: &FrameReport<'_>) -> Self {
        let histograms = report.histograms.map(|h| ChannelHistograms {
            red: h.histogram(Channel::Red).bins().to_vec(),
            green: h.histogram(Channel::Green).bins().to_vec(),
            blue: h.histogram(Channel::Blue).bins().to_vec(),
        });
        let luma = report.equalization.map(|eq| LumaReport {
            pixels: eq.pixels(),
            clip_limit: eq.clip_limit(),
            clipped: eq.clipped(),
            histogram: eq.histogram().bins().to_vec(),
            tone_curve: eq.curve().table().to_vec(),
        });
        Self {
            width: report.width,
            height: report.height,
            mode: report.mode,
            stats: report.stats,
            histograms,
            luma,
        }
    }
}
