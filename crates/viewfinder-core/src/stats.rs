//! Per-channel intensity statistics over decoded ARGB pixels.
//!
//! Every pixel contributes to every channel histogram; mean and standard
//! deviation come from the histogram's first and second raw moments.

use crate::histogram::Histogram;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("histogram is empty: no samples to compute statistics from")]
    EmptyHistogram,
}

/// A color channel of a packed 0xAARRGGBB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    fn shift(self) -> u32 {
        match self {
            Channel::Red => 16,
            Channel::Green => 8,
            Channel::Blue => 0,
        }
    }

    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Extract this channel's 8-bit value from a packed pixel.
    #[inline(always)]
    pub fn extract(self, pixel: u32) -> u8 {
        ((pixel >> self.shift()) & 0xFF) as u8
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        })
    }
}

/// Mean, variance and standard deviation of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelStats {
    pub mean: f64,
    pub variance: f64,
    pub stddev: f64,
}

impl ChannelStats {
    pub fn from_histogram(histogram: &Histogram) -> Result<Self, StatsError> {
        let m = histogram.moments();
        if m.count == 0 {
            return Err(StatsError::EmptyHistogram);
        }
        let n = m.count as f64;
        let mean = m.sum / n;
        let second_moment = m.sum_sq / n;
        // E[x²] - E[x]² can dip below zero by rounding on flat images.
        let variance = (second_moment - mean * mean).max(0.0);
        Ok(Self {
            mean,
            variance,
            stddev: variance.sqrt(),
        })
    }
}

/// Statistics for all three color channels of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RgbStats {
    pub red: ChannelStats,
    pub green: ChannelStats,
    pub blue: ChannelStats,
}

impl RgbStats {
    pub fn get(&self, channel: Channel) -> &ChannelStats {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }
}

/// Overlay text: one line of means, one of standard deviations.
impl fmt::Display for RgbStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Mean (R,G,B): {}, {}, {}",
            Sig4(self.red.mean),
            Sig4(self.green.mean),
            Sig4(self.blue.mean)
        )?;
        write!(
            f,
            "Std Dev (R,G,B): {}, {}, {}",
            Sig4(self.red.stddev),
            Sig4(self.green.stddev),
            Sig4(self.blue.stddev)
        )
    }
}

/// Four significant digits, fixed notation.
struct Sig4(f64);

impl fmt::Display for Sig4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.0;
        if x == 0.0 || !x.is_finite() {
            return write!(f, "{x:.3}");
        }
        // Round first: a carry into the next power of ten moves the exponent.
        let scale = 10f64.powi(3 - magnitude(x));
        let rounded = (x * scale).round() / scale;
        let decimals = (3 - magnitude(rounded)).max(0) as usize;
        write!(f, "{rounded:.decimals$}")
    }
}

fn magnitude(x: f64) -> i32 {
    x.abs().log10().floor() as i32
}

/// Channel statistics calculator owning its per-channel histograms.
#[derive(Debug, Clone, Default)]
pub struct ChannelStatistics {
    histograms: [Histogram; 3],
}

impl ChannelStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the histogram for `channel` from `pixels` and summarize it.
    pub fn compute(
        &mut self,
        pixels: &[u32],
        channel: Channel,
    ) -> Result<ChannelStats, StatsError> {
        let hist = &mut self.histograms[channel.index()];
        hist.clear();
        for &px in pixels {
            hist.add(channel.extract(px));
        }
        ChannelStats::from_histogram(hist)
    }

    /// Build all three channel histograms in one pass and summarize them.
    pub fn compute_all(&mut self, pixels: &[u32]) -> Result<RgbStats, StatsError> {
        let [r, g, b] = &mut self.histograms;
        r.clear();
        g.clear();
        b.clear();
        for &px in pixels {
            r.add(Channel::Red.extract(px));
            g.add(Channel::Green.extract(px));
            b.add(Channel::Blue.extract(px));
        }
        Ok(RgbStats {
            red: ChannelStats::from_histogram(r)?,
            green: ChannelStats::from_histogram(g)?,
            blue: ChannelStats::from_histogram(b)?,
        })
    }

    /// Histogram from the most recent computation for `channel`.
    pub fn histogram(&self, channel: Channel) -> &Histogram {
        &self.histograms[channel.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argb(r: u8, g: u8, b: u8) -> u32 {
        0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    #[test]
    fn test_extract_channels() {
        let px = argb(0x12, 0x34, 0x56);
        assert_eq!(Channel::Red.extract(px), 0x12);
        assert_eq!(Channel::Green.extract(px), 0x34);
        assert_eq!(Channel::Blue.extract(px), 0x56);
    }

    #[test]
    fn test_uniform_image_has_zero_stddev() {
        let pixels = vec![argb(10, 128, 250); 1000];
        let stats = ChannelStatistics::new().compute_all(&pixels).unwrap();
        assert_eq!(stats.red.mean, 10.0);
        assert_eq!(stats.green.mean, 128.0);
        assert_eq!(stats.blue.mean, 250.0);
        for c in Channel::ALL {
            assert_eq!(stats.get(c).variance, 0.0, "{c} variance");
            assert_eq!(stats.get(c).stddev, 0.0, "{c} stddev");
        }
    }

    #[test]
    fn test_two_level_image() {
        let mut pixels = vec![argb(0, 0, 0); 50];
        pixels.extend(vec![argb(255, 255, 255); 50]);
        let stats = ChannelStatistics::new().compute(&pixels, Channel::Green).unwrap();
        assert!((stats.mean - 127.5).abs() < 1e-9);
        assert!((stats.stddev - 127.5).abs() < 1e-9);
        assert!((stats.variance - 127.5 * 127.5).abs() < 1e-6);
    }

    #[test]
    fn test_every_pixel_is_counted() {
        // Sampling every third pixel would see only the first value.
        let pixels = [argb(0, 0, 0), argb(90, 90, 90), argb(90, 90, 90)];
        let mut calc = ChannelStatistics::new();
        let stats = calc.compute(&pixels, Channel::Red).unwrap();
        assert!((stats.mean - 60.0).abs() < 1e-9);
        assert_eq!(calc.histogram(Channel::Red).total(), 3);
    }

    #[test]
    fn test_compute_matches_compute_all() {
        let pixels: Vec<u32> = (0..500u32)
            .map(|i| argb((i % 256) as u8, (i * 7 % 256) as u8, (i * 13 % 256) as u8))
            .collect();
        let mut calc = ChannelStatistics::new();
        let all = calc.compute_all(&pixels).unwrap();
        for c in Channel::ALL {
            let single = ChannelStatistics::new().compute(&pixels, c).unwrap();
            assert_eq!(*all.get(c), single, "{c}");
        }
    }

    #[test]
    fn test_compute_is_idempotent() {
        let pixels: Vec<u32> = (0..300u32).map(|i| argb(i as u8, 255 - i as u8, 77)).collect();
        let mut calc = ChannelStatistics::new();
        let first = calc.compute_all(&pixels).unwrap();
        let hist = calc.histogram(Channel::Red).clone();
        let second = calc.compute_all(&pixels).unwrap();
        assert_eq!(first, second);
        assert_eq!(&hist, calc.histogram(Channel::Red));
    }

    #[test]
    fn test_empty_pixels() {
        let mut calc = ChannelStatistics::new();
        assert_eq!(calc.compute(&[], Channel::Blue), Err(StatsError::EmptyHistogram));
        assert_eq!(calc.compute_all(&[]), Err(StatsError::EmptyHistogram));
    }

    #[test]
    fn test_overlay_text() {
        let stats = RgbStats {
            red: ChannelStats {
                mean: 123.456,
                variance: 0.0,
                stddev: 0.0,
            },
            green: ChannelStats {
                mean: 5.0,
                variance: 4.0,
                stddev: 2.0,
            },
            blue: ChannelStats {
                mean: 0.5,
                variance: 0.0,
                stddev: 12.3456,
            },
        };
        assert_eq!(
            stats.to_string(),
            "Mean (R,G,B): 123.5, 5.000, 0.5000\nStd Dev (R,G,B): 0.000, 2.000, 12.35"
        );

        // Rounding that carries into the next power of ten keeps 4 digits.
        let carry = RgbStats {
            red: ChannelStats {
                mean: 99.996,
                variance: 0.0,
                stddev: 9.99996,
            },
            green: ChannelStats {
                mean: 127.46,
                variance: 0.0,
                stddev: 0.99996,
            },
            blue: ChannelStats {
                mean: 254.96,
                variance: 0.0,
                stddev: 0.0,
            },
        };
        assert_eq!(
            carry.to_string(),
            "Mean (R,G,B): 100.0, 127.5, 255.0\nStd Dev (R,G,B): 10.00, 1.000, 0.000"
        );
    }

    #[test]
    fn test_sig4_rounding_carry() {
        let cases = [
            (9.99996, "10.00"),
            (99.996, "100.0"),
            (0.99996, "1.000"),
            (127.46, "127.5"),
            (999.96, "1000"),
            (-9.99996, "-10.00"),
        ];
        for (value, expected) in cases {
            assert_eq!(Sig4(value).to_string(), expected, "{value}");
        }
    }
}
