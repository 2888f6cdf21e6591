//! 256-bin intensity histogram shared by equalization and statistics.

pub const BINS: usize = 256;

/// Raw moments of a histogram: sample count, Σ(bin·count), Σ(bin²·count).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub count: u64,
    pub sum: f64,
    pub sum_sq: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u32; BINS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { bins: [0; BINS] }
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.bins.fill(0);
    }

    /// Count one sample.
    #[inline(always)]
    pub fn add(&mut self, value: u8) {
        self.bins[value as usize] += 1;
    }

    /// Count one sample unless its bin already holds `limit` samples.
    ///
    /// Returns false when the sample was dropped.
    #[inline(always)]
    pub fn add_clipped(&mut self, value: u8, limit: u32) -> bool {
        let bin = &mut self.bins[value as usize];
        if *bin < limit {
            *bin += 1;
            true
        } else {
            false
        }
    }

    pub fn bins(&self) -> &[u32; BINS] {
        &self.bins
    }

    pub fn get(&self, value: u8) -> u32 {
        self.bins[value as usize]
    }

    /// Total number of counted samples.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&c| c as u64).sum()
    }

    pub fn moments(&self) -> Moments {
        let mut m = Moments {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
        };
        for (bin, &count) in self.bins.iter().enumerate() {
            let b = bin as f64;
            let c = count as f64;
            m.count += count as u64;
            m.sum += b * c;
            m.sum_sq += b * b * c;
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_total() {
        let mut h = Histogram::new();
        for v in [0u8, 0, 7, 255] {
            h.add(v);
        }
        assert_eq!(h.get(0), 2);
        assert_eq!(h.get(7), 1);
        assert_eq!(h.get(255), 1);
        assert_eq!(h.total(), 4);
    }

    #[test]
    fn test_add_clipped_stops_at_limit() {
        let mut h = Histogram::new();
        let kept = (0..10).filter(|_| h.add_clipped(42, 3)).count();
        assert_eq!(kept, 3);
        assert_eq!(h.get(42), 3);
    }

    #[test]
    fn test_zero_limit_drops_everything() {
        let mut h = Histogram::new();
        assert!(!h.add_clipped(1, 0));
        assert_eq!(h.total(), 0);
    }

    #[test]
    fn test_moments() {
        let mut h = Histogram::new();
        h.add(2);
        h.add(4);
        let m = h.moments();
        assert_eq!(m.count, 2);
        assert!((m.sum - 6.0).abs() < 1e-12);
        assert!((m.sum_sq - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_clear() {
        let mut h = Histogram::new();
        h.add(9);
        h.clear();
        assert_eq!(h, Histogram::default());
    }
}
