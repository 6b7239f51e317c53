//! Moving-average smoothing and statistical helpers.

use std::collections::VecDeque;

// === Statistical Functions ===

/// Calculate the arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the median of a slice of values.
///
/// Even-length inputs return the mean of the two middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

// === Streaming Filter ===

/// Trailing moving average over the last `window` samples.
///
/// Until the window fills, the mean is taken over the samples seen so far.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    window: usize,
    values: VecDeque<f64>,
}

impl SmoothingFilter {
    /// Create a filter. A zero window is treated as 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Push a sample and return the current smoothed value.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.values.len() == self.window {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.current().unwrap_or(value)
    }

    /// Current smoothed value, or `None` before the first sample.
    pub fn current(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop all buffered samples.
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_partial_window_uses_available_samples() {
        let mut filter = SmoothingFilter::new(3);
        assert_eq!(filter.current(), None);
        assert_eq!(filter.push(10.0), 10.0);
        assert_eq!(filter.push(40.0), 25.0);
        assert_eq!(filter.push(40.0), 30.0);
    }

    #[test]
    fn test_window_slides() {
        let mut filter = SmoothingFilter::new(3);
        for v in [10.0, 10.0, 10.0, 40.0, 40.0, 40.0] {
            filter.push(v);
        }
        assert_eq!(filter.current(), Some(40.0));
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_zero_window_clamped() {
        let mut filter = SmoothingFilter::new(0);
        assert_eq!(filter.window(), 1);
        filter.push(1.0);
        assert_eq!(filter.push(7.0), 7.0);
        filter.reset();
        assert!(filter.is_empty());
    }
}
