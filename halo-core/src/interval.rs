//! Bin-edge generation for mass and radius histograms.

use crate::errors::{HaloError, HaloResult, MathErrorKind};

/// `n + 1` logarithmically spaced edges between `min` and `max` (inclusive).
///
/// Successive edges have a constant ratio, so the edges are uniform in
/// log10 — the numpy `logspace(log10(min), log10(max), n + 1)` layout used
/// for mass-function binning.
///
/// # Errors
/// `min` and `max` must be positive with `min < max`, and `n ≥ 1`.
pub fn log_spaced_edges(min: f64, max: f64, n: usize) -> HaloResult<Vec<f64>> {
    validate_range(min, max, n, "log_spaced_edges")?;
    if min <= 0.0 {
        return Err(HaloError::math_error(
            "log_spaced_edges",
            MathErrorKind::OutOfRange,
            "min must be positive for logarithmic spacing",
        ));
    }

    let log_min = min.log10();
    let step = (max.log10() - log_min) / n as f64;

    let mut edges: Vec<f64> = (0..=n)
        .map(|i| 10f64.powf(log_min + step * i as f64))
        .collect();

    // Pin the end points so callers can compare against them exactly.
    edges[0] = min;
    edges[n] = max;
    Ok(edges)
}

/// `n + 1` exponentially spaced edges between `min` and `max`.
///
/// Edge `i` sits at `min + (max - min) · log10(i + 1) / log10(n + 1)`:
/// dense near `min`, sparse near `max`. Used for radius bins where the
/// inner profile needs resolution.
pub fn exp_spaced_edges(min: f64, max: f64, n: usize) -> HaloResult<Vec<f64>> {
    validate_range(min, max, n, "exp_spaced_edges")?;

    let span = max - min;
    let norm = ((n + 1) as f64).log10();

    let mut edges: Vec<f64> = (0..=n)
        .map(|i| min + span * ((i + 1) as f64).log10() / norm)
        .collect();

    edges[0] = min;
    edges[n] = max;
    Ok(edges)
}

/// Geometric center of a bin: `10^(log10(lo · hi) / 2)`.
pub fn log_center(lo: f64, hi: f64) -> f64 {
    10f64.powf((lo * hi).log10() / 2.0)
}

fn validate_range(min: f64, max: f64, n: usize, operation: &str) -> HaloResult<()> {
    if n == 0 {
        return Err(HaloError::math_error(
            operation,
            MathErrorKind::InvalidInput,
            "need at least one bin",
        ));
    }
    if !(min.is_finite() && max.is_finite()) {
        return Err(HaloError::math_error(
            operation,
            MathErrorKind::NotFinite,
            "bin range must be finite",
        ));
    }
    if min >= max {
        return Err(HaloError::math_error(
            operation,
            MathErrorKind::InvalidInput,
            "min must be less than max",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_edges_count_and_endpoints() {
        let edges = log_spaced_edges(1e10, 1e15, 10).unwrap();
        assert_eq!(edges.len(), 11);
        assert_eq!(edges[0], 1e10);
        assert_eq!(edges[10], 1e15);
    }

    #[test]
    fn test_log_edges_constant_ratio() {
        let edges = log_spaced_edges(1.0, 1e4, 4).unwrap();
        for pair in edges.windows(2) {
            assert!((pair[1] / pair[0] - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_log_edges_strictly_increasing() {
        let edges = log_spaced_edges(3.7, 412.0, 17).unwrap();
        for pair in edges.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_log_edges_reject_nonpositive_min() {
        assert!(log_spaced_edges(0.0, 10.0, 5).is_err());
        assert!(log_spaced_edges(-1.0, 10.0, 5).is_err());
    }

    #[test]
    fn test_exp_edges_endpoints_and_monotonic() {
        let edges = exp_spaced_edges(0.0, 2.0, 8).unwrap();
        assert_eq!(edges.len(), 9);
        assert_eq!(edges[0], 0.0);
        assert_eq!(edges[8], 2.0);
        for pair in edges.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_exp_edges_dense_near_min() {
        let edges = exp_spaced_edges(0.0, 1.0, 4).unwrap();
        let first = edges[1] - edges[0];
        let last = edges[4] - edges[3];
        assert!(first > last);
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert!(log_spaced_edges(1.0, 10.0, 0).is_err());
        assert!(exp_spaced_edges(1.0, 10.0, 0).is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(log_spaced_edges(10.0, 1.0, 4).is_err());
        assert!(exp_spaced_edges(10.0, 1.0, 4).is_err());
    }

    #[test]
    fn test_log_center() {
        assert!((log_center(1e10, 1e12) - 1e11).abs() < 1.0);
    }
}
