//! Cross-matching halos between two catalogs.
//!
//! Candidates are drawn from a mass window on the mass-sorted secondary
//! catalog, then filtered by periodic displacement. Among the survivors
//! the pair with the highest goodness wins, where goodness folds the
//! mass agreement and the displacement into one percentage:
//!
//! ```text
//! goodness = 100 · min(m₁,m₂)/max(m₁,m₂) · (1 − d/d_max)
//! ```
//!
//! Matched pairs feed the error statistics at the bottom of the module,
//! which quantify how the low-resolution masses deviate from their
//! high-resolution counterparts as a function of halo particle count.

use rayon::prelude::*;
use serde::Serialize;

use halo_core::interval::{log_center, log_spaced_edges};
use halo_core::search::{lower_bound_by_key, upper_bound_by_key};
use halo_core::{HaloError, HaloResult};
use halo_formats::matches::HaloMatch;
use halo_formats::rockstar::Halo;

/// Matching parameters.
#[derive(Debug, Clone, Copy)]
pub struct MatcherParams {
    /// Multiplicative half-width of the mass window: a secondary halo of
    /// mass m₂ is a candidate when m₁/offset < m₂ < m₁·offset.
    pub mass_offset: f64,
    /// Largest accepted center displacement, catalog length units.
    pub max_displacement: f64,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            mass_offset: 1.2,
            max_displacement: 0.5,
        }
    }
}

/// Separation of two points in a periodic box, minimum-image convention.
fn periodic_distance(a: [f64; 3], b: [f64; 3], box_size: f64) -> f64 {
    let mut sum = 0.0;
    for axis in 0..3 {
        let mut d = (a[axis] - b[axis]).abs();
        if d > box_size / 2.0 {
            d = box_size - d;
        }
        sum += d * d;
    }
    sum.sqrt()
}

fn goodness(primary_mass: f64, secondary_mass: f64, distance: f64, max_displacement: f64) -> f64 {
    let mass_agreement = primary_mass.min(secondary_mass) / primary_mass.max(secondary_mass);
    100.0 * mass_agreement * (1.0 - distance / max_displacement)
}

/// Matches every primary halo against the secondary catalog.
///
/// Primaries with no candidate inside both the mass window and the
/// displacement cut are dropped; the result carries found matches only,
/// sorted by primary id.
///
/// # Errors
/// Fails on a mass offset at or below 1, a non-positive displacement
/// cut, or a non-positive box size.
pub fn match_catalogs(
    primary: &[Halo],
    secondary: &[Halo],
    box_size: f64,
    params: &MatcherParams,
) -> HaloResult<Vec<HaloMatch>> {
    if !(params.mass_offset > 1.0) {
        return Err(HaloError::calculation_error(
            "match_catalogs",
            "mass offset must exceed 1",
        ));
    }
    if !(params.max_displacement > 0.0) || !(box_size > 0.0) {
        return Err(HaloError::calculation_error(
            "match_catalogs",
            "displacement cut and box size must be positive",
        ));
    }

    let mut by_mass: Vec<&Halo> = secondary.iter().collect();
    by_mass.sort_unstable_by(|a, b| a.mass.total_cmp(&b.mass));

    let mut matches: Vec<HaloMatch> = primary
        .par_iter()
        .filter_map(|halo| {
            let lo = lower_bound_by_key(&by_mass, halo.mass / params.mass_offset, |h| h.mass);
            let hi = upper_bound_by_key(&by_mass, halo.mass * params.mass_offset, |h| h.mass);

            let mut best: Option<(f64, &Halo)> = None;
            for candidate in &by_mass[lo..hi] {
                let distance = periodic_distance(halo.pos, candidate.pos, box_size);
                if distance >= params.max_displacement {
                    continue;
                }
                let g = goodness(halo.mass, candidate.mass, distance, params.max_displacement);
                if best.is_none_or(|(best_g, _)| g > best_g) {
                    best = Some((g, *candidate));
                }
            }

            best.map(|(g, matched)| HaloMatch {
                primary_id: halo.id,
                primary_mass: halo.mass,
                secondary_id: matched.id,
                secondary_mass: matched.mass,
                goodness: g,
            })
        })
        .collect();

    matches.sort_unstable_by_key(|m| m.primary_id);
    Ok(matches)
}

/// Relative mass deviation of one matched pair, primary taken as truth.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MassDeviation {
    pub primary_id: i64,
    /// Particle count of the primary halo.
    pub num_p: i64,
    /// (m₂ − m₁) / m₁.
    pub relative_error: f64,
}

/// Per-pair relative mass errors, with the primary particle count looked
/// up through `num_p_of` (an id-indexed accessor over the primary
/// catalog).
pub fn relative_errors(
    matches: &[HaloMatch],
    num_p_of: impl Fn(i64) -> Option<i64>,
) -> Vec<MassDeviation> {
    matches
        .iter()
        .filter_map(|m| {
            let num_p = num_p_of(m.primary_id)?;
            Some(MassDeviation {
                primary_id: m.primary_id,
                num_p,
                relative_error: (m.secondary_mass - m.primary_mass) / m.primary_mass,
            })
        })
        .collect()
}

/// Error statistics over one particle-count bin.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorBin {
    pub num_p_lo: f64,
    pub num_p_hi: f64,
    pub num_p_center: f64,
    pub count: usize,
    /// Mean relative error of the members, 0 for an empty bin.
    pub mean: f64,
    /// RMS deviation from the bin mean.
    pub scatter: f64,
}

/// Bins per-pair deviations by primary particle count, logarithmically.
///
/// # Errors
/// Fails when no deviations are supplied.
pub fn binned_errors(deviations: &[MassDeviation], n_bins: usize) -> HaloResult<Vec<ErrorBin>> {
    if deviations.is_empty() {
        return Err(HaloError::calculation_error(
            "binned_errors",
            "no matched pairs to bin",
        ));
    }

    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for d in deviations {
        lo = lo.min(d.num_p as f64);
        hi = hi.max(d.num_p as f64);
    }
    let edges = log_spaced_edges(lo, hi, n_bins)?;

    let bins = edges
        .windows(2)
        .enumerate()
        .map(|(i, edge)| {
            let (b_lo, b_hi) = (edge[0], edge[1]);
            let last = i == n_bins - 1;

            let members: Vec<f64> = deviations
                .iter()
                .filter(|d| {
                    let n = d.num_p as f64;
                    n >= b_lo && (n < b_hi || (last && n <= b_hi))
                })
                .map(|d| d.relative_error)
                .collect();

            let count = members.len();
            let mean = if count > 0 {
                members.iter().sum::<f64>() / count as f64
            } else {
                0.0
            };
            let scatter = if count > 0 {
                (members.iter().map(|e| (e - mean) * (e - mean)).sum::<f64>() / count as f64)
                    .sqrt()
            } else {
                0.0
            };

            ErrorBin {
                num_p_lo: b_lo,
                num_p_hi: b_hi,
                num_p_center: log_center(b_lo, b_hi),
                count,
                mean,
                scatter,
            }
        })
        .collect();

    Ok(bins)
}
