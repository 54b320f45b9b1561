//! Halo mass function.
//!
//! Halos are binned into logarithmically spaced mass intervals and each
//! bin is reported as a comoving number density, both per unit mass
//! (dn/dM/dV) and per logarithmic mass interval (dn/dlnM/dV).

use serde::Serialize;

use halo_core::interval::{log_center, log_spaced_edges};
use halo_core::{HaloError, HaloResult};

/// One mass bin of the mass function.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MassBin {
    /// Lower bin edge, inclusive.
    pub m_lo: f64,
    /// Upper bin edge, exclusive.
    pub m_hi: f64,
    /// Logarithmic bin center.
    pub m_center: f64,
    /// Mean mass of the members, 0 for an empty bin.
    pub m_mean: f64,
    /// Number of halos in the bin.
    pub count: usize,
    /// Number density per unit mass, dn/dM/dV.
    pub dn_dm_dv: f64,
    /// Number density per logarithmic mass interval, dn/dlnM/dV.
    pub dn_dlnm_dv: f64,
}

/// A binned halo mass function.
#[derive(Debug, Clone, Serialize)]
pub struct MassFunction {
    pub bins: Vec<MassBin>,
    /// Comoving box volume the densities are normalized by.
    pub volume: f64,
}

/// Bins `masses` into `n_bins` logarithmic intervals across their full
/// range and normalizes counts by the volume of a box of side
/// `box_length`.
///
/// Membership is `m_lo <= m < m_hi`; the largest halo lands in the last
/// bin because the top edge is pinned to the maximum mass and the
/// comparison against it is widened to inclusive. A population sharing
/// a single mass is binned across a widened range centered on it.
///
/// # Errors
/// Fails on an empty mass list, a non-positive box length, or
/// non-positive masses.
pub fn mass_function(masses: &[f64], box_length: f64, n_bins: usize) -> HaloResult<MassFunction> {
    if masses.is_empty() {
        return Err(HaloError::calculation_error(
            "mass_function",
            "no halo masses supplied",
        ));
    }
    if !(box_length > 0.0) {
        return Err(HaloError::calculation_error(
            "mass_function",
            "box length must be positive",
        ));
    }

    let (mut m_min, mut m_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &m in masses {
        m_min = m_min.min(m);
        m_max = m_max.max(m);
    }
    // All halos at one mass: widen the range around it so the binning
    // stays defined.
    if m_min == m_max {
        m_min /= 2.0;
        m_max *= 2.0;
    }

    let edges = log_spaced_edges(m_min, m_max, n_bins)?;
    let volume = box_length.powi(3);

    let bins = edges
        .windows(2)
        .enumerate()
        .map(|(i, edge)| {
            let (m_lo, m_hi) = (edge[0], edge[1]);
            let last = i == n_bins - 1;

            let mut count = 0usize;
            let mut m_sum = 0.0;
            for &m in masses {
                let inside = m >= m_lo && (m < m_hi || (last && m <= m_hi));
                if inside {
                    count += 1;
                    m_sum += m;
                }
            }

            let m_mean = if count > 0 { m_sum / count as f64 } else { 0.0 };
            let n = count as f64;

            MassBin {
                m_lo,
                m_hi,
                m_center: log_center(m_lo, m_hi),
                m_mean,
                count,
                dn_dm_dv: n / ((m_hi - m_lo) * volume),
                dn_dlnm_dv: n / ((m_hi.ln() - m_lo.ln()) * volume),
            }
        })
        .collect();

    Ok(MassFunction { bins, volume })
}
