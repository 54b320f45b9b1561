//! Halo mass profiles.
//!
//! For each halo, candidate particles come from a binary-search window on
//! the x-sorted particle array (`[x − rvir, x + rvir]`), then an explicit
//! box filter on y and z and a Euclidean distance cut. The sorted distance
//! array turns "particles within r" into a single [`upper_bound`] per
//! radius bin, so a whole profile costs one window scan plus one binary
//! search per bin.
//!
//! Densities are cumulative: N(≤r)·m_p / (4/3·π·r³), normalized by the
//! critical density. Stacking across halos of one mass bin produces the
//! mean profile and an RMS scatter — population statistics, not rigorous
//! estimators.

use rayon::prelude::*;
use serde::Serialize;

use halo_core::search::{lower_bound_by_key, upper_bound};
use halo_core::{HaloError, HaloResult};
use halo_formats::gadget::Particle;
use halo_formats::rockstar::Halo;

use std::f64::consts::PI;

/// Sorted distances from `halo`'s center to every particle inside its
/// virial-radius bounding box.
///
/// `particles` must be sorted by x (see
/// [`halo_formats::gadget::sort_by_x`]); the window narrows candidates
/// before the exact filter runs.
pub fn sorted_distances(halo: &Halo, particles: &[Particle]) -> Vec<f64> {
    let [x, y, z] = halo.pos;
    let r = halo.rvir;

    let lo = lower_bound_by_key(particles, x - r, |p| p.x);
    let hi = lower_bound_by_key(particles, x + r, |p| p.x);

    let mut distances: Vec<f64> = particles[lo..hi]
        .iter()
        .filter(|p| p.y > y - r && p.y < y + r && p.z > z - r && p.z < z + r)
        .map(|p| {
            let dx = p.x - x;
            let dy = p.y - y;
            let dz = p.z - z;
            (dx * dx + dy * dy + dz * dz).sqrt()
        })
        .collect();

    distances.sort_unstable_by(f64::total_cmp);
    distances
}

/// Cumulative density at each radius bin, in units of the critical
/// density.
///
/// `distances` must be sorted ascending. A halo with no particles in its
/// window yields zero at every bin, and a zero-radius bin (the first
/// edge of an exponential spacing) yields zero rather than dividing by
/// its zero volume.
pub fn density_profile(
    distances: &[f64],
    rbins: &[f64],
    particle_mass: f64,
    rho_crit: f64,
) -> Vec<f64> {
    rbins
        .iter()
        .map(|&r| {
            let n = upper_bound(distances, r);
            if n == 0 || r <= 0.0 {
                return 0.0;
            }
            n as f64 * particle_mass / (4.0 / 3.0 * PI * r.powi(3)) / rho_crit
        })
        .collect()
}

/// A stacked (averaged) mass profile for one halo mass bin.
#[derive(Debug, Clone, Serialize)]
pub struct StackedProfile {
    /// Radius bin edges the profile was sampled at.
    pub radii: Vec<f64>,
    /// Mean ρ/ρ_crit across halos, per radius bin.
    pub mean: Vec<f64>,
    /// RMS deviation from the mean, per radius bin.
    pub scatter: Vec<f64>,
    /// Number of halos stacked.
    pub n_halos: usize,
}

impl StackedProfile {
    /// Radius where the mean profile first drops through ρ/ρ_crit = 200,
    /// by linear interpolation between the bracketing bins.
    ///
    /// # Errors
    /// Fails when the profile never crosses 200.
    pub fn r200(&self) -> HaloResult<f64> {
        r200(&self.radii, &self.mean)
    }

    /// Radius axis rescaled to r/r200.
    pub fn r_over_r200(&self) -> HaloResult<Vec<f64>> {
        let r200 = self.r200()?;
        Ok(self.radii.iter().map(|&r| r / r200).collect())
    }
}

/// Averages per-halo profiles into a [`StackedProfile`].
///
/// # Errors
/// Fails on an empty profile set or on length mismatches against `radii`.
pub fn stack_profiles(radii: &[f64], profiles: &[Vec<f64>]) -> HaloResult<StackedProfile> {
    if profiles.is_empty() {
        return Err(HaloError::calculation_error(
            "stack_profiles",
            "no profiles to stack",
        ));
    }
    if profiles.iter().any(|p| p.len() != radii.len()) {
        return Err(HaloError::calculation_error(
            "stack_profiles",
            "profile length disagrees with radius bins",
        ));
    }

    let n = profiles.len() as f64;
    let mut mean = vec![0.0; radii.len()];
    for profile in profiles {
        for (m, &v) in mean.iter_mut().zip(profile) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut scatter = vec![0.0; radii.len()];
    for profile in profiles {
        for ((s, &m), &v) in scatter.iter_mut().zip(&mean).zip(profile) {
            *s += (v - m) * (v - m);
        }
    }
    for s in &mut scatter {
        *s = (*s / n).sqrt();
    }

    Ok(StackedProfile {
        radii: radii.to_vec(),
        mean,
        scatter,
        n_halos: profiles.len(),
    })
}

/// Computes and stacks profiles for every halo, in parallel.
pub fn stacked_profile(
    halos: &[Halo],
    particles_sorted_by_x: &[Particle],
    rbins: &[f64],
    particle_mass: f64,
    rho_crit: f64,
) -> HaloResult<StackedProfile> {
    let profiles: Vec<Vec<f64>> = halos
        .par_iter()
        .map(|halo| {
            let distances = sorted_distances(halo, particles_sorted_by_x);
            density_profile(&distances, rbins, particle_mass, rho_crit)
        })
        .collect();
    stack_profiles(rbins, &profiles)
}

/// First downward crossing of ρ/ρ_crit = 200 along a profile.
pub fn r200(radii: &[f64], rho_over_rho_crit: &[f64]) -> HaloResult<f64> {
    const TARGET: f64 = 200.0;

    for i in 0..radii.len().saturating_sub(1) {
        let (rho_a, rho_b) = (rho_over_rho_crit[i], rho_over_rho_crit[i + 1]);
        if rho_a >= TARGET && rho_b < TARGET {
            let t = (TARGET - rho_a) / (rho_b - rho_a);
            return Ok(radii[i] + t * (radii[i + 1] - radii[i]));
        }
    }

    Err(HaloError::calculation_error(
        "r200",
        "profile never crosses 200 rho_crit",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::interval::exp_spaced_edges;
    use halo_formats::rockstar::HALO_NOT_SET;

    fn particle(id: i64, x: f64, y: f64, z: f64) -> Particle {
        Particle { id, x, y, z }
    }

    fn halo_at(pos: [f64; 3], rvir: f64) -> Halo {
        Halo {
            id: 0,
            pos,
            rvir,
            mass: 1.0e12,
            pid: HALO_NOT_SET,
            num_p: HALO_NOT_SET,
        }
    }

    #[test]
    fn test_sorted_distances_window_and_filter() {
        // Sorted by x. The particle at x=10.4 is inside the x-window but
        // outside the y-box; the one at x=20 is outside the window.
        let particles = vec![
            particle(0, 9.9, 10.0, 10.0),
            particle(1, 10.0, 10.0, 10.3),
            particle(2, 10.4, 12.0, 10.0),
            particle(3, 20.0, 10.0, 10.0),
        ];
        let halo = halo_at([10.0, 10.0, 10.0], 0.5);

        let distances = sorted_distances(&halo, &particles);
        assert_eq!(distances.len(), 2);
        assert!((distances[0] - 0.1).abs() < 1e-12);
        assert!((distances[1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_distances_empty_window() {
        let particles = vec![particle(0, 50.0, 50.0, 50.0)];
        let halo = halo_at([10.0, 10.0, 10.0], 1.0);
        assert!(sorted_distances(&halo, &particles).is_empty());
    }

    #[test]
    fn test_density_zero_for_empty_halo() {
        let rbins = [0.1, 0.2, 0.5, 1.0];
        let profile = density_profile(&[], &rbins, 1.0e9, 1.0e11);
        assert!(profile.iter().all(|&rho| rho == 0.0));
    }

    #[test]
    fn test_density_zero_at_zero_radius_bin() {
        // Exponential spacings start at the lower edge itself, which can
        // be 0; the zero-volume bin must stay zero, not NaN.
        let rbins = exp_spaced_edges(0.0, 2.0, 8).unwrap();
        let profile = density_profile(&[], &rbins, 1.0e9, 1.0e11);
        assert!(profile.iter().all(|&rho| rho == 0.0));

        // Same with a particle sitting exactly on the halo center.
        let profile = density_profile(&[0.0, 0.5], &rbins, 1.0e9, 1.0e11);
        assert_eq!(profile[0], 0.0);
        assert!(profile.iter().all(|&rho| rho.is_finite()));
    }

    #[test]
    fn test_cumulative_count_monotone() {
        let distances = [0.05, 0.15, 0.15, 0.4, 0.9];
        let rbins = [0.1, 0.2, 0.5, 1.0];

        let counts: Vec<usize> = rbins.iter().map(|&r| upper_bound(&distances, r)).collect();
        assert_eq!(counts, vec![1, 3, 4, 5]);
        for pair in counts.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_density_value() {
        // One particle inside r = 1: rho = m / (4/3 pi) / rho_crit.
        let profile = density_profile(&[0.5], &[1.0], 3.0, 1.0);
        let expected = 3.0 / (4.0 / 3.0 * PI);
        assert!((profile[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_stack_profiles_mean_and_scatter() {
        let radii = [1.0, 2.0];
        let profiles = vec![vec![10.0, 2.0], vec![14.0, 2.0]];
        let stacked = stack_profiles(&radii, &profiles).unwrap();

        assert_eq!(stacked.n_halos, 2);
        assert_eq!(stacked.mean, vec![12.0, 2.0]);
        assert_eq!(stacked.scatter, vec![2.0, 0.0]);
    }

    #[test]
    fn test_stack_profiles_rejects_empty() {
        assert!(stack_profiles(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_stack_profiles_rejects_mismatched_lengths() {
        assert!(stack_profiles(&[1.0, 2.0], &[vec![1.0]]).is_err());
    }

    #[test]
    fn test_r200_interpolates() {
        let radii = [0.1, 0.2, 0.3];
        let profile = [400.0, 300.0, 100.0];
        // Crossing between 0.2 and 0.3: 300 -> 100, target 200 at midpoint.
        let r = r200(&radii, &profile).unwrap();
        assert!((r - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_r200_no_crossing() {
        let radii = [0.1, 0.2];
        let profile = [150.0, 100.0];
        assert!(r200(&radii, &profile).is_err());
    }

    #[test]
    fn test_stacked_profile_end_to_end() {
        // Two identical point clouds around two halos: stacked scatter is 0.
        let mut particles = Vec::new();
        for (cx, base) in [(10.0, 0), (30.0, 100)] {
            for i in 0..8 {
                let offset = 0.05 + 0.01 * i as f64;
                particles.push(particle(base + i, cx + offset, 50.0, 50.0));
            }
        }
        particles.sort_unstable_by(|a, b| a.x.total_cmp(&b.x));

        let halos = vec![
            halo_at([10.0, 50.0, 50.0], 0.5),
            halo_at([30.0, 50.0, 50.0], 0.5),
        ];
        let rbins = [0.1, 0.2, 0.5];

        let stacked = stacked_profile(&halos, &particles, &rbins, 1.0e9, 1.0e11).unwrap();
        assert_eq!(stacked.n_halos, 2);
        assert!(stacked.scatter.iter().all(|&s| s.abs() < 1e-9));
        // Cumulative mass grows, but density can fall with the r^3 volume.
        assert!(stacked.mean[0] > 0.0);
    }
}
