//! Analytic NFW density profile.
//!
//! Concentration follows the Dolag et al. 2003 fit,
//! c(M, z) = 9.59 / (1 + z) · (M / 10¹⁴)^−0.102, and the profile is the
//! standard two-parameter form ρ(r) = ρ₀ / ((r/r_s)(1 + r/r_s)²) with
//! ρ₀ fixed so the profile integrates to the halo mass inside rvir.

use serde::Serialize;

use halo_core::interval::log_spaced_edges;
use halo_core::{HaloError, HaloResult};

use std::f64::consts::PI;

/// Number of radius samples when the caller supplies no bins.
const DEFAULT_BINS: usize = 19;

/// An evaluated NFW profile.
#[derive(Debug, Clone, Serialize)]
pub struct NfwProfile {
    /// Concentration parameter c.
    pub concentration: f64,
    /// Scale radius rvir / c, same unit as `radii`.
    pub scale_radius: f64,
    /// Characteristic density ρ₀, mass unit per radius unit cubed.
    pub rho_0: f64,
    pub radii: Vec<f64>,
    pub densities: Vec<f64>,
}

impl NfwProfile {
    /// Density at a single radius.
    pub fn density(&self, r: f64) -> f64 {
        let x = r / self.scale_radius;
        self.rho_0 / (x * (1.0 + x) * (1.0 + x))
    }

    /// Mass enclosed within radius `r`,
    /// 4π ρ₀ r_s³ (ln(1 + r/r_s) − (r/r_s)/(1 + r/r_s)).
    pub fn enclosed_mass(&self, r: f64) -> f64 {
        let x = r / self.scale_radius;
        4.0 * PI * self.rho_0 * self.scale_radius.powi(3) * ((1.0 + x).ln() - x / (1.0 + x))
    }
}

/// Concentration of a halo of mass `mass` (solar masses) at redshift `z`,
/// Dolag et al. 2003.
pub fn concentration(mass: f64, z: f64) -> f64 {
    9.59 / (1.0 + z) * (mass / 1.0e14).powf(-0.102)
}

/// Evaluates the NFW profile of a halo.
///
/// `mass` and `rvir` fix the normalization; radius samples default to
/// logarithmic spacing from 10 radius units out to 3·rvir when `rbins`
/// is `None`.
///
/// # Errors
/// Fails on non-positive mass, virial radius, or redshift below −1.
pub fn nfw_profile(
    mass: f64,
    rvir: f64,
    z: f64,
    rbins: Option<&[f64]>,
) -> HaloResult<NfwProfile> {
    if !(mass > 0.0) || !(rvir > 0.0) {
        return Err(HaloError::calculation_error(
            "nfw_profile",
            "mass and virial radius must be positive",
        ));
    }
    if z <= -1.0 {
        return Err(HaloError::calculation_error(
            "nfw_profile",
            "redshift must be greater than -1",
        ));
    }

    let c = concentration(mass, z);
    let r_s = rvir / c;
    // M = 4 pi rho_0 r_s^3 (ln(1 + c) - c / (1 + c))
    let rho_0 = mass / (4.0 * PI * r_s.powi(3) * ((1.0 + c).ln() - c / (1.0 + c)));

    let radii = match rbins {
        Some(bins) => bins.to_vec(),
        None => log_spaced_edges(10.0, 3.0 * rvir, DEFAULT_BINS)?,
    };

    let profile = NfwProfile {
        concentration: c,
        scale_radius: r_s,
        rho_0,
        radii: Vec::new(),
        densities: Vec::new(),
    };
    let densities = radii.iter().map(|&r| profile.density(r)).collect();

    Ok(NfwProfile {
        radii,
        densities,
        ..profile
    })
}
