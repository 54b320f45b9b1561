//! Cosmological reference quantities in arbitrary units.
//!
//! Halo catalogs store masses in Msun/h and lengths in Mpc or kpc, so the
//! gravitational constant and the critical density both need to be
//! expressible in whatever unit system the catalog at hand uses.

use std::f64::consts::PI;

use crate::constants::{Unit, GRAVITATIONAL_CONSTANT_SI, MEGAPARSEC_KM};
use crate::errors::{HaloError, HaloResult, MathErrorKind};

/// Gravitational constant converted to the given length/time/mass units.
///
/// `G [l³ m⁻¹ t⁻²]` scales as `G_SI · m · t² / l³` where `l`, `t`, `m` are
/// the SI scale factors of the requested units.
pub fn gravitational_constant(lunit: Unit, tunit: Unit, munit: Unit) -> f64 {
    GRAVITATIONAL_CONSTANT_SI * munit.scale() * tunit.scale().powi(2) / lunit.scale().powi(3)
}

/// Critical density of the universe, `3 H₀² / 8 π G`.
///
/// `h` is the dimensionless Hubble parameter (H₀ = 100 h km s⁻¹ Mpc⁻¹).
/// The result is expressed in `munit / lunit³`; with `per_h` the value is
/// additionally divided by `h`, matching the Msun/h mass convention of
/// Rockstar catalogs.
///
/// # Errors
/// Returns a math error if `h` is zero or not finite.
pub fn critical_density(h: f64, lunit: Unit, munit: Unit, per_h: bool) -> HaloResult<f64> {
    if h == 0.0 {
        return Err(HaloError::math_error(
            "critical_density",
            MathErrorKind::DivisionByZero,
            "h is zero",
        ));
    }
    if !h.is_finite() {
        return Err(HaloError::math_error(
            "critical_density",
            MathErrorKind::NotFinite,
            "h is not finite",
        ));
    }

    // H0 in s^-1: 100 h km/s/Mpc with one Mpc = 3.086e19 km.
    let h_si = h * 100.0 / MEGAPARSEC_KM;
    let rho_si = 3.0 * h_si.powi(2) / (8.0 * PI * GRAVITATIONAL_CONSTANT_SI);

    let rho = rho_si * lunit.scale().powi(3) / munit.scale();

    Ok(if per_h { rho / h } else { rho })
}
