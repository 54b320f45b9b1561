//! Numeric analysis of halo catalogs and N-body snapshots.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`profile`] | Halo mass profiles: windowed particle search, radial density, stacking, r200 |
//! | [`hmf`] | Halo mass function: logarithmic mass histogram, dn/dM/dV |
//! | [`nfw`] | Analytic NFW profile with the Dolag et al. 2003 concentration fit |
//! | [`matcher`] | Cross-matching halos between two catalogs, matched-pair error statistics |
//!
//! The `halotool` binary (feature `cli`) drives these against files parsed
//! by `halo-formats` and renders results with `halo-plot`.

pub mod hmf;
pub mod matcher;
pub mod nfw;
pub mod profile;
