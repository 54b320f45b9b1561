//! Physical constants and unit scale factors.
//!
//! All scale factors convert to SI base units (kg, m, s). The values match
//! the ones Rockstar and Gadget headers are written against, so conversions
//! round-trip with catalog data.

use crate::errors::{HaloError, HaloResult};

/// Newtonian gravitational constant, in m³ kg⁻¹ s⁻².
pub const GRAVITATIONAL_CONSTANT_SI: f64 = 6.67408e-11;

/// One parsec in meters.
pub const PARSEC_M: f64 = 3.086e16;

/// One kiloparsec in meters.
pub const KILOPARSEC_M: f64 = 3.086e19;

/// One megaparsec in meters.
pub const MEGAPARSEC_M: f64 = 3.086e22;

/// One megaparsec in kilometers. Converts H₀ from km s⁻¹ Mpc⁻¹ to s⁻¹.
pub const MEGAPARSEC_KM: f64 = 3.086e19;

/// One solar mass in kilograms.
pub const SOLAR_MASS_KG: f64 = 1.989e30;

/// A unit with a known scale factor to SI base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Kilogram,
    Meter,
    Second,
    Parsec,
    Kiloparsec,
    Megaparsec,
    SolarMass,
}

impl Unit {
    /// Scale factor converting one of this unit to the SI base unit of the
    /// same dimension.
    pub fn scale(self) -> f64 {
        match self {
            Unit::Kilogram | Unit::Meter | Unit::Second => 1.0,
            Unit::Parsec => PARSEC_M,
            Unit::Kiloparsec => KILOPARSEC_M,
            Unit::Megaparsec => MEGAPARSEC_M,
            Unit::SolarMass => SOLAR_MASS_KG,
        }
    }

    /// Parses a unit name as it appears in catalog headers and CLI flags.
    ///
    /// # Errors
    /// Returns [`HaloError::UnknownUnit`] for names not in the scale table.
    pub fn parse(name: &str) -> HaloResult<Self> {
        match name {
            "kg" => Ok(Unit::Kilogram),
            "m" => Ok(Unit::Meter),
            "s" => Ok(Unit::Second),
            "pc" => Ok(Unit::Parsec),
            "kpc" => Ok(Unit::Kiloparsec),
            "Mpc" => Ok(Unit::Megaparsec),
            "msun" | "Msun" => Ok(Unit::SolarMass),
            other => Err(HaloError::unknown_unit(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_si_units_scale_to_one() {
        assert_eq!(Unit::Kilogram.scale(), 1.0);
        assert_eq!(Unit::Meter.scale(), 1.0);
        assert_eq!(Unit::Second.scale(), 1.0);
    }

    #[test]
    fn test_length_unit_ladder() {
        assert_eq!(Unit::Kiloparsec.scale() / Unit::Parsec.scale(), 1000.0);
        assert_eq!(Unit::Megaparsec.scale() / Unit::Kiloparsec.scale(), 1000.0);
    }

    #[test]
    fn test_parse_known_units() {
        assert_eq!(Unit::parse("Mpc").unwrap(), Unit::Megaparsec);
        assert_eq!(Unit::parse("msun").unwrap(), Unit::SolarMass);
        assert_eq!(Unit::parse("Msun").unwrap(), Unit::SolarMass);
    }

    #[test]
    fn test_parse_unknown_unit() {
        let err = Unit::parse("cubit").unwrap_err();
        assert!(err.to_string().contains("cubit"));
    }
}
