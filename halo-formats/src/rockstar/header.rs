//! Rockstar catalog header extraction.
//!
//! The header is 19 `#`-prefixed lines whose layout is positional:
//!
//! ```text
//! line 0      #id num_p mvir ... (column tags)
//! lines 1-2   #a = 1.000000; #Om = 0.3; ...        ('=' statements, ';'-separated)
//! lines 3-8   #Box size: 100.000000 Mpc/h; ...     (':' statements)
//! lines 9-15  #Units: Masses in Msun / h ...       (unit sentences)
//! lines 16-18 free-form comments
//! ```
//!
//! Keys keep their original wording with spaces replaced by underscores
//! (`Box size` → `Box_size`), values are whitespace-split token lists.
//! Missing keys are simply absent; only structural truncation is an error.

use std::collections::HashMap;

use super::{Result, RockstarError};

/// Number of header lines before data rows begin.
pub const HEADER_ROWS: usize = 19;

/// Parsed Rockstar catalog header.
#[derive(Debug, Clone)]
pub struct RockstarHeader {
    /// Column tags from line 0, in file order.
    pub column_tags: Vec<String>,
    /// `key -> value tokens` from the `=` and `:` statements.
    pub values: HashMap<String, Vec<String>>,
    /// `quantity -> unit` from the unit sentences (`Masses in Msun / h`).
    pub units: HashMap<String, String>,
    /// The raw header lines, kept verbatim so a catalog can be re-written
    /// with its original preamble.
    pub raw_lines: Vec<String>,
}

impl RockstarHeader {
    /// Parses the header from the first [`HEADER_ROWS`] lines of a catalog.
    ///
    /// # Errors
    /// Returns [`RockstarError::TruncatedHeader`] when fewer lines are given.
    pub fn parse(lines: &[String]) -> Result<Self> {
        if lines.len() < HEADER_ROWS {
            return Err(RockstarError::TruncatedHeader {
                expected: HEADER_ROWS,
                got: lines.len(),
            });
        }

        let mut values = HashMap::new();
        let mut units = HashMap::new();
        let mut column_tags = Vec::new();

        for (i, raw) in lines.iter().take(HEADER_ROWS).enumerate() {
            let line = raw.trim_start_matches('#').trim_end();
            match i {
                0 => {
                    column_tags = line.split(' ').map(str::to_string).collect();
                }
                1..=2 => extract_statements(line, '=', &mut values),
                3..=8 => extract_statements(line, ':', &mut values),
                9..=15 => extract_unit(line, &mut units),
                _ => {}
            }
        }

        Ok(Self {
            column_tags,
            values,
            units,
            raw_lines: lines[..HEADER_ROWS].to_vec(),
        })
    }

    /// First token of `key` parsed as f64, if present and numeric.
    pub fn value_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key)?.first()?.parse().ok()
    }

    /// Simulation box side length (`Box size`).
    pub fn box_size(&self) -> Option<f64> {
        self.value_f64("Box_size")
    }

    /// Uniform particle mass (`Particle mass`).
    pub fn particle_mass(&self) -> Option<f64> {
        self.value_f64("Particle_mass")
    }

    /// Matter density parameter Ωm.
    pub fn om(&self) -> Option<f64> {
        self.value_f64("Om")
    }

    /// Dark-energy density parameter ΩΛ.
    pub fn ol(&self) -> Option<f64> {
        self.value_f64("Ol")
    }

    /// Dimensionless Hubble parameter.
    pub fn h(&self) -> Option<f64> {
        self.value_f64("h")
    }

    /// Assumed force resolution (softening length).
    pub fn force_resolution(&self) -> Option<f64> {
        self.value_f64("Force_resolution_assumed")
    }
}

/// Splits a header line on `;` and folds each `key <delim> value` statement
/// into the map. Keys get spaces replaced by underscores, values are
/// whitespace-split.
fn extract_statements(line: &str, delimiter: char, into: &mut HashMap<String, Vec<String>>) {
    for statement in line.split(';') {
        let Some((key, val)) = statement.split_once(delimiter) else {
            continue;
        };
        let key = key.trim().trim_start_matches('#').trim().replace(' ', "_");
        if key.is_empty() {
            continue;
        }
        let tokens: Vec<String> = val.split_whitespace().map(str::to_string).collect();
        into.insert(key, tokens);
    }
}

/// Parses a unit sentence: everything after the first `:`, split on
/// ` in `, ` is ` or ` are `. Lines without a recognized verb are skipped.
fn extract_unit(line: &str, into: &mut HashMap<String, String>) {
    let Some((_, rest)) = line.split_once(':') else {
        return;
    };
    let rest = rest.trim();
    for verb in [" in ", " is ", " are "] {
        if let Some((quantity, unit)) = rest.split_once(verb) {
            let key = quantity.trim().replace(' ', "_");
            into.insert(key, unit.trim().to_string());
            return;
        }
    }
}

/// Canonical 19-line header used by tests across this crate.
#[cfg(test)]
pub(crate) fn sample_header_lines() -> Vec<String> {
    let mut lines = vec![
        "#id num_p mvir mbound_vir rvir x y z PID".to_string(),
        "#a = 1.000000; Om = 0.308000; Ol = 0.692000; h = 0.678000".to_string(),
        "#FOF linking length = 0.280000".to_string(),
        "#Unbound Threshold: 0.500000; FOF Refinement Threshold: 0.700000".to_string(),
        "#Box size: 100.000000 Mpc/h".to_string(),
        "#Total particles processed: 16777216".to_string(),
        "#Particle mass: 1.36218e+09 Msun/h".to_string(),
        "#Force resolution assumed: 0.003 Mpc/h".to_string(),
        "#Rockstar Version: 0.99.9-RC3".to_string(),
        "#Units: Masses in Msun / h".to_string(),
        "#Units: Positions in Mpc / h (comoving)".to_string(),
        "#Units: Velocities in km / s (physical, peculiar)".to_string(),
        "#Units: Halo Distances, Lengths, and Radii in kpc / h (comoving)".to_string(),
        "#Units: Angular Momenta in (Msun/h) * (Mpc/h) * km/s (physical)".to_string(),
        "#Units: Spins are dimensionless".to_string(),
        "#Note: idx, i_so, and i_ph are internal debugging quantities".to_string(),
    ];
    while lines.len() < HEADER_ROWS {
        lines.push("#".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_tags_from_first_line() {
        let header = RockstarHeader::parse(&sample_header_lines()).unwrap();
        assert_eq!(header.column_tags[0], "id");
        assert_eq!(header.column_tags.last().unwrap(), "PID");
        assert_eq!(header.column_tags.len(), 9);
    }

    #[test]
    fn test_equals_statements() {
        let header = RockstarHeader::parse(&sample_header_lines()).unwrap();
        assert_eq!(header.om(), Some(0.308));
        assert_eq!(header.ol(), Some(0.692));
        assert_eq!(header.h(), Some(0.678));
    }

    #[test]
    fn test_colon_statements() {
        let header = RockstarHeader::parse(&sample_header_lines()).unwrap();
        assert_eq!(header.box_size(), Some(100.0));
        assert_eq!(header.particle_mass(), Some(1.36218e9));
        assert_eq!(header.force_resolution(), Some(0.003));
    }

    #[test]
    fn test_unit_sentences() {
        let header = RockstarHeader::parse(&sample_header_lines()).unwrap();
        assert_eq!(header.units["Masses"], "Msun / h");
        assert_eq!(
            header.units["Halo_Distances,_Lengths,_and_Radii"],
            "kpc / h (comoving)"
        );
        assert_eq!(header.units["Spins"], "dimensionless");
    }

    #[test]
    fn test_missing_key_is_none() {
        let header = RockstarHeader::parse(&sample_header_lines()).unwrap();
        assert_eq!(header.value_f64("No_such_key"), None);
    }

    #[test]
    fn test_truncated_header() {
        let lines: Vec<String> = sample_header_lines().into_iter().take(5).collect();
        let err = RockstarHeader::parse(&lines).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }
}
