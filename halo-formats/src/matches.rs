//! Matching-halo ASCII files.
//!
//! A match file links halos of a primary catalog to halos of a secondary
//! one (typically the same box at two resolutions). The layout is eight
//! `key: value` header lines, a `#` column-comment line, then one row per
//! found match:
//!
//! ```text
//! Primary input: /data/rockstar_512.ascii
//! Secondary input: /data/rockstar_1024.ascii
//! Mass offset: 1.200000
//! Maximum halo displacement: 5.000000
//! Initial volume grid: 0
//! num of halos in primary input: 1234
//! num of halos in secondary input: 5678
//! num of found matches: 2
//! #primary_halo primary_halo_mass secondary_halo secondary_halo_mass goodness
//!       0 1.000000000000000e12       7 9.000000000000000e11  98.50
//!       3 2.000000000000000e11      12 2.100000000000000e11  95.00
//! ```
//!
//! Ids refer to rows of the id-indexed catalogs; `-1` ([`NOT_SET`]) marks
//! "no match found" wherever a match slot can be empty.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

/// Sentinel for "no match found".
pub const NOT_SET: i64 = -1;

/// Number of `key: value` lines before the column comment.
const HEADER_LINES: usize = 8;

const HEADER_KEYS: [&str; HEADER_LINES] = [
    "Primary input",
    "Secondary input",
    "Mass offset",
    "Maximum halo displacement",
    "Initial volume grid",
    "num of halos in primary input",
    "num of halos in secondary input",
    "num of found matches",
];

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match file truncated at line {line}: expected {expected:?} header line")]
    MissingHeader { line: usize, expected: &'static str },

    #[error("Cannot parse {value:?} at line {line}")]
    InvalidValue { value: String, line: usize },

    #[error("Header declares {declared} matches, file carries {found}")]
    CountMismatch { declared: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MatchError>;

/// One matched halo pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaloMatch {
    pub primary_id: i64,
    pub primary_mass: f64,
    pub secondary_id: i64,
    pub secondary_mass: f64,
    /// Match quality in percent.
    pub goodness: f64,
}

/// A loaded match file: the matching parameters and the found pairs.
#[derive(Debug, Clone)]
pub struct MatchList {
    pub primary_input: String,
    pub secondary_input: String,
    pub mass_offset: f64,
    pub max_displacement: f64,
    /// Grid resolution of the legacy initial-volume matcher; kept so old
    /// files round-trip. The displacement matcher writes 0.
    pub init_volume_grid: u32,
    pub num_primary: u64,
    pub num_secondary: u64,
    pub matches: Vec<HaloMatch>,
}

impl MatchList {
    /// Loads a match file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;

        let mut values = [""; HEADER_LINES];
        for (i, key) in HEADER_KEYS.iter().enumerate() {
            let line = lines.get(i).ok_or(MatchError::MissingHeader {
                line: i,
                expected: key,
            })?;
            let (found_key, value) = line.split_once(':').ok_or(MatchError::MissingHeader {
                line: i,
                expected: key,
            })?;
            if found_key.trim() != *key {
                return Err(MatchError::MissingHeader {
                    line: i,
                    expected: key,
                });
            }
            values[i] = value.trim();
        }

        let parse_f64 = |i: usize| -> Result<f64> {
            values[i].parse().map_err(|_| MatchError::InvalidValue {
                value: values[i].to_string(),
                line: i,
            })
        };
        let parse_u64 = |i: usize| -> Result<u64> {
            values[i].parse().map_err(|_| MatchError::InvalidValue {
                value: values[i].to_string(),
                line: i,
            })
        };

        let declared = parse_u64(7)? as usize;

        let mut matches = Vec::with_capacity(declared);
        for (offset, line) in lines.iter().enumerate().skip(HEADER_LINES) {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            matches.push(parse_row(trimmed, offset)?);
        }

        if matches.len() != declared {
            return Err(MatchError::CountMismatch {
                declared,
                found: matches.len(),
            });
        }

        Ok(Self {
            primary_input: values[0].to_string(),
            secondary_input: values[1].to_string(),
            mass_offset: parse_f64(2)?,
            max_displacement: parse_f64(3)?,
            init_volume_grid: parse_u64(4)? as u32,
            num_primary: parse_u64(5)?,
            num_secondary: parse_u64(6)?,
            matches,
        })
    }

    /// Saves the match list in the layout [`load`](Self::load) reads.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut out = BufWriter::new(file);

        writeln!(out, "Primary input: {}", self.primary_input)?;
        writeln!(out, "Secondary input: {}", self.secondary_input)?;
        writeln!(out, "Mass offset: {:.6}", self.mass_offset)?;
        writeln!(out, "Maximum halo displacement: {:.6}", self.max_displacement)?;
        writeln!(out, "Initial volume grid: {}", self.init_volume_grid)?;
        writeln!(out, "num of halos in primary input: {}", self.num_primary)?;
        writeln!(out, "num of halos in secondary input: {}", self.num_secondary)?;
        writeln!(out, "num of found matches: {}", self.matches.len())?;
        writeln!(
            out,
            "#primary_halo primary_halo_mass secondary_halo secondary_halo_mass goodness"
        )?;

        for m in &self.matches {
            writeln!(
                out,
                "{:7} {:.15e} {:7} {:.15e} {:6.2}",
                m.primary_id, m.primary_mass, m.secondary_id, m.secondary_mass, m.goodness
            )?;
        }

        out.flush()?;
        Ok(())
    }
}

fn parse_row(line: &str, line_no: usize) -> Result<HaloMatch> {
    let invalid = || MatchError::InvalidValue {
        value: line.to_string(),
        line: line_no,
    };

    let mut tokens = line.split_whitespace();
    let mut next = || tokens.next().ok_or_else(invalid);

    let primary_id = next()?.parse().map_err(|_| invalid())?;
    let primary_mass = next()?.parse().map_err(|_| invalid())?;
    let secondary_id = next()?.parse().map_err(|_| invalid())?;
    let secondary_mass = next()?.parse().map_err(|_| invalid())?;
    let goodness = next()?.parse().map_err(|_| invalid())?;

    Ok(HaloMatch {
        primary_id,
        primary_mass,
        secondary_id,
        secondary_mass,
        goodness,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample_list() -> MatchList {
        MatchList {
            primary_input: "/data/rockstar_512.ascii".to_string(),
            secondary_input: "/data/rockstar_1024.ascii".to_string(),
            mass_offset: 1.2,
            max_displacement: 5.0,
            init_volume_grid: 0,
            num_primary: 1234,
            num_secondary: 5678,
            matches: vec![
                HaloMatch {
                    primary_id: 0,
                    primary_mass: 1.0e12,
                    secondary_id: 7,
                    secondary_mass: 9.0e11,
                    goodness: 98.5,
                },
                HaloMatch {
                    primary_id: 3,
                    primary_mass: 2.0e11,
                    secondary_id: 12,
                    secondary_mass: 2.1e11,
                    goodness: 95.0,
                },
            ],
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matches.ascii");
        let list = sample_list();
        list.save(&path).unwrap();

        let loaded = MatchList::load(&path).unwrap();
        assert_eq!(loaded.primary_input, list.primary_input);
        assert_eq!(loaded.mass_offset, list.mass_offset);
        assert_eq!(loaded.num_primary, 1234);
        assert_eq!(loaded.matches.len(), 2);

        for (a, b) in loaded.matches.iter().zip(&list.matches) {
            assert_eq!(a.primary_id, b.primary_id);
            assert_eq!(a.secondary_id, b.secondary_id);
            assert!((a.primary_mass - b.primary_mass).abs() <= b.primary_mass * 1e-12);
            assert!((a.goodness - b.goodness).abs() < 0.01);
        }
    }

    #[test]
    fn test_missing_header_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.ascii");
        std::fs::write(&path, "Primary input: a\nSecondary input: b\n").unwrap();

        let err = MatchList::load(&path).unwrap_err();
        assert!(matches!(
            err,
            MatchError::MissingHeader {
                expected: "Mass offset",
                ..
            }
        ));
    }

    #[test]
    fn test_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matches.ascii");
        let mut list = sample_list();
        list.save(&path).unwrap();

        // Claim three matches but keep two rows.
        let text = std::fs::read_to_string(&path)
            .unwrap()
            .replace("num of found matches: 2", "num of found matches: 3");
        std::fs::write(&path, text).unwrap();

        let err = MatchList::load(&path).unwrap_err();
        assert!(matches!(
            err,
            MatchError::CountMismatch {
                declared: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_invalid_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matches.ascii");
        let list = sample_list();
        list.save(&path).unwrap();

        let text = std::fs::read_to_string(&path)
            .unwrap()
            .replace("98.50", "not-a-number");
        std::fs::write(&path, text).unwrap();

        assert!(matches!(
            MatchList::load(&path).unwrap_err(),
            MatchError::InvalidValue { .. }
        ));
    }
}
