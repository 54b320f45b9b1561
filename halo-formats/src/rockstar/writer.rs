//! ASCII writer for Rockstar catalogs.
//!
//! Emits the same layout the loader reads: a 19-line preamble followed by
//! whitespace-delimited rows. The original raw header lines are reused,
//! with the tag line rebuilt from the columns actually present so a
//! written subset re-reads cleanly.
//!
//! Floats are written in exponent form. Rust's float formatting is
//! shortest-round-trip, so values survive a write/read cycle exactly, and
//! the mandatory `e` keeps integral floats from re-sniffing as Int.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::catalog::{Column, RockstarCatalog};
use super::header::HEADER_ROWS;
use super::Result;

impl RockstarCatalog {
    /// Writes the catalog to `path` in Rockstar ASCII layout.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut out = BufWriter::new(file);

        writeln!(out, "#{}", self.included_columns().join(" "))?;
        for i in 1..HEADER_ROWS {
            match self.header.raw_lines.get(i) {
                Some(line) => writeln!(out, "{}", line)?,
                None => writeln!(out, "#")?,
            }
        }

        for row in 0..self.n_halos() {
            let mut first = true;
            for (_, column) in &self.columns {
                if !first {
                    write!(out, " ")?;
                }
                first = false;
                match column {
                    Column::Int(v) => write!(out, "{}", v[row])?,
                    Column::Float(v) => write!(out, "{:e}", v[row])?,
                }
            }
            writeln!(out)?;
        }

        out.flush()?;
        Ok(())
    }
}
