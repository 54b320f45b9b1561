//! Rockstar ASCII halo catalogs.
//!
//! A catalog file starts with a fixed 19-line header: line 0 carries the
//! column tags, lines 1–2 are `key = value` statements, lines 3–8 are
//! `key: value` statements, and lines 9–15 describe units. Data rows are
//! whitespace-delimited and start at line 19.
//!
//! Parse a header alone with [`RockstarHeader::parse`], or load the whole
//! catalog with [`RockstarCatalog::load`]. Column types are sniffed from
//! the first data row, so the loader works across Rockstar versions with
//! differing column sets.

mod catalog;
mod header;
mod writer;

use std::io;

use thiserror::Error;

pub use catalog::{
    bin_by_mass, index_by_id, scale_positions, scale_radii, Column, ColumnType, Halo, HaloColumns,
    LoadOptions, RockstarCatalog, HALO_NOT_SET,
};
pub use header::{RockstarHeader, HEADER_ROWS};

#[derive(Debug, Error)]
pub enum RockstarError {
    #[error("Catalog header truncated: expected {expected} lines, got {got}")]
    TruncatedHeader { expected: usize, got: usize },

    #[error("Catalog has no data rows")]
    NoDataRows,

    #[error("Cannot parse {value:?} as a number (line {line})")]
    InvalidNumber { value: String, line: usize },

    #[error("No columns left after applying only/exclude filters")]
    EmptySelection,

    #[error("Column {name:?} not found in catalog")]
    MissingColumn { name: String },

    #[error("Row at line {line} has {got} fields, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, RockstarError>;
