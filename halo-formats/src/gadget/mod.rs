//! Gadget-2 binary snapshots (N-body runs).
//!
//! A snapshot is a sequence of Fortran unformatted records: a 4-byte
//! little-endian length marker, the payload, and the same marker again.
//! Only the first two records matter here — the 256-byte header and the
//! packed `f32` position block. Velocities, ids and hydro blocks are not
//! read; particle mass is uniform and comes from the header.
//!
//! Open with [`Snapshot::open`] to get at the header cheaply, then call
//! [`Snapshot::read_positions`] for the particle array.

mod header;
mod snapshot;

use std::io;

use thiserror::Error;

pub use header::GadgetHeader;
pub use snapshot::{sort_by_x, Particle, Snapshot};

#[derive(Debug, Error)]
pub enum GadgetError {
    #[error("Invalid header record length: expected {expected}, got {got}")]
    InvalidHeaderLength { expected: u32, got: u32 },

    #[error("Record marker mismatch: leading {leading}, trailing {trailing}")]
    RecordMarkerMismatch { leading: u32, trailing: u32 },

    #[error("Position block holds {got} bytes, expected {expected} for {count} particles")]
    PositionBlockSize { expected: u64, got: u64, count: u64 },

    #[error("Snapshot contains no particles")]
    NoParticles,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GadgetError>;
