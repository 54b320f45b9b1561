//! File formats produced and consumed by the halo analysis pipeline.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`rockstar`] | Rockstar ASCII halo catalogs: header extraction, typed columnar load, host filter, id index, ASCII writer |
//! | [`gadget`] | Gadget-2 binary snapshots: Fortran-record header and position block |
//! | [`matches`] | Matching-halo ASCII files linking halos across two catalogs |
//!
//! Each format has its own error type with a local `Result` alias; nothing
//! here panics on malformed input.

pub mod gadget;
pub mod matches;
pub mod rockstar;
