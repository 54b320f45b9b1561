//! Rendering of halo analysis results.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`svg`] | SVG charts via plotters: log-log lines, error bars, semilog scatter |
//! | [`colors`] | The shared plot palette |
//! | [`report`] | LaTeX report assembly around generated figures |

pub mod colors;
pub mod report;
pub mod svg;
