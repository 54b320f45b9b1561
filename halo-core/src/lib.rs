//! Shared foundation for the halo analysis crates.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Physical constants and the [`Unit`](constants::Unit) scale table |
//! | [`cosmology`] | Gravitational constant and critical density in arbitrary units |
//! | [`interval`] | Logarithmic / exponential bin-edge generation |
//! | [`search`] | `searchsorted`-style bounds on sorted slices |
//! | [`errors`] | [`HaloError`](errors::HaloError) and [`HaloResult`](errors::HaloResult) |

pub mod constants;
pub mod cosmology;
pub mod errors;
pub mod interval;
pub mod search;

pub use constants::Unit;
pub use errors::{HaloError, HaloResult, MathErrorKind};
