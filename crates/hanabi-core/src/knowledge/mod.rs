//! Possibility tracking for cards a player cannot see.
//!
//! This module is composed of:
//! - `grid`: per-slot boolean possibility flags updated by hint events.
//! - `census`: perspective-dependent counts of publicly accounted-for
//!   copies, used to prune identities by elimination.

mod census;
mod grid;

pub use census::CardCensus;
pub use grid::{Hint, HintGrid};
