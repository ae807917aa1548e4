//! TRX sizing for GSM cells.
//!
//! Decides per cell whether the transceiver count should grow, shrink or
//! stay, and by how much, from measured traffic, half-rate share and
//! blocking history, using a static Erlang-B capacity table.
//!
//! The pipeline is:
//!
//! 1. [`io::loaders`] reads the cell inventory, the Erlang-B table and the
//!    daily blocking exports.
//! 2. [`preprocessing::enricher`] fills in site totals and blocking counts.
//! 3. [`preprocessing::pipeline::CapacityPlanningBatch`] baselines,
//!    classifies and plans every cell.
//! 4. [`io::export`] writes the augmented table.

pub mod algorithms;
pub mod config;
pub mod core;
pub mod io;
pub mod preprocessing;
