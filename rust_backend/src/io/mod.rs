//! Input loading and output writing.
//!
//! Loaders turn the cell inventory, the Erlang-B table and the daily
//! blocking exports into domain types, accepting both the snake_case
//! headers and the headers of the network's CBS exports. Writers emit the
//! augmented table as CSV or JSON.
//!
//! # Example
//!
//! ```no_run
//! use trx_sizing::io::loaders::CellInventoryLoader;
//! use std::path::Path;
//!
//! let result = CellInventoryLoader::load_from_file(Path::new("cells.csv"))
//!     .expect("Failed to load");
//! println!("Loaded {} cells", result.cells.len());
//! ```

pub mod export;
pub mod loaders;

#[cfg(test)]
mod loaders_tests;

pub use export::{rows_to_dataframe, write_output, write_summary, OutputRow};
pub use loaders::{
    BlockingStatsLoader, CellInventoryLoader, CellLoadResult, ErlangTableLoader, SourceType,
};
