//! Client-side listing controller
//!
//! The database hands back one page of prompts; everything after that
//! (search, filter, sort, multi-select and export) happens here, in memory,
//! on the already-fetched page.

pub mod export;
pub mod filter;
pub mod state;

pub use filter::{FilterCriteria, SortKey};
pub use state::{FilterOptions, LibraryState, ViewMode};
