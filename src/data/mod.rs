//! Data structures for contraction quality control.

mod contraction;
mod loader;
mod overview;
mod table;

pub use contraction::{Contraction, Field, FieldValue, Flag};
pub use loader::{load_overview, load_overview_table, DEFAULT_OVERVIEW_FILE_NAME};
pub use overview::Overview;
pub use table::OverviewTable;
