//! Contraction Quality Control Library
//!
//! This library cleans noisy cardiac/muscle contraction time-series by
//! running them through a sequence of statistical filters that flag
//! individual data points for deletion or correction.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (Contraction, Overview, OverviewTable),
//!   the staged-edit mechanism, and the raw-file loader
//! - **stats**: Order statistics shared by the filters
//! - **filter**: The filter contract and the five statistical filters
//! - **pipeline**: Pipeline composition, execution, and the commit discipline
//! - **report**: CSV rendering of highlighted, clean, and summary views
//!
//! Filters never mutate records directly: they set tri-state flags and stage
//! field overrides which every later filter reads through effective-value
//! accessors, and which are merged only at an explicit commit.
//!
//! # Example
//!
//! ```no_run
//! use contraction_qc::prelude::*;
//! use std::path::Path;
//!
//! let root = Path::new("Plate B spont 04052024");
//! let mut table = load_overview_table(root, DEFAULT_OVERVIEW_FILE_NAME).unwrap();
//! Pipeline::standard(None).run(&mut table).unwrap();
//! write_final_reports(&table, root).unwrap();
//! ```

pub mod data;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod report;
pub mod stats;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        load_overview, load_overview_table, Contraction, Field, FieldValue, Flag, Overview,
        OverviewTable, DEFAULT_OVERVIEW_FILE_NAME,
    };
    pub use crate::error::{QcError, Result};
    pub use crate::filter::{
        AmplitudeFilter, Checkpointed, ContractionOutlierFilter, DataFilter,
        OverviewOutlierFilter, RelaxationTimeFilter, SimpleFilter,
    };
    pub use crate::pipeline::{
        FilterStep, NoopSink, Pipeline, PipelineConfig, SnapshotSink, StepConfig,
    };
    pub use crate::report::{write_final_reports, CsvReporter};
}
