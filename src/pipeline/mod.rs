//! Pipeline composition and execution for contraction quality control.

mod runner;

pub use runner::{FilterStep, NoopSink, Pipeline, PipelineConfig, SnapshotSink, StepConfig};
