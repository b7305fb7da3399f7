//! Pipeline runner sequencing the filters over a table.

use crate::data::OverviewTable;
use crate::error::{QcError, Result};
use crate::filter::{
    AmplitudeFilter, Checkpointed, ContractionOutlierFilter, DataFilter, OverviewOutlierFilter,
    RelaxationTimeFilter, SimpleFilter,
};
use serde::{Deserialize, Serialize};

/// Receiver for intermediate table snapshots.
///
/// The orchestrator hands the reporting collaborator the table at every
/// declared checkpoint; what gets materialized (spreadsheets, CSVs) is
/// entirely the receiver's business.
pub trait SnapshotSink {
    fn snapshot(&mut self, name: &str, table: &OverviewTable) -> Result<()>;
}

/// Sink that drops every snapshot.
pub struct NoopSink;

impl SnapshotSink for NoopSink {
    fn snapshot(&mut self, _name: &str, _table: &OverviewTable) -> Result<()> {
        Ok(())
    }
}

/// One of the built-in filters, for pipeline configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FilterStep {
    /// Amplitude thresholding with noise reconciliation.
    Amplitude,
    /// Zero-value rejection.
    Simple,
    /// Relaxation-time bounds; `hz` overrides the table metadata.
    RelaxationTime { hz: Option<f64> },
    /// Per-field IQR outliers within each well.
    ContractionOutlier,
    /// Per-well-average IQR outliers within each group.
    OverviewOutlier,
}

/// One pipeline stage with its optional snapshot checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    pub filter: FilterStep,
    #[serde(default)]
    pub pre_checkpoint: Option<String>,
    #[serde(default)]
    pub post_checkpoint: Option<String>,
}

/// Pipeline configuration for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the pipeline.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Steps to execute, in order.
    pub steps: Vec<StepConfig>,
}

impl PipelineConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(QcError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(QcError::from)
    }

    /// Save to JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(QcError::from)
    }

    /// The configuration of [`Pipeline::standard`].
    pub fn standard(hz: Option<f64>) -> Self {
        let step = |filter| StepConfig {
            filter,
            pre_checkpoint: None,
            post_checkpoint: None,
        };
        Self {
            name: "standard".to_string(),
            description: Some("amplitude, zero-value, relaxation-time and IQR outlier filtering".to_string()),
            steps: vec![
                step(FilterStep::Amplitude),
                StepConfig {
                    filter: FilterStep::Simple,
                    pre_checkpoint: None,
                    post_checkpoint: Some("noise_filter".to_string()),
                },
                step(FilterStep::RelaxationTime { hz }),
                step(FilterStep::ContractionOutlier),
                step(FilterStep::OverviewOutlier),
            ],
        }
    }
}

/// Ordered list of filters plus the commit discipline between stages.
///
/// Order is significant: later filters observe the flags and staged
/// overrides of earlier ones through effective-value reads. In particular the
/// contraction outlier filter must run before any filter that averages plain
/// numeric values, since it is the one staging exclusions.
pub struct Pipeline {
    filters: Vec<Box<dyn DataFilter>>,
    name: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            name: "unnamed".to_string(),
        }
    }

    /// Set the pipeline name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Append a filter stage.
    pub fn add(mut self, filter: Box<dyn DataFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// The standard cleaning pipeline, in the canonical order: amplitude,
    /// zero-value (with a post checkpoint), relaxation time, contraction
    /// outliers, overview outliers.
    pub fn standard(hz: Option<f64>) -> Self {
        Self::from_config(&PipelineConfig::standard(hz))
    }

    /// Build a pipeline from a config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut pipeline = Self::new().name(&config.name);
        for step in &config.steps {
            pipeline = pipeline.add(build_step(step));
        }
        pipeline
    }

    /// Run every filter over the table, discarding snapshots.
    ///
    /// The table comes back with the final stage's flags and staged edits
    /// intact, so the caller can render both the highlighted and the clean
    /// view; call [`OverviewTable::commit`] to materialize.
    pub fn run(&self, table: &mut OverviewTable) -> Result<()> {
        self.run_with(table, &mut NoopSink)
    }

    /// Run every filter over the table, delivering snapshots to `sink`.
    ///
    /// At each declared checkpoint the sink receives the table as it stands
    /// and the staged edits are committed before the run continues, so
    /// downstream filters never see pending overrides from a stage whose
    /// output was already persisted.
    pub fn run_with(&self, table: &mut OverviewTable, sink: &mut dyn SnapshotSink) -> Result<()> {
        for (i, filter) in self.filters.iter().enumerate() {
            if let Some(name) = filter.pre_checkpoint() {
                sink.snapshot(name, table)?;
                table.commit();
            }
            filter.apply_all(table).map_err(|e| {
                QcError::Pipeline(format!(
                    "step {} ({}) of pipeline '{}' failed: {}",
                    i + 1,
                    filter.name(),
                    self.name,
                    e
                ))
            })?;
            if let Some(name) = filter.post_checkpoint() {
                sink.snapshot(name, table)?;
                table.commit();
            }
        }
        Ok(())
    }
}

fn build_step(step: &StepConfig) -> Box<dyn DataFilter> {
    fn checkpointed<F: DataFilter + 'static>(filter: F, step: &StepConfig) -> Box<dyn DataFilter> {
        if step.pre_checkpoint.is_none() && step.post_checkpoint.is_none() {
            return Box::new(filter);
        }
        let mut wrapped = Checkpointed::new(filter);
        if let Some(name) = &step.pre_checkpoint {
            wrapped = wrapped.pre(name.as_str());
        }
        if let Some(name) = &step.post_checkpoint {
            wrapped = wrapped.post(name.as_str());
        }
        Box::new(wrapped)
    }

    match &step.filter {
        FilterStep::Amplitude => checkpointed(AmplitudeFilter, step),
        FilterStep::Simple => checkpointed(SimpleFilter, step),
        FilterStep::RelaxationTime { hz } => match hz {
            Some(hz) => checkpointed(RelaxationTimeFilter::with_frequency(*hz), step),
            None => checkpointed(RelaxationTimeFilter::new(), step),
        },
        FilterStep::ContractionOutlier => checkpointed(ContractionOutlierFilter, step),
        FilterStep::OverviewOutlier => checkpointed(OverviewOutlierFilter, step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Contraction, Field, FieldValue, Flag, Overview};
    use crate::error::Result;
    use crate::filter::DataFilter;

    struct StageOverride;

    impl DataFilter for StageOverride {
        fn name(&self) -> &'static str {
            "stage_override"
        }

        fn apply(&self, overview: &mut Overview) -> Result<()> {
            for c in &mut overview.contractions {
                c.stage(Field::BaselineValue, FieldValue::Numeric(9.0));
                c.flag = Some(Flag::Update);
            }
            Ok(())
        }

        fn post_checkpoint(&self) -> Option<&str> {
            Some("staged")
        }
    }

    struct RecordingSink {
        names: Vec<String>,
    }

    impl SnapshotSink for RecordingSink {
        fn snapshot(&mut self, name: &str, table: &OverviewTable) -> Result<()> {
            // Snapshots see the staged state, not the committed one.
            assert!(table
                .overviews
                .iter()
                .flat_map(|o| &o.contractions)
                .all(|c| !c.pending.is_empty()));
            self.names.push(name.to_string());
            Ok(())
        }
    }

    fn contraction() -> Contraction {
        Contraction::new(
            300.0,
            120.0,
            180.0,
            400.0,
            250.0,
            150.0,
            0.5,
            1.5,
            1.0,
            Some(1000.0),
        )
    }

    #[test]
    fn test_checkpoint_commits_staged_edits() {
        let mut table = OverviewTable::new(
            "experiment",
            vec![Overview::new("G", "A1", vec![contraction()])],
        );
        let pipeline = Pipeline::new().add(Box::new(StageOverride));
        let mut sink = RecordingSink { names: vec![] };
        pipeline.run_with(&mut table, &mut sink).unwrap();

        assert_eq!(sink.names, ["staged"]);
        let c = &table.overviews[0].contractions[0];
        // Committed after the snapshot: override merged, flag cleared.
        assert_eq!(c.baseline_value, FieldValue::Numeric(9.0));
        assert_eq!(c.flag, None);
        assert!(c.pending.is_empty());
    }

    #[test]
    fn test_run_without_checkpoints_leaves_edits_staged() {
        let mut table = OverviewTable::new(
            "experiment",
            vec![Overview::new("G", "A1", vec![contraction()])],
        );
        struct Plain(StageOverride);
        impl DataFilter for Plain {
            fn name(&self) -> &'static str {
                "plain"
            }
            fn apply(&self, overview: &mut Overview) -> Result<()> {
                self.0.apply(overview)
            }
        }
        Pipeline::new()
            .add(Box::new(Plain(StageOverride)))
            .run(&mut table)
            .unwrap();

        let c = &table.overviews[0].contractions[0];
        assert_eq!(c.baseline_value, FieldValue::Numeric(0.5));
        assert_eq!(c.flag, Some(Flag::Update));
        assert!(!c.pending.is_empty());
    }

    #[test]
    fn test_pipeline_error_names_the_step() {
        // The standard pipeline needs a pacing frequency; a table without one
        // fails at the relaxation-time step.
        let mut table = OverviewTable::new(
            "no frequency anywhere here",
            vec![Overview::new("G", "A1", vec![contraction()])],
        );
        let err = Pipeline::standard(None).run(&mut table).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("relaxation_time"), "{message}");
        assert!(message.contains("step 3"), "{message}");
    }

    #[test]
    fn test_config_round_trip() {
        let config = PipelineConfig::standard(Some(2.0));
        let yaml = config.to_yaml().unwrap();
        let parsed = PipelineConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.name, "standard");
        assert_eq!(parsed.steps.len(), 5);
        assert_eq!(
            parsed.steps[1].post_checkpoint.as_deref(),
            Some("noise_filter")
        );
        // The rebuilt pipeline runs.
        let mut table = OverviewTable::new(
            "experiment",
            vec![Overview::new("G", "A1", vec![contraction()])],
        );
        Pipeline::from_config(&parsed).run(&mut table).unwrap();
    }
}
