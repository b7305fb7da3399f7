//! Statistical filters for contraction data.
//!
//! Every filter transforms one [`Overview`] in place and, by default, a whole
//! [`OverviewTable`] by mapping over its wells. Filters that need cross-well
//! context (the overview outlier filter) or table metadata (the relaxation
//! time filter) override the table-level entry point instead.
//!
//! Filters never mutate stored measurement fields: they set flags and stage
//! overrides which the orchestrator commits between stages.

pub mod amplitude;
pub mod contraction_outlier;
pub mod overview_outlier;
pub mod relaxation;
pub mod simple;

pub use amplitude::AmplitudeFilter;
pub use contraction_outlier::ContractionOutlierFilter;
pub use overview_outlier::OverviewOutlierFilter;
pub use relaxation::RelaxationTimeFilter;
pub use simple::SimpleFilter;

use crate::data::{Overview, OverviewTable};
use crate::error::Result;

/// The capability every filter implements.
pub trait DataFilter {
    /// Short name used in pipeline error messages.
    fn name(&self) -> &'static str;

    /// Filter a single well in place.
    fn apply(&self, overview: &mut Overview) -> Result<()>;

    /// Filter every well of the table. The default maps [`DataFilter::apply`]
    /// over the wells in order.
    fn apply_all(&self, table: &mut OverviewTable) -> Result<()> {
        for overview in &mut table.overviews {
            self.apply(overview)?;
        }
        Ok(())
    }

    /// Name for a table snapshot taken before this filter runs, if any.
    ///
    /// Checkpoints are informational hooks for the reporting collaborator;
    /// they carry no algorithmic behavior.
    fn pre_checkpoint(&self) -> Option<&str> {
        None
    }

    /// Name for a table snapshot taken after this filter runs, if any.
    fn post_checkpoint(&self) -> Option<&str> {
        None
    }
}

/// Wrapper attaching snapshot checkpoints to any filter.
pub struct Checkpointed<F> {
    inner: F,
    pre: Option<String>,
    post: Option<String>,
}

impl<F: DataFilter> Checkpointed<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            pre: None,
            post: None,
        }
    }

    /// Request a snapshot named `name` before the filter runs.
    pub fn pre(mut self, name: impl Into<String>) -> Self {
        self.pre = Some(name.into());
        self
    }

    /// Request a snapshot named `name` after the filter runs.
    pub fn post(mut self, name: impl Into<String>) -> Self {
        self.post = Some(name.into());
        self
    }
}

impl<F: DataFilter> DataFilter for Checkpointed<F> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn apply(&self, overview: &mut Overview) -> Result<()> {
        self.inner.apply(overview)
    }

    fn apply_all(&self, table: &mut OverviewTable) -> Result<()> {
        self.inner.apply_all(table)
    }

    fn pre_checkpoint(&self) -> Option<&str> {
        self.pre.as_deref()
    }

    fn post_checkpoint(&self) -> Option<&str> {
        self.post.as_deref()
    }
}
