//! Physiological bounds on relaxation time.

use crate::data::{Field, Flag, Overview, OverviewTable};
use crate::error::{QcError, Result};
use crate::filter::DataFilter;
use std::cell::OnceCell;

/// Fixed upper limit for relaxation time, in ms.
const MAX_RELAXATION_TIME: f64 = 1200.0;

/// Deletes contractions whose relaxation time is physiologically implausible
/// for the pacing frequency.
///
/// The lower bound is `200 / Hz` ms and is computed once per run, from an
/// explicit frequency if one was supplied, otherwise from the table name.
/// The upper bound is a fixed 1200 ms.
pub struct RelaxationTimeFilter {
    hz_override: Option<f64>,
    lower_limit: OnceCell<f64>,
}

impl RelaxationTimeFilter {
    /// Resolve the pacing frequency from the table metadata.
    pub fn new() -> Self {
        Self {
            hz_override: None,
            lower_limit: OnceCell::new(),
        }
    }

    /// Use an explicit pacing frequency, ignoring the table metadata.
    pub fn with_frequency(hz: f64) -> Self {
        Self {
            hz_override: Some(hz),
            lower_limit: OnceCell::new(),
        }
    }

    fn resolve_lower_limit(&self, table: &OverviewTable) -> Result<f64> {
        if let Some(limit) = self.lower_limit.get() {
            return Ok(*limit);
        }
        let hz = self
            .hz_override
            .or_else(|| table.hz_frequency())
            .ok_or(QcError::MissingFrequency)?;
        if hz <= 0.0 {
            return Err(QcError::InvalidParameter(format!(
                "pacing frequency must be positive, got {} Hz",
                hz
            )));
        }
        Ok(*self.lower_limit.get_or_init(|| 200.0 / hz))
    }
}

impl Default for RelaxationTimeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFilter for RelaxationTimeFilter {
    fn name(&self) -> &'static str {
        "relaxation_time"
    }

    fn apply(&self, overview: &mut Overview) -> Result<()> {
        let lower = *self.lower_limit.get().ok_or(QcError::MissingFrequency)?;
        for contraction in &mut overview.contractions {
            if contraction.is_deleted() {
                continue;
            }
            let Some(relaxation) = contraction.effective_numeric(Field::RelaxationTime, 0.0)
            else {
                continue;
            };
            if relaxation < lower || relaxation > MAX_RELAXATION_TIME {
                contraction.flag = Some(Flag::Delete);
            }
        }
        Ok(())
    }

    fn apply_all(&self, table: &mut OverviewTable) -> Result<()> {
        self.resolve_lower_limit(table)?;
        for overview in &mut table.overviews {
            self.apply(overview)?;
        }
        Ok(())
    }
}
