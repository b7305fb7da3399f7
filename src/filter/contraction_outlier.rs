//! Per-field IQR outlier detection within one well.

use crate::data::{Field, FieldValue, Flag, Overview};
use crate::error::Result;
use crate::filter::DataFilter;
use crate::stats;

/// Flags statistical outliers field by field within each well.
///
/// For every measured field, the effective values of the surviving
/// contractions define an IQR fence; values outside `[Q1 - 1.5*IQR,
/// Q3 + 1.5*IQR]` are outliers. An outlier in a critical field (duration,
/// amplitude, time to peak) condemns the whole contraction; in any other
/// field only that field is excluded, staged as [`FieldValue::Excluded`] so
/// later aggregation treats it as absent rather than zero.
///
/// Dispositions are staged while the fields are scanned, then materialized in
/// one pass at the end, so a deletion decided by one field does not shrink
/// the statistic of the next field mid-run. Field overrides stay staged until
/// the orchestrator commits.
pub struct ContractionOutlierFilter;

impl ContractionOutlierFilter {
    fn flag_field_outliers(field: Field, overview: &mut Overview) {
        let values: Vec<f64> = overview
            .contractions
            .iter()
            .filter(|c| !c.is_deleted())
            .filter_map(|c| c.effective_numeric(field, 0.0))
            .collect();
        let Some(fences) = stats::quartiles(&values) else {
            return;
        };

        for contraction in &mut overview.contractions {
            if contraction.is_deleted() {
                continue;
            }
            let Some(value) = contraction.effective_numeric(field, 0.0) else {
                continue;
            };
            if fences.is_outlier(value) {
                if field.is_critical() {
                    contraction.stage_flag(Flag::Delete);
                } else {
                    contraction.stage(field, FieldValue::Excluded);
                }
            }
        }
    }
}

impl DataFilter for ContractionOutlierFilter {
    fn name(&self) -> &'static str {
        "contraction_outlier"
    }

    fn apply(&self, overview: &mut Overview) -> Result<()> {
        for field in Field::ALL {
            Self::flag_field_outliers(field, overview);
        }
        // Materialize staged dispositions; staged field overrides are left
        // for the commit step.
        for contraction in &mut overview.contractions {
            if let Some(flag) = contraction.pending_flag.take() {
                if !contraction.is_deleted() {
                    contraction.flag = Some(flag);
                }
            }
        }
        Ok(())
    }
}
