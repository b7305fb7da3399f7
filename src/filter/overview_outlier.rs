//! Cross-well IQR outlier detection on per-well averages.

use crate::data::{Field, Flag, Overview, OverviewTable};
use crate::error::Result;
use crate::filter::DataFilter;
use crate::stats;
use std::collections::HashMap;

/// Deletes whole wells whose average critical-field values are outliers
/// within their experimental group.
///
/// For each critical field, every well's mean over its surviving,
/// non-excluded contraction values is compared against the IQR fences of the
/// per-well means across the group. A well with no eligible values at all is
/// deleted outright. The statistic requires cross-well comparison, so the
/// single-well entry point is deliberately a no-op.
pub struct OverviewOutlierFilter;

impl OverviewOutlierFilter {
    /// Mean of `field` over the well's surviving, non-excluded contractions.
    ///
    /// Flags the well for deletion and returns `None` when no contraction
    /// contributes a value.
    fn well_mean(field: Field, overview: &mut Overview) -> Option<f64> {
        let values: Vec<f64> = overview
            .contractions
            .iter()
            .filter(|c| !c.is_deleted())
            .filter_map(|c| c.effective_numeric(field, 0.0))
            .collect();
        match stats::mean(&values) {
            Some(mean) => Some(mean),
            None => {
                overview.flag = Some(Flag::Delete);
                None
            }
        }
    }

    fn flag_group_outliers(field: Field, table: &mut OverviewTable, indices: &[usize]) {
        let mut means = Vec::with_capacity(indices.len());
        for &i in indices {
            if let Some(mean) = Self::well_mean(field, &mut table.overviews[i]) {
                means.push((i, mean));
            }
        }
        let values: Vec<f64> = means.iter().map(|(_, m)| *m).collect();
        let Some(fences) = stats::quartiles(&values) else {
            return;
        };

        for (i, mean) in means {
            let overview = &mut table.overviews[i];
            if overview.is_deleted() {
                continue;
            }
            if fences.is_outlier(mean) {
                overview.flag = Some(Flag::Delete);
            }
        }
    }
}

impl DataFilter for OverviewOutlierFilter {
    fn name(&self) -> &'static str {
        "overview_outlier"
    }

    /// No-op: outliers among wells only exist relative to the group.
    fn apply(&self, _overview: &mut Overview) -> Result<()> {
        Ok(())
    }

    fn apply_all(&self, table: &mut OverviewTable) -> Result<()> {
        for field in Field::CRITICAL {
            let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
            for (i, overview) in table.overviews.iter().enumerate() {
                if !overview.is_deleted() {
                    groups.entry(overview.group.clone()).or_default().push(i);
                }
            }
            for indices in groups.values() {
                Self::flag_group_outliers(field, table, indices);
            }
        }
        Ok(())
    }
}
