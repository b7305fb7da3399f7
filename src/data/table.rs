//! The per-experiment table of wells, and the staged-edit commit step.

use crate::data::overview::Overview;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn third_word_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w+\b\s+\b\w+\b\s+\b(\w+)\b").expect("third word pattern"))
}

fn hz_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)Hz").expect("hz pattern"))
}

/// All wells of one experiment.
///
/// The order of `overviews` is not semantically meaningful; reports sort by
/// well id before writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewTable {
    pub name: String,
    pub overviews: Vec<Overview>,
}

impl OverviewTable {
    pub fn new(name: impl Into<String>, overviews: Vec<Overview>) -> Self {
        Self {
            name: name.into(),
            overviews,
        }
    }

    /// Pacing frequency encoded in the table name, if any.
    ///
    /// The third word of the experiment name carries the pacing mode:
    /// `spont` means spontaneous beating (treated as 1 Hz), `<n>Hz` means
    /// paced at n Hz. Anything else yields `None` and the caller must supply
    /// the frequency explicitly.
    pub fn hz_frequency(&self) -> Option<f64> {
        let third = third_word_pattern().captures(&self.name)?[1].to_string();
        if third.eq_ignore_ascii_case("spont") {
            return Some(1.0);
        }
        let captures = hz_pattern().captures(&third)?;
        captures[1].parse::<f64>().ok()
    }

    /// Materialize all staged edits.
    ///
    /// Wells flagged for deletion are dropped. In every surviving well,
    /// contractions flagged for deletion are dropped, each kept contraction's
    /// pending overrides are merged into its stored fields, and all flags are
    /// cleared. Running commit twice without an intervening filter is a
    /// no-op the second time.
    pub fn commit(&mut self) {
        self.overviews.retain(|o| !o.is_deleted());
        for overview in &mut self.overviews {
            overview.flag = None;
            overview.contractions.retain(|c| !c.is_deleted());
            for contraction in &mut overview.contractions {
                contraction.apply_pending();
                contraction.flag = None;
            }
        }
    }

    /// Sort wells by their alphanumeric well id.
    pub fn sort_by_well(&mut self) {
        self.overviews.sort_by_key(|o| o.sort_key());
    }
}
