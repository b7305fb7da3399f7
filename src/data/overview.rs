//! One well's full contraction sequence plus its metadata.

use crate::data::contraction::{Contraction, Flag};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn well_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Well\s+(\w+)").expect("well pattern"))
}

fn group_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bWell\b \w+ (\w+)").expect("group pattern"))
}

/// The contraction sequence recorded for a single well.
///
/// Constructed once from raw input and then mutated in place by each filter
/// stage: flags set, overrides staged. A well flagged `Delete` is dropped
/// from the table at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    /// Experimental group the well belongs to.
    pub group: String,
    /// Well identifier, e.g. "B1".
    pub well: String,
    pub contractions: Vec<Contraction>,
    pub flag: Option<Flag>,
}

impl Overview {
    pub fn new(group: impl Into<String>, well: impl Into<String>, contractions: Vec<Contraction>) -> Self {
        Self {
            group: group.into(),
            well: well.into(),
            contractions,
            flag: None,
        }
    }

    /// Build an overview from a raw acquisition folder name.
    ///
    /// Folder names look like
    /// `"1Week MTs Plate B spont 04052024 Well B1 MM current001-Contr-Results"`:
    /// the word after `Well` is the well id and the word after that is the
    /// group. Falls back to the whole name when the pattern is absent.
    pub fn from_folder_name(folder_name: &str, contractions: Vec<Contraction>) -> Self {
        let well = well_pattern()
            .captures(folder_name)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| folder_name.to_string());
        let group = group_pattern()
            .captures(folder_name)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| folder_name.to_string());
        Self::new(group, well, contractions)
    }

    pub fn is_deleted(&self) -> bool {
        self.flag == Some(Flag::Delete)
    }

    /// Sort key splitting the well id into its letter and number parts, so
    /// "B2" sorts before "B10".
    pub fn sort_key(&self) -> (String, u32) {
        let letters: String = self.well.chars().filter(|c| c.is_alphabetic()).collect();
        let digits: String = self.well.chars().filter(|c| c.is_ascii_digit()).collect();
        (letters, digits.parse().unwrap_or(0))
    }
}
