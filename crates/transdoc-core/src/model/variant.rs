//! Output flavor of a translated file, inferred from its file name.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    #[default]
    Original,
    OriginalCut,
    Mono,
    MonoCut,
    Dual,
    DualCut,
    Compare,
    CropCompare,
}

/// Suffixes the server appends to produced files. Matching picks the longest.
const SUFFIXES: &[(&str, Variant)] = &[
    ("crop-compare.pdf", Variant::CropCompare),
    ("compare.pdf", Variant::Compare),
    ("mono-cut.pdf", Variant::MonoCut),
    ("dual-cut.pdf", Variant::DualCut),
    ("mono.pdf", Variant::Mono),
    ("dual.pdf", Variant::Dual),
    ("cut.pdf", Variant::OriginalCut),
];

impl Variant {
    /// Classifies a produced file name; the most specific matching suffix wins,
    /// anything unmatched is `Original`.
    pub fn classify(file_name: &str) -> Variant {
        let lower = file_name.to_ascii_lowercase();
        SUFFIXES
            .iter()
            .filter(|(suffix, _)| lower.ends_with(suffix))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, v)| *v)
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Original => "original",
            Variant::OriginalCut => "original-cut",
            Variant::Mono => "mono",
            Variant::MonoCut => "mono-cut",
            Variant::Dual => "dual",
            Variant::DualCut => "dual-cut",
            Variant::Compare => "compare",
            Variant::CropCompare => "crop-compare",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
