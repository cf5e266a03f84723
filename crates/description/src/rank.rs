use crate::error::DescriptionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vocab_model::vocab::{skos, skosxl};

/// Lexicalization model of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexicalizationModel {
    Rdfs,
    Skos,
    SkosXl,
    Ontolex,
}

impl LexicalizationModel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LexicalizationModel::Rdfs => "rdfs",
            LexicalizationModel::Skos => "skos",
            LexicalizationModel::SkosXl => "skosxl",
            LexicalizationModel::Ontolex => "ontolex",
        }
    }
}

impl fmt::Display for LexicalizationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LexicalizationModel {
    type Err = DescriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rdfs" => Ok(Self::Rdfs),
            "skos" => Ok(Self::Skos),
            "skosxl" | "skos-xl" => Ok(Self::SkosXl),
            "ontolex" | "ontolex-lemon" => Ok(Self::Ontolex),
            _ => Err(DescriptionError::UnknownModel(s.to_string())),
        }
    }
}

// Lower rank sorts first. RDFS and OntoLex have no entries: their groups keep
// insertion order.
const RANKS: &[(LexicalizationModel, &str, u8)] = &[
    (LexicalizationModel::Skos, skos::PREF_LABEL, 0),
    (LexicalizationModel::Skos, skos::ALT_LABEL, 1),
    (LexicalizationModel::Skos, skos::HIDDEN_LABEL, 2),
    (LexicalizationModel::SkosXl, skosxl::PREF_LABEL, 0),
    (LexicalizationModel::SkosXl, skosxl::ALT_LABEL, 1),
    (LexicalizationModel::SkosXl, skosxl::HIDDEN_LABEL, 2),
];

/// Sort rank of a lexicalization predicate under `model`, if ranked
#[must_use]
pub fn predicate_rank(model: LexicalizationModel, predicate: &str) -> Option<u8> {
    RANKS
        .iter()
        .find(|(m, p, _)| *m == model && *p == predicate)
        .map(|(_, _, rank)| *rank)
}
