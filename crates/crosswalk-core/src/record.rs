//! Shared record types for sections and cross-reference mappings.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Row identifier assigned by a record store.
pub type SectionId = i64;

/// One of the two legal codes being cross-referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeFamily {
    /// The repealed code (mapping source).
    Old,
    /// The successor code (mapping target).
    New,
}

impl CodeFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }
}

impl fmt::Display for CodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unrecognised code family: {0}")]
pub struct ParseCodeFamilyError(pub String);

impl FromStr for CodeFamily {
    type Err = ParseCodeFamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "old" => Ok(Self::Old),
            "new" => Ok(Self::New),
            _ => Err(ParseCodeFamilyError(s.to_string())),
        }
    }
}

/// One section of one code family, extracted from source text.
///
/// `(code_family, section_number)` is the natural key: a store never holds
/// two records with the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub code_family: CodeFamily,
    /// Digits with an optional uppercase suffix, e.g. "302" or "304B".
    pub section_number: String,
    /// Heading text from the boundary line; may be empty.
    pub title: String,
    /// Continuation lines, each preceded by a newline. The boundary line
    /// itself is not repeated here.
    pub body: String,
    pub effective_date: Option<NaiveDate>,
    pub repeal_date: Option<NaiveDate>,
}

/// A section record together with its store-assigned row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSection {
    pub id: SectionId,
    #[serde(flatten)]
    pub record: SectionRecord,
}

/// Classification of how closely a target section corresponds to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    /// Near-identical text; the section carried over essentially unchanged.
    Direct,
    /// Recognisable correspondence with substantive drafting changes.
    Modified,
}

impl MappingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unrecognised mapping type: {0}")]
pub struct ParseMappingTypeError(pub String);

impl FromStr for MappingType {
    type Err = ParseMappingTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "modified" => Ok(Self::Modified),
            _ => Err(ParseMappingTypeError(s.to_string())),
        }
    }
}

/// A proposed correspondence between one old-code section and one new-code
/// section.
///
/// `(source_id, target_id)` is the natural key: a store keeps at most one
/// mapping per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// Store id of the old-code section.
    pub source_id: SectionId,
    /// Store id of the new-code section.
    pub target_id: SectionId,
    /// Percentage-scaled combined similarity, 0..=100.
    pub confidence: u8,
    pub mapping_type: MappingType,
    /// Free-text provenance, e.g. the raw similarity score.
    pub notes: String,
}
