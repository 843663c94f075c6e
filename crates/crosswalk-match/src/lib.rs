//! Matching layer: pairwise text similarity and best-match mapping selection.

pub mod engine;
pub mod similarity;

pub use engine::{MappingEngine, MatchConfig};
pub use similarity::{DiffRatioScorer, SimilarityScorer};
