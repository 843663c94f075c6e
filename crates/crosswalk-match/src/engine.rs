//! Best-match selection across code families.
//!
//! For every old-code section the engine scores all new-code candidates,
//! keeps the single best above the confidence floor, and classifies the match
//! as a direct or modified carry-over. Selection is pure and deterministic;
//! persistence is the caller's concern.

use crosswalk_core::{MappingRecord, MappingType, StoredSection};
use tracing::debug;

use crate::similarity::SimilarityScorer;

/// Scoring weights and decision thresholds.
///
/// `title_weight + body_weight` is expected to sum to 1. Both floors are
/// exclusive: a best match scoring exactly `min_score` emits nothing, and a
/// mapping scoring exactly `direct_threshold` stays `modified`.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    pub title_weight: f64,
    pub body_weight: f64,
    pub min_score: f64,
    pub direct_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            title_weight: 0.4,
            body_weight: 0.6,
            min_score: 0.6,
            direct_threshold: 0.85,
        }
    }
}

/// Cross-reference mapping engine: argmax over pairwise scores with a
/// lexicographic tie-break on the target's section number.
pub struct MappingEngine<S> {
    scorer: S,
    config: MatchConfig,
}

impl<S: SimilarityScorer> MappingEngine<S> {
    pub fn new(scorer: S, config: MatchConfig) -> Self {
        Self { scorer, config }
    }

    /// Composite score for one candidate pair: weighted title similarity
    /// plus weighted body similarity.
    pub fn combined_score(&self, source: &StoredSection, target: &StoredSection) -> f64 {
        let title_sim = self.scorer.score(&source.record.title, &target.record.title);
        let body_sim = self.scorer.score(&source.record.body, &target.record.body);
        self.config.title_weight * title_sim + self.config.body_weight * body_sim
    }

    /// Map every source section onto its best-scoring target.
    ///
    /// Sources with no candidate above the floor produce no record; the pass
    /// always completes over all sources. Output order follows `sources`.
    /// Ties on score go to the lexicographically lowest target section
    /// number, so a rerun reproduces the same records regardless of the
    /// candidate order handed in.
    pub fn map_all(
        &self,
        sources: &[StoredSection],
        targets: &[StoredSection],
    ) -> Vec<MappingRecord> {
        let mut candidates: Vec<&StoredSection> = targets.iter().collect();
        candidates.sort_by(|x, y| x.record.section_number.cmp(&y.record.section_number));

        let mut mappings = Vec::new();
        for source in sources {
            match self.best_target(source, &candidates) {
                Some((target, score)) => mappings.push(self.to_record(source, target, score)),
                None => debug!(
                    section = %source.record.section_number,
                    "no confident match"
                ),
            }
        }
        mappings
    }

    /// Argmax over `candidates`; `None` when the best scores at or below the
    /// floor. `candidates` must already be sorted by section number so the
    /// strict comparison keeps the lowest number on ties.
    fn best_target<'t>(
        &self,
        source: &StoredSection,
        candidates: &[&'t StoredSection],
    ) -> Option<(&'t StoredSection, f64)> {
        let mut best: Option<&StoredSection> = None;
        let mut best_score = f64::NEG_INFINITY;

        for candidate in candidates {
            let score = self.combined_score(source, candidate);
            if score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        if best_score > self.config.min_score {
            best.map(|target| (target, best_score))
        } else {
            None
        }
    }

    fn to_record(
        &self,
        source: &StoredSection,
        target: &StoredSection,
        score: f64,
    ) -> MappingRecord {
        let mapping_type = if score > self.config.direct_threshold {
            MappingType::Direct
        } else {
            MappingType::Modified
        };
        MappingRecord {
            source_id: source.id,
            target_id: target.id,
            confidence: (score * 100.0).round() as u8,
            mapping_type,
            notes: format!("Automatically mapped with score {score:.2}"),
        }
    }
}
