//! The authoritative ingest-and-map pass over both code families.

use anyhow::Result;
use chrono::NaiveDate;
use crosswalk_core::{CodeFamily, extract_sections, normalize};
use crosswalk_match::{MappingEngine, SimilarityScorer};
use crosswalk_source::DocumentSource;
use crosswalk_store::{RecordStore, UpsertStats};
use tracing::{info, warn};

/// Dates stamped on newly ingested sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub old_effective: Option<NaiveDate>,
    pub new_effective: Option<NaiveDate>,
}

impl PipelineOptions {
    /// `(effective_date, repeal_date)` for one family. The old code counts
    /// as repealed the day the new one takes effect.
    fn dates_for(&self, family: CodeFamily) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match family {
            CodeFamily::Old => (self.old_effective, self.new_effective),
            CodeFamily::New => (self.new_effective, None),
        }
    }
}

/// What happened to one family during ingest.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyReport {
    pub fetched: bool,
    pub extracted: usize,
    pub sections: UpsertStats,
}

/// Summary of a full run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunReport {
    pub old: FamilyReport,
    pub new: FamilyReport,
    pub computed: usize,
    pub mappings: UpsertStats,
}

/// Ingest both code families, then upsert best-match mappings between them.
///
/// A failed fetch skips that family and the run carries on with whatever the
/// store already holds. Reruns over the same documents change nothing: both
/// section and mapping upserts keep the first write.
pub async fn run_pipeline<S: SimilarityScorer>(
    source: &dyn DocumentSource,
    store: &mut dyn RecordStore,
    engine: &MappingEngine<S>,
    options: &PipelineOptions,
) -> Result<RunReport> {
    let old = ingest_family(source, store, CodeFamily::Old, options).await?;
    let new = ingest_family(source, store, CodeFamily::New, options).await?;

    let sources = store.list_sections(CodeFamily::Old)?;
    let targets = store.list_sections(CodeFamily::New)?;
    let computed = engine.map_all(&sources, &targets);
    let mappings = store.upsert_mappings(&computed)?;
    info!(
        computed = computed.len(),
        inserted = mappings.inserted,
        skipped = mappings.skipped,
        "mapping pass complete"
    );

    Ok(RunReport {
        old,
        new,
        computed: computed.len(),
        mappings,
    })
}

async fn ingest_family(
    source: &dyn DocumentSource,
    store: &mut dyn RecordStore,
    family: CodeFamily,
    options: &PipelineOptions,
) -> Result<FamilyReport> {
    let raw = match source.fetch(family).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(family = %family, error = %err, "fetch failed, skipping family");
            return Ok(FamilyReport::default());
        }
    };

    let mut records = extract_sections(&normalize(&raw), family);
    let (effective, repeal) = options.dates_for(family);
    for record in &mut records {
        record.effective_date = effective;
        record.repeal_date = repeal;
    }

    let stats = store.upsert_sections(&records)?;
    info!(
        family = %family,
        extracted = records.len(),
        inserted = stats.inserted,
        skipped = stats.skipped,
        "family ingested"
    );
    Ok(FamilyReport {
        fetched: true,
        extracted: records.len(),
        sections: stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crosswalk_core::MappingType;
    use crosswalk_match::{DiffRatioScorer, MatchConfig};
    use crosswalk_source::SourceError;
    use crosswalk_store::MemStore;

    /// Serves a canned document per family; `None` means the fetch fails.
    struct StubSource {
        old: Option<String>,
        new: Option<String>,
    }

    #[async_trait]
    impl DocumentSource for StubSource {
        async fn fetch(&self, family: CodeFamily) -> Result<String, SourceError> {
            let doc = match family {
                CodeFamily::Old => &self.old,
                CodeFamily::New => &self.new,
            };
            doc.clone().ok_or(SourceError::NotFound {
                family,
                location: "stub".to_string(),
            })
        }
    }

    const OLD_DOC: &str = "\
Preamble text the parser must discard.
302. Murder
Whoever commits murder shall be punished with death or imprisonment for life.
378. Theft
Whoever intends to take dishonestly any movable property commits theft.
";

    const NEW_DOC: &str = "\
101 - Murder
Whoever commits murder shall be punished with death or imprisonment for life and shall also be liable to fine.
303 - Theft
Whoever intends to take dishonestly any movable property commits theft.
";

    fn both_docs() -> StubSource {
        StubSource {
            old: Some(OLD_DOC.to_string()),
            new: Some(NEW_DOC.to_string()),
        }
    }

    fn engine() -> MappingEngine<DiffRatioScorer> {
        MappingEngine::new(DiffRatioScorer, MatchConfig::default())
    }

    #[tokio::test]
    async fn full_run_ingests_and_maps() {
        let mut store = MemStore::new();
        let report = run_pipeline(
            &both_docs(),
            &mut store,
            &engine(),
            &PipelineOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.old.extracted, 2);
        assert_eq!(report.new.extracted, 2);
        assert_eq!(report.computed, 2);
        assert_eq!(report.mappings.inserted, 2);

        let murder = store.find_section(CodeFamily::Old, "302").unwrap().unwrap();
        let target = store.find_section(CodeFamily::New, "101").unwrap().unwrap();
        let edges = store.mappings_for_source(murder.id).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target_id, target.id);
        assert_eq!(edges[0].mapping_type, MappingType::Direct);
        assert_eq!(edges[0].confidence, 90);

        // Identical theft text maps with full confidence.
        let theft = store.find_section(CodeFamily::Old, "378").unwrap().unwrap();
        let edges = store.mappings_for_source(theft.id).unwrap();
        assert_eq!(edges[0].confidence, 100);
    }

    #[tokio::test]
    async fn rerun_changes_nothing() {
        let mut store = MemStore::new();
        let first = run_pipeline(
            &both_docs(),
            &mut store,
            &engine(),
            &PipelineOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(first.mappings.inserted, 2);

        let second = run_pipeline(
            &both_docs(),
            &mut store,
            &engine(),
            &PipelineOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(second.old.sections.inserted, 0);
        assert_eq!(second.old.sections.skipped, 2);
        assert_eq!(second.mappings.inserted, 0);
        assert_eq!(second.mappings.skipped, 2);
        assert_eq!(store.section_count(CodeFamily::Old).unwrap(), 2);
        assert_eq!(store.mapping_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_skips_family() {
        let mut store = MemStore::new();
        let source = StubSource {
            old: Some(OLD_DOC.to_string()),
            new: None,
        };
        let report = run_pipeline(&source, &mut store, &engine(), &PipelineOptions::default())
            .await
            .unwrap();

        assert!(report.old.fetched);
        assert!(!report.new.fetched);
        assert_eq!(report.old.sections.inserted, 2);
        // No targets, so the mapping pass has nothing to emit.
        assert_eq!(report.computed, 0);
        assert_eq!(store.mapping_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn dates_are_stamped_per_family() {
        let mut store = MemStore::new();
        let options = PipelineOptions {
            old_effective: Some("1860-01-01".parse().unwrap()),
            new_effective: Some("2024-07-01".parse().unwrap()),
        };
        run_pipeline(&both_docs(), &mut store, &engine(), &options)
            .await
            .unwrap();

        let old = store.find_section(CodeFamily::Old, "302").unwrap().unwrap();
        assert_eq!(old.record.effective_date, options.old_effective);
        assert_eq!(old.record.repeal_date, options.new_effective);

        let new = store.find_section(CodeFamily::New, "101").unwrap().unwrap();
        assert_eq!(new.record.effective_date, options.new_effective);
        assert_eq!(new.record.repeal_date, None);
    }

    #[tokio::test]
    async fn documents_without_headings_yield_empty_run() {
        let mut store = MemStore::new();
        let source = StubSource {
            old: Some("Preamble only, nothing numbered.".to_string()),
            new: Some("More prose without headings.".to_string()),
        };
        let report = run_pipeline(&source, &mut store, &engine(), &PipelineOptions::default())
            .await
            .unwrap();

        assert!(report.old.fetched);
        assert_eq!(report.old.extracted, 0);
        assert_eq!(report.computed, 0);
        assert_eq!(store.section_count(CodeFamily::Old).unwrap(), 0);
    }
}
