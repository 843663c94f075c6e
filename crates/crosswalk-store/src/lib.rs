//! Storage layer: section and mapping records behind a swappable [`RecordStore`] trait.

mod error;
pub use error::StoreError;

pub mod mem;
pub use mem::MemStore;

#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crosswalk_core::{CodeFamily, MappingRecord, SectionId, SectionRecord, StoredSection};

/// Outcome of a single section upsert: the row id, and whether a new row was
/// written or an existing one kept.
#[derive(Debug, Clone, Copy)]
pub struct SectionUpsert {
    pub id: SectionId,
    pub inserted: bool,
}

/// Counters from a batch upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertStats {
    pub inserted: usize,
    pub skipped: usize,
}

/// Persistence seam for section and mapping records.
///
/// Sections are keyed by `(code_family, section_number)` and mappings by
/// `(source_id, target_id)`. Backends assign section ids on insert and must
/// preserve insertion order in [`list_sections`](Self::list_sections).
pub trait RecordStore {
    /// Insert a section and return its assigned id.
    fn insert_section(&mut self, record: &SectionRecord) -> Result<SectionId, StoreError>;

    /// Look up a section by its natural key.
    fn find_section(
        &self,
        family: CodeFamily,
        number: &str,
    ) -> Result<Option<StoredSection>, StoreError>;

    /// Look up a section by id.
    fn get_section(&self, id: SectionId) -> Result<Option<StoredSection>, StoreError>;

    /// All sections of one family, in insertion order.
    fn list_sections(&self, family: CodeFamily) -> Result<Vec<StoredSection>, StoreError>;

    /// Sections whose body contains `query`, ASCII case-insensitive, at most
    /// `limit` rows in insertion order.
    fn search_sections(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StoredSection>, StoreError>;

    /// Insert a mapping edge between two stored sections.
    fn insert_mapping(&mut self, mapping: &MappingRecord) -> Result<(), StoreError>;

    /// Look up a mapping by its endpoint pair.
    fn find_mapping(
        &self,
        source_id: SectionId,
        target_id: SectionId,
    ) -> Result<Option<MappingRecord>, StoreError>;

    /// All mappings out of one source section.
    fn mappings_for_source(&self, source_id: SectionId) -> Result<Vec<MappingRecord>, StoreError>;

    fn section_count(&self, family: CodeFamily) -> Result<usize, StoreError>;

    fn mapping_count(&self) -> Result<usize, StoreError>;

    // ── Idempotent upserts ──

    /// Insert the section unless its natural key already exists.
    ///
    /// The first write wins: an existing row is never overwritten, so a rerun
    /// over the same input leaves the store unchanged.
    fn upsert_section(&mut self, record: &SectionRecord) -> Result<SectionUpsert, StoreError> {
        if let Some(existing) = self.find_section(record.code_family, &record.section_number)? {
            return Ok(SectionUpsert {
                id: existing.id,
                inserted: false,
            });
        }
        let id = self.insert_section(record)?;
        Ok(SectionUpsert { id, inserted: true })
    }

    /// Insert the mapping unless its endpoint pair already exists. Returns
    /// whether a row was written.
    fn upsert_mapping(&mut self, mapping: &MappingRecord) -> Result<bool, StoreError> {
        if self
            .find_mapping(mapping.source_id, mapping.target_id)?
            .is_some()
        {
            return Ok(false);
        }
        self.insert_mapping(mapping)?;
        Ok(true)
    }

    /// Upsert a batch of sections, counting inserts and skips.
    fn upsert_sections(&mut self, records: &[SectionRecord]) -> Result<UpsertStats, StoreError> {
        let mut stats = UpsertStats::default();
        for record in records {
            if self.upsert_section(record)?.inserted {
                stats.inserted += 1;
            } else {
                stats.skipped += 1;
            }
        }
        Ok(stats)
    }

    /// Upsert a batch of mappings, counting inserts and skips.
    fn upsert_mappings(&mut self, mappings: &[MappingRecord]) -> Result<UpsertStats, StoreError> {
        let mut stats = UpsertStats::default();
        for mapping in mappings {
            if self.upsert_mapping(mapping)? {
                stats.inserted += 1;
            } else {
                stats.skipped += 1;
            }
        }
        Ok(stats)
    }
}
