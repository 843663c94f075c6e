//! In-memory store for tests and one-shot runs.

use crosswalk_core::{CodeFamily, MappingRecord, SectionId, SectionRecord, StoredSection};

use crate::{RecordStore, StoreError};

/// Vec-backed store with no persistence. Ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct MemStore {
    sections: Vec<StoredSection>,
    mappings: Vec<MappingRecord>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemStore {
    fn insert_section(&mut self, record: &SectionRecord) -> Result<SectionId, StoreError> {
        let id = self.sections.len() as SectionId + 1;
        self.sections.push(StoredSection {
            id,
            record: record.clone(),
        });
        Ok(id)
    }

    fn find_section(
        &self,
        family: CodeFamily,
        number: &str,
    ) -> Result<Option<StoredSection>, StoreError> {
        Ok(self
            .sections
            .iter()
            .find(|s| s.record.code_family == family && s.record.section_number == number)
            .cloned())
    }

    fn get_section(&self, id: SectionId) -> Result<Option<StoredSection>, StoreError> {
        Ok(self.sections.iter().find(|s| s.id == id).cloned())
    }

    fn list_sections(&self, family: CodeFamily) -> Result<Vec<StoredSection>, StoreError> {
        Ok(self
            .sections
            .iter()
            .filter(|s| s.record.code_family == family)
            .cloned()
            .collect())
    }

    fn search_sections(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StoredSection>, StoreError> {
        let needle = query.to_ascii_lowercase();
        Ok(self
            .sections
            .iter()
            .filter(|s| s.record.body.to_ascii_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    fn insert_mapping(&mut self, mapping: &MappingRecord) -> Result<(), StoreError> {
        self.mappings.push(mapping.clone());
        Ok(())
    }

    fn find_mapping(
        &self,
        source_id: SectionId,
        target_id: SectionId,
    ) -> Result<Option<MappingRecord>, StoreError> {
        Ok(self
            .mappings
            .iter()
            .find(|m| m.source_id == source_id && m.target_id == target_id)
            .cloned())
    }

    fn mappings_for_source(&self, source_id: SectionId) -> Result<Vec<MappingRecord>, StoreError> {
        Ok(self
            .mappings
            .iter()
            .filter(|m| m.source_id == source_id)
            .cloned()
            .collect())
    }

    fn section_count(&self, family: CodeFamily) -> Result<usize, StoreError> {
        Ok(self
            .sections
            .iter()
            .filter(|s| s.record.code_family == family)
            .count())
    }

    fn mapping_count(&self) -> Result<usize, StoreError> {
        Ok(self.mappings.len())
    }
}
