//! SQLite storage backend.

use std::path::Path;

use chrono::NaiveDate;
use crosswalk_core::{CodeFamily, MappingRecord, SectionId, SectionRecord, StoredSection};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use crate::{RecordStore, StoreError, UpsertStats};

const SECTION_COLUMNS: &str =
    "id, code_family, section_number, title, body, effective_date, repeal_date";

const MAPPING_COLUMNS: &str = "source_id, target_id, confidence, mapping_type, notes";

/// SQLite store for section and mapping records.
///
/// Natural keys are enforced by the schema: `(code_family, section_number)`
/// is UNIQUE on sections and `(source_id, target_id)` is the mappings primary
/// key. Dates are stored as ISO `YYYY-MM-DD` text.
///
/// Use [`open`](Self::open) for in-memory and
/// [`open_persistent`](Self::open_persistent) for file-backed storage that
/// survives across process restarts.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open an in-memory database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open or create a persistent database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sections (
            id INTEGER PRIMARY KEY,
            code_family TEXT NOT NULL,
            section_number TEXT NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            effective_date TEXT,
            repeal_date TEXT,
            UNIQUE (code_family, section_number)
        );
        CREATE TABLE IF NOT EXISTS mappings (
            source_id INTEGER NOT NULL REFERENCES sections(id),
            target_id INTEGER NOT NULL REFERENCES sections(id),
            confidence INTEGER NOT NULL,
            mapping_type TEXT NOT NULL,
            notes TEXT NOT NULL,
            PRIMARY KEY (source_id, target_id)
        );",
    )?;
    Ok(())
}

// Row readers return raw tuples inside the rusqlite closure; decoding into
// domain types happens outside so parse failures surface as StoreError.

type RawSection = (
    SectionId,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
);

fn read_section(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSection> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn decode_section(raw: RawSection) -> Result<StoredSection, StoreError> {
    let (id, family, section_number, title, body, effective, repeal) = raw;
    Ok(StoredSection {
        id,
        record: SectionRecord {
            code_family: family.parse()?,
            section_number,
            title,
            body,
            effective_date: effective.as_deref().map(|d| d.parse::<NaiveDate>()).transpose()?,
            repeal_date: repeal.as_deref().map(|d| d.parse::<NaiveDate>()).transpose()?,
        },
    })
}

type RawMapping = (SectionId, SectionId, u8, String, String);

fn read_mapping(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMapping> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn decode_mapping(raw: RawMapping) -> Result<MappingRecord, StoreError> {
    let (source_id, target_id, confidence, mapping_type, notes) = raw;
    Ok(MappingRecord {
        source_id,
        target_id,
        confidence,
        mapping_type: mapping_type.parse()?,
        notes,
    })
}

fn insert_section_row(conn: &Connection, record: &SectionRecord) -> Result<SectionId, StoreError> {
    conn.execute(
        "INSERT INTO sections (code_family, section_number, title, body, effective_date, repeal_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.code_family.as_str(),
            &record.section_number,
            &record.title,
            &record.body,
            record.effective_date.map(|d| d.to_string()),
            record.repeal_date.map(|d| d.to_string()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn find_section_row(
    conn: &Connection,
    family: CodeFamily,
    number: &str,
) -> Result<Option<StoredSection>, StoreError> {
    let sql = format!(
        "SELECT {SECTION_COLUMNS} FROM sections WHERE code_family = ?1 AND section_number = ?2"
    );
    let raw = conn
        .query_row(&sql, params![family.as_str(), number], read_section)
        .optional()?;
    raw.map(decode_section).transpose()
}

fn insert_mapping_row(conn: &Connection, mapping: &MappingRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO mappings (source_id, target_id, confidence, mapping_type, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            mapping.source_id,
            mapping.target_id,
            mapping.confidence,
            mapping.mapping_type.as_str(),
            &mapping.notes,
        ],
    )?;
    Ok(())
}

fn find_mapping_row(
    conn: &Connection,
    source_id: SectionId,
    target_id: SectionId,
) -> Result<Option<MappingRecord>, StoreError> {
    let sql =
        format!("SELECT {MAPPING_COLUMNS} FROM mappings WHERE source_id = ?1 AND target_id = ?2");
    let raw = conn
        .query_row(&sql, params![source_id, target_id], read_mapping)
        .optional()?;
    raw.map(decode_mapping).transpose()
}

impl RecordStore for SqliteStore {
    fn insert_section(&mut self, record: &SectionRecord) -> Result<SectionId, StoreError> {
        insert_section_row(&self.conn, record)
    }

    fn find_section(
        &self,
        family: CodeFamily,
        number: &str,
    ) -> Result<Option<StoredSection>, StoreError> {
        find_section_row(&self.conn, family, number)
    }

    fn get_section(&self, id: SectionId) -> Result<Option<StoredSection>, StoreError> {
        let sql = format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = ?1");
        let raw = self
            .conn
            .query_row(&sql, params![id], read_section)
            .optional()?;
        raw.map(decode_section).transpose()
    }

    fn list_sections(&self, family: CodeFamily) -> Result<Vec<StoredSection>, StoreError> {
        let sql =
            format!("SELECT {SECTION_COLUMNS} FROM sections WHERE code_family = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let raws = stmt
            .query_map(params![family.as_str()], read_section)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(decode_section).collect()
    }

    fn search_sections(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StoredSection>, StoreError> {
        // instr over lower() gives plain substring semantics; LIKE would
        // treat % and _ in the query as wildcards.
        let sql = format!(
            "SELECT {SECTION_COLUMNS} FROM sections
             WHERE instr(lower(body), lower(?1)) > 0
             ORDER BY id LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let raws = stmt
            .query_map(params![query, limit as i64], read_section)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(decode_section).collect()
    }

    fn insert_mapping(&mut self, mapping: &MappingRecord) -> Result<(), StoreError> {
        insert_mapping_row(&self.conn, mapping)
    }

    fn find_mapping(
        &self,
        source_id: SectionId,
        target_id: SectionId,
    ) -> Result<Option<MappingRecord>, StoreError> {
        find_mapping_row(&self.conn, source_id, target_id)
    }

    fn mappings_for_source(&self, source_id: SectionId) -> Result<Vec<MappingRecord>, StoreError> {
        let sql = format!(
            "SELECT {MAPPING_COLUMNS} FROM mappings WHERE source_id = ?1 ORDER BY target_id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let raws = stmt
            .query_map(params![source_id], read_mapping)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(decode_mapping).collect()
    }

    fn section_count(&self, family: CodeFamily) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM sections WHERE code_family = ?1",
            params![family.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn mapping_count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT count(*) FROM mappings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ── Batched upserts ──
    //
    // One transaction per batch instead of autocommit per row.

    fn upsert_sections(&mut self, records: &[SectionRecord]) -> Result<UpsertStats, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut stats = UpsertStats::default();
        for record in records {
            if find_section_row(&tx, record.code_family, &record.section_number)?.is_some() {
                stats.skipped += 1;
            } else {
                insert_section_row(&tx, record)?;
                stats.inserted += 1;
            }
        }
        tx.commit()?;
        info!(
            inserted = stats.inserted,
            skipped = stats.skipped,
            "section batch committed"
        );
        Ok(stats)
    }

    fn upsert_mappings(&mut self, mappings: &[MappingRecord]) -> Result<UpsertStats, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut stats = UpsertStats::default();
        for mapping in mappings {
            if find_mapping_row(&tx, mapping.source_id, mapping.target_id)?.is_some() {
                stats.skipped += 1;
            } else {
                insert_mapping_row(&tx, mapping)?;
                stats.inserted += 1;
            }
        }
        tx.commit()?;
        info!(
            inserted = stats.inserted,
            skipped = stats.skipped,
            "mapping batch committed"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosswalk_core::MappingType;

    fn section(family: CodeFamily, number: &str, title: &str, body: &str) -> SectionRecord {
        SectionRecord {
            code_family: family,
            section_number: number.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            effective_date: None,
            repeal_date: None,
        }
    }

    fn mapping(source_id: SectionId, target_id: SectionId) -> MappingRecord {
        MappingRecord {
            source_id,
            target_id,
            confidence: 72,
            mapping_type: MappingType::Modified,
            notes: "Automatically mapped with score 0.72".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn section_round_trips_all_fields() {
        let mut store = SqliteStore::open().unwrap();
        let mut record = section(CodeFamily::Old, "302", "Murder", "Whoever commits murder.");
        record.effective_date = Some(date("1860-01-01"));
        record.repeal_date = Some(date("2024-06-30"));

        let id = store.insert_section(&record).unwrap();
        let stored = store.find_section(CodeFamily::Old, "302").unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.record, record);
        assert_eq!(store.get_section(id).unwrap().unwrap().record, record);
    }

    #[test]
    fn duplicate_natural_key_is_rejected_by_schema() {
        let mut store = SqliteStore::open().unwrap();
        store
            .insert_section(&section(CodeFamily::Old, "302", "Murder", "a"))
            .unwrap();
        let result = store.insert_section(&section(CodeFamily::Old, "302", "Murder", "b"));
        assert!(matches!(result, Err(StoreError::Sqlite(_))));

        // Same number under the other family is a different key.
        store
            .insert_section(&section(CodeFamily::New, "302", "Other", "c"))
            .unwrap();
    }

    #[test]
    fn upsert_keeps_existing_row() {
        let mut store = SqliteStore::open().unwrap();
        let first = store
            .upsert_section(&section(CodeFamily::Old, "302", "Murder", "original"))
            .unwrap();
        let second = store
            .upsert_section(&section(CodeFamily::Old, "302", "Murder", "rewritten"))
            .unwrap();
        assert!(first.inserted);
        assert!(!second.inserted);
        assert_eq!(second.id, first.id);

        let stored = store.find_section(CodeFamily::Old, "302").unwrap().unwrap();
        assert_eq!(stored.record.body, "original");
    }

    #[test]
    fn batch_upsert_counts_inserts_and_skips() {
        let mut store = SqliteStore::open().unwrap();
        store
            .insert_section(&section(CodeFamily::Old, "302", "Murder", "body"))
            .unwrap();

        let batch = [
            section(CodeFamily::Old, "302", "Murder", "body"),
            section(CodeFamily::Old, "378", "Theft", "body"),
        ];
        let stats = store.upsert_sections(&batch).unwrap();
        assert_eq!(
            stats,
            UpsertStats {
                inserted: 1,
                skipped: 1
            }
        );
        assert_eq!(store.section_count(CodeFamily::Old).unwrap(), 2);
    }

    #[test]
    fn list_orders_by_insertion() {
        let mut store = SqliteStore::open().unwrap();
        for number in ["302", "99", "101"] {
            store
                .insert_section(&section(CodeFamily::New, number, "", ""))
                .unwrap();
        }
        let numbers: Vec<String> = store
            .list_sections(CodeFamily::New)
            .unwrap()
            .into_iter()
            .map(|s| s.record.section_number)
            .collect();
        assert_eq!(numbers, ["302", "99", "101"]);
    }

    #[test]
    fn search_is_substring_not_like_pattern() {
        let mut store = SqliteStore::open().unwrap();
        store
            .insert_section(&section(CodeFamily::Old, "302", "Murder", "Whoever commits MURDER"))
            .unwrap();
        store
            .insert_section(&section(CodeFamily::Old, "378", "Theft", "100% of movable property"))
            .unwrap();

        assert_eq!(store.search_sections("murder", 10).unwrap().len(), 1);
        // A literal % must not act as a wildcard.
        assert_eq!(store.search_sections("100%", 10).unwrap().len(), 1);
        assert_eq!(store.search_sections("% of movable", 10).unwrap().len(), 1);
        assert!(store.search_sections("%X%", 10).unwrap().is_empty());
    }

    #[test]
    fn mapping_round_trip_and_idempotence() {
        let mut store = SqliteStore::open().unwrap();
        let source = store
            .insert_section(&section(CodeFamily::Old, "302", "Murder", "a"))
            .unwrap();
        let target = store
            .insert_section(&section(CodeFamily::New, "101", "Murder", "b"))
            .unwrap();

        assert!(store.upsert_mapping(&mapping(source, target)).unwrap());
        assert!(!store.upsert_mapping(&mapping(source, target)).unwrap());
        assert_eq!(store.mapping_count().unwrap(), 1);

        let found = store.find_mapping(source, target).unwrap().unwrap();
        assert_eq!(found.mapping_type, MappingType::Modified);
        assert_eq!(found.confidence, 72);
        assert_eq!(found.notes, "Automatically mapped with score 0.72");

        let edges = store.mappings_for_source(source).unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn persistent_store_survives_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("crosswalk.db");

        let mut store = SqliteStore::open_persistent(&db_path).unwrap();
        let mut record = section(CodeFamily::Old, "302", "Murder", "Whoever commits murder.");
        record.effective_date = Some(date("1860-01-01"));
        let source = store.insert_section(&record).unwrap();
        let target = store
            .insert_section(&section(CodeFamily::New, "101", "Murder", "b"))
            .unwrap();
        store.insert_mapping(&mapping(source, target)).unwrap();
        drop(store);

        let store = SqliteStore::open_persistent(&db_path).unwrap();
        let stored = store.find_section(CodeFamily::Old, "302").unwrap().unwrap();
        assert_eq!(stored.record, record);
        assert_eq!(store.section_count(CodeFamily::Old).unwrap(), 1);
        assert_eq!(store.mapping_count().unwrap(), 1);
    }
}
