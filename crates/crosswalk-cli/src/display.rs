//! Plain-text cards for sections, mappings, and run reports.

use crosswalk_core::{MappingRecord, StoredSection};

use crate::pipeline::{FamilyReport, RunReport};

const BODY_PREVIEW_CHARS: usize = 160;

/// Print one section as a vertical card.
pub fn print_section(section: &StoredSection) {
    println!(
        "=== {} {} ===",
        section.record.code_family, section.record.section_number
    );
    if !section.record.title.is_empty() {
        println!("{}", section.record.title);
    }
    println!("  {:<12} {}", "id", section.id);
    if let Some(date) = section.record.effective_date {
        println!("  {:<12} {}", "effective", date);
    }
    if let Some(date) = section.record.repeal_date {
        println!("  {:<12} {}", "repealed", date);
    }
    let preview = body_preview(&section.record.body);
    if !preview.is_empty() {
        println!("  {}", preview);
    }
    println!();
}

/// Print every mapping out of `section`, with resolved targets where the
/// store still has them.
pub fn print_mappings(section: &StoredSection, rows: &[(MappingRecord, Option<StoredSection>)]) {
    println!(
        "=== {} {} -> {} mapping(s) ===",
        section.record.code_family,
        section.record.section_number,
        rows.len()
    );
    for (mapping, target) in rows {
        let label = match target {
            Some(t) => format!("{} {}", t.record.code_family, t.record.section_number),
            None => format!("id {}", mapping.target_id),
        };
        println!(
            "  {:<12} {:<10} {:>3}%  {}",
            label,
            mapping.mapping_type.as_str(),
            mapping.confidence,
            mapping.notes
        );
    }
    println!();
}

/// Print the outcome of a run.
pub fn print_report(report: &RunReport) {
    print_family("Old code", &report.old);
    print_family("New code", &report.new);
    println!("Mappings");
    println!("  {:<12} {}", "computed", report.computed);
    println!("  {:<12} {}", "inserted", report.mappings.inserted);
    println!("  {:<12} {}", "skipped", report.mappings.skipped);
}

fn print_family(header: &str, family: &FamilyReport) {
    println!("{header}");
    if !family.fetched {
        println!("  fetch failed, family skipped");
        println!();
        return;
    }
    println!("  {:<12} {}", "extracted", family.extracted);
    println!("  {:<12} {}", "inserted", family.sections.inserted);
    println!("  {:<12} {}", "skipped", family.sections.skipped);
    println!();
}

fn body_preview(body: &str) -> String {
    let flat = body.trim().replace('\n', " ");
    let mut preview: String = flat.chars().take(BODY_PREVIEW_CHARS).collect();
    if flat.chars().count() > BODY_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
