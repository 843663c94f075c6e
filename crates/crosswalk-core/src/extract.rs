//! Line-scanning section extraction.

use crate::boundary::BoundaryPattern;
use crate::record::{CodeFamily, SectionRecord};

/// Extract every section of `text` in source order.
///
/// `text` is expected to be normalised first (see [`crate::normalize`]).
///
/// # Algorithm
///
/// A single greedy forward pass with no lookahead:
///
/// 1. A line matching the family's boundary pattern closes the open section
///    (if any) and opens a new one with the captured number and title.
/// 2. Any other line extends the open section's body, appended with a
///    preceding newline.
/// 3. Lines before the first boundary are preamble and are discarded.
/// 4. At end of input the open section is emitted.
///
/// A boundary match is irrevocable: sections are never merged or split after
/// the fact, so a digit-initial continuation line does open a spurious
/// section. The boundary line itself is not repeated in `body`; the captured
/// title is the authoritative heading and `body` holds only the continuation
/// lines. Dates are left unset for callers to stamp per family.
pub fn extract_sections(text: &str, family: CodeFamily) -> Vec<SectionRecord> {
    let pattern = BoundaryPattern::for_family(family);
    let mut sections = Vec::new();
    let mut current: Option<SectionRecord> = None;

    for line in text.lines() {
        if let Some(boundary) = pattern.match_line(line) {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            current = Some(SectionRecord {
                code_family: family,
                section_number: boundary.number.to_string(),
                title: boundary.title.to_string(),
                body: String::new(),
                effective_date: None,
                repeal_date: None,
            });
        } else if let Some(open) = current.as_mut() {
            open.body.push('\n');
            open.body.push_str(line);
        }
    }

    if let Some(done) = current.take() {
        sections.push(done);
    }

    sections
}
