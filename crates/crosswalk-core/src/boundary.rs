//! Section boundary detection, one pattern per code family.
//!
//! A boundary line opens a new section: an optional "Section" label, a
//! numeric identifier with an optional uppercase suffix, a separator run,
//! then the first fragment of the title. The two codes' drafting conventions
//! differ slightly (only the old code prints a label token, only the new code
//! uses dash separators), so each family carries its own pattern behind the
//! same match capability.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::CodeFamily;

static OLD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Section\s*)?(\d+[A-Z]*)[.:\s]*(.*)$").unwrap());

static NEW_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+[A-Z]*)[.:\s-]*(.*)$").unwrap());

/// Number and title fragment captured from a boundary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBoundary<'a> {
    pub number: &'a str,
    pub title: &'a str,
}

/// Boundary pattern for one code family.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryPattern {
    re: &'static Regex,
}

impl BoundaryPattern {
    /// The pattern for `family`.
    pub fn for_family(family: CodeFamily) -> Self {
        let re = match family {
            CodeFamily::Old => &*OLD_BOUNDARY,
            CodeFamily::New => &*NEW_BOUNDARY,
        };
        Self { re }
    }

    /// Test whether `line` opens a new section.
    ///
    /// Returns the captured section number and trimmed title fragment, or
    /// `None` for a continuation line. The separator run may be empty, so a
    /// bare numeric line is a boundary with an empty title.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<LineBoundary<'a>> {
        let caps = self.re.captures(line)?;
        let number = caps.get(1).map_or("", |m| m.as_str());
        let title = caps.get(2).map_or("", |m| m.as_str()).trim();
        Some(LineBoundary { number, title })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old() -> BoundaryPattern {
        BoundaryPattern::for_family(CodeFamily::Old)
    }

    fn new() -> BoundaryPattern {
        BoundaryPattern::for_family(CodeFamily::New)
    }

    #[test]
    fn plain_numbered_heading() {
        let b = old().match_line("302. Murder").unwrap();
        assert_eq!(b.number, "302");
        assert_eq!(b.title, "Murder");
    }

    #[test]
    fn section_label_form() {
        let b = old().match_line("Section 302. Murder").unwrap();
        assert_eq!(b.number, "302");
        assert_eq!(b.title, "Murder");
    }

    #[test]
    fn alphabetic_suffix() {
        let b = old().match_line("304B. Dowry death").unwrap();
        assert_eq!(b.number, "304B");
        assert_eq!(b.title, "Dowry death");
    }

    #[test]
    fn colon_separator() {
        let b = old().match_line("420: Cheating").unwrap();
        assert_eq!(b.number, "420");
        assert_eq!(b.title, "Cheating");
    }

    #[test]
    fn bare_number_has_empty_title() {
        let b = new().match_line("101").unwrap();
        assert_eq!(b.number, "101");
        assert_eq!(b.title, "");
    }

    #[test]
    fn dash_separator_only_in_new_code() {
        let b = new().match_line("101 - Murder").unwrap();
        assert_eq!(b.number, "101");
        assert_eq!(b.title, "Murder");

        // The old pattern treats the dash as title text.
        let b = old().match_line("101 - Murder").unwrap();
        assert_eq!(b.number, "101");
        assert_eq!(b.title, "- Murder");
    }

    #[test]
    fn continuation_lines_do_not_match() {
        assert!(old().match_line("Whoever commits murder...").is_none());
        assert!(old().match_line("").is_none());
        assert!(new().match_line("shall be punished with fine.").is_none());
    }

    #[test]
    fn label_without_number_does_not_match() {
        assert!(old().match_line("Section").is_none());
        assert!(old().match_line("Sections vary in length").is_none());
    }

    #[test]
    fn lowercase_suffix_stays_in_title() {
        let b = old().match_line("302b note").unwrap();
        assert_eq!(b.number, "302");
        assert_eq!(b.title, "b note");
    }
}
