//! Whitespace normalisation for raw source text.

/// Trim leading and trailing whitespace from every line of `raw`.
///
/// Line structure is otherwise preserved; CRLF endings collapse to LF. This
/// is the only transformation applied between document retrieval and section
/// extraction, so the boundary patterns can anchor on column zero.
pub fn normalize(raw: &str) -> String {
    raw.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}
