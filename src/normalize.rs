//! Path canonicalization and tokenization.
//!
//! Every path is canonicalized before it touches the tree:
//! - leading separators are stripped
//! - internal runs of separators collapse to one
//! - a trailing separator is kept, so `a/` and `a` stay distinct
//!
//! Canonical paths are then split into chunks, the irreducible units the
//! inserter places into the tree.

use std::borrow::Cow;

use crate::error::InsertError;

pub(crate) const SEPARATOR: char = '/';
pub(crate) const PLACEHOLDER_MARKER: char = ':';
pub(crate) const WILDCARD: &str = "**";

/// Canonicalize a path.
///
/// Borrows the input when it is already canonical. Idempotent:
///
/// ```rust
/// use radix_route::normalize;
///
/// assert_eq!(normalize("//chrome//coooo/il"), "chrome/coooo/il");
/// assert_eq!(normalize("a/"), "a/");
/// let once = normalize("///x//y");
/// assert_eq!(normalize(&once), once);
/// ```
pub fn normalize(path: &str) -> Cow<'_, str> {
    let trimmed = path.trim_start_matches(SEPARATOR);
    if !trimmed.contains("//") {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut prev_separator = false;
    for c in trimmed.chars() {
        let is_separator = c == SEPARATOR;
        if is_separator && prev_separator {
            continue;
        }
        prev_separator = is_separator;
        out.push(c);
    }
    Cow::Owned(out)
}

/// One irreducible unit of a canonical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chunk<'a> {
    /// Plain text between separators; eligible for prefix compression.
    Literal(&'a str),
    /// A lone `/`.
    Separator,
    /// `:name`, holding the name without its marker.
    Placeholder(&'a str),
    /// `**`.
    Wildcard,
}

/// Split a canonical path into chunks, rejecting malformed special tokens.
///
/// A placeholder is a segment that starts with `:`; a `:` elsewhere in a
/// segment is plain text. A single `*` is plain text, but `**` must be a
/// whole segment and the last one.
pub(crate) fn tokenize(path: &str) -> Result<Vec<Chunk<'_>>, InsertError> {
    let mut chunks = Vec::new();

    for (i, segment) in path.split(SEPARATOR).enumerate() {
        if i > 0 {
            chunks.push(Chunk::Separator);
        }
        if segment.is_empty() {
            continue;
        }

        if let Some(name) = segment.strip_prefix(PLACEHOLDER_MARKER) {
            if name.is_empty() {
                return Err(InsertError::UnnamedPlaceholder {
                    chunk: segment.to_owned(),
                });
            }
            chunks.push(Chunk::Placeholder(name));
        } else if segment == WILDCARD {
            chunks.push(Chunk::Wildcard);
        } else if segment.contains(WILDCARD) {
            return Err(InsertError::WildcardSegment {
                chunk: segment.to_owned(),
            });
        } else {
            chunks.push(Chunk::Literal(segment));
        }
    }

    if let Some(pos) = chunks.iter().position(|c| *c == Chunk::Wildcard) {
        if pos + 1 != chunks.len() {
            return Err(InsertError::WildcardNotLast {
                path: path.to_owned(),
            });
        }
    }

    Ok(chunks)
}
