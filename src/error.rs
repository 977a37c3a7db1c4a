/// Error returned when a path cannot be registered.
///
/// Inserts are validated before the tree is touched, so a rejected insert
/// leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsertError {
    /// A segment consisting of a bare `:` with no name after it.
    #[error("placeholder `{chunk}` has no name")]
    UnnamedPlaceholder { chunk: String },

    /// A `**` that shares its segment with other characters.
    #[error("wildcard must occupy a whole segment, found `{chunk}`")]
    WildcardSegment { chunk: String },

    /// Something follows a `**` segment.
    #[error("wildcard `**` must be the last segment of `{path}`")]
    WildcardNotLast { path: String },

    /// A second placeholder name at a branch point that already binds one.
    #[error("placeholder `:{new}` conflicts with existing placeholder `:{existing}`")]
    PlaceholderConflict { existing: String, new: String },
}
