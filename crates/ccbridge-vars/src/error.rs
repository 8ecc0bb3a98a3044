//! Error types for variable registration, expansion and export.

/// Fatal conditions; any of these aborts the whole pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VarsError {
    /// A variable name cannot be referenced by a placeholder.
    #[error("invalid variable name '{0}': expected [a-zA-Z0-9_]+")]
    InvalidVariableName(String),

    /// A token holds more than one placeholder.
    #[error("expected to only match 1 placeholder in {token}, got {count}")]
    AmbiguousPlaceholder { token: String, count: usize },

    /// A variable references itself along one expansion path.
    #[error("unbounded recursive interpolation of variable: {0}")]
    UnboundedRecursion(String),

    /// A string variable expanded to more than one value.
    #[error("{value} expands to more than one string value: {expanded:?}")]
    MultipleValues { value: String, expanded: Vec<String> },

    /// A value contains a character that cannot be emitted unescaped.
    #[error("{value} contains illegal character {character:?}")]
    IllegalCharacter { value: String, character: char },

    /// Two tables export the same name.
    #[error("constant {0} is exported more than once")]
    DuplicateConstant(String),
}
