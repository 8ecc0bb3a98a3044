//! Error types for attribute handling.

/// Precondition violations detected while shaping attribute values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttrError {
    /// A label contained more than one `:` separator.
    #[error("{0} is not a valid Bazel label for a file group")]
    InvalidGroupLabel(String),

    /// A config key is not known for its axis.
    #[error("unknown config '{config}' for axis {axis}")]
    UnknownConfig { axis: String, config: String },
}
