//! Recursive `${Name}` placeholder expansion.
//!
//! Input is split on whitespace. A token that is exactly one placeholder is
//! replaced by the expansion of the named variable (list namespace first,
//! then string namespace); any other token is kept verbatim. Unregistered
//! names expand to nothing.

use std::collections::BTreeSet;

use regex_lite::Regex;

use crate::error::VarsError;
use crate::registry::Registry;

/// Placeholder syntax, e.g. `${ExternalCflags}`.
const PLACEHOLDER_PATTERN: &str = r"\$\{([a-zA-Z0-9_]+)\}";

/// Expands placeholders against a frozen [`Registry`].
#[derive(Debug, Clone)]
pub struct Expander<'r> {
    registry: &'r Registry,
    placeholder: Regex,
}

impl<'r> Expander<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            placeholder: Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Expand `input` into a flat list of literal strings.
    pub fn expand(&self, input: &str) -> Result<Vec<String>, VarsError> {
        self.expand_with_seen(input, &BTreeSet::new())
    }

    /// Expand the string variable `name`, which must reduce to at most one
    /// value. Zero values yield the empty string.
    pub fn expand_string(&self, name: &str) -> Result<String, VarsError> {
        let value = self.registry.string(name).unwrap_or_default();
        let mut expanded = self.expand(value)?;
        match expanded.len() {
            0 => Ok(String::new()),
            1 => Ok(expanded.remove(0)),
            _ => Err(VarsError::MultipleValues {
                value: value.to_string(),
                expanded,
            }),
        }
    }

    /// Expand every element of the list variable `name` and concatenate.
    pub fn expand_string_list(&self, name: &str) -> Result<Vec<String>, VarsError> {
        let mut out = Vec::new();
        for item in self.registry.string_list(name).unwrap_or_default() {
            out.extend(self.expand(item)?);
        }
        Ok(out)
    }

    /// `seen` holds the variables visited on this path only; each child
    /// receives its own copy so sibling branches never see each other.
    fn expand_with_seen(
        &self,
        input: &str,
        seen: &BTreeSet<String>,
    ) -> Result<Vec<String>, VarsError> {
        let mut out = Vec::new();
        for token in input.split_whitespace() {
            let Some(variable) = self.placeholder_name(token)? else {
                out.push(token.to_string());
                continue;
            };
            if seen.contains(variable) {
                return Err(VarsError::UnboundedRecursion(variable.to_string()));
            }

            let mut child_seen = seen.clone();
            child_seen.insert(variable.to_string());

            if let Some(items) = self.registry.string_list(variable) {
                for item in items {
                    out.extend(self.expand_with_seen(item, &child_seen)?);
                }
            } else if let Some(value) = self.registry.string(variable) {
                out.extend(self.expand_with_seen(value, &child_seen)?);
            } else {
                tracing::debug!(%variable, "placeholder references unregistered variable");
            }
        }
        Ok(out)
    }

    /// The variable named by `token` if the whole token is one placeholder.
    fn placeholder_name<'t>(&self, token: &'t str) -> Result<Option<&'t str>, VarsError> {
        let matches: Vec<_> = self.placeholder.captures_iter(token).collect();
        match matches.as_slice() {
            [] => Ok(None),
            [caps] => {
                let whole = caps.get(0).map(|m| m.as_str());
                if whole != Some(token) {
                    return Ok(None);
                }
                Ok(caps.get(1).map(|m| m.as_str()))
            }
            _ => Err(VarsError::AmbiguousPlaceholder {
                token: token.to_string(),
                count: matches.len(),
            }),
        }
    }
}
