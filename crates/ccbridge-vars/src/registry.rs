//! Toolchain variable registry.
//!
//! Variables are registered on a [`RegistryBuilder`] and frozen into a
//! [`Registry`] before any expansion. A frozen registry cannot be modified,
//! so all registrations are visible to every expansion pass.

use std::collections::BTreeMap;

use crate::error::VarsError;

/// A dictionary of string lists, exported without expansion.
pub type StringListDict = BTreeMap<String, Vec<String>>;

/// Collects variable registrations.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    strings: BTreeMap<String, String>,
    string_lists: BTreeMap<String, Vec<String>>,
    string_list_dicts: BTreeMap<String, StringListDict>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a string variable. Registering a name again replaces it.
    pub fn export_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.strings.insert(name.clone(), value.into()).is_some() {
            tracing::debug!(variable = %name, "string variable re-registered");
        }
        self
    }

    /// Register a string list variable. Registering a name again replaces it.
    pub fn export_string_list<I, S>(&mut self, name: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let values = values.into_iter().map(Into::into).collect();
        if self.string_lists.insert(name.clone(), values).is_some() {
            tracing::debug!(variable = %name, "string list variable re-registered");
        }
        self
    }

    /// Register a dictionary of string lists. Registering a name again
    /// replaces it.
    pub fn export_string_list_dict(
        &mut self,
        name: impl Into<String>,
        dict: StringListDict,
    ) -> &mut Self {
        let name = name.into();
        if self.string_list_dicts.insert(name.clone(), dict).is_some() {
            tracing::debug!(variable = %name, "string list dict variable re-registered");
        }
        self
    }

    /// Close registration.
    pub fn freeze(self) -> Result<Registry, VarsError> {
        let names = self
            .strings
            .keys()
            .chain(self.string_lists.keys())
            .chain(self.string_list_dicts.keys());
        for name in names {
            if !is_valid_name(name) {
                return Err(VarsError::InvalidVariableName(name.clone()));
            }
        }
        tracing::debug!(
            strings = self.strings.len(),
            string_lists = self.string_lists.len(),
            string_list_dicts = self.string_list_dicts.len(),
            "variable registry frozen"
        );
        Ok(Registry {
            strings: self.strings,
            string_lists: self.string_lists,
            string_list_dicts: self.string_list_dicts,
        })
    }
}

/// Frozen variable tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    strings: BTreeMap<String, String>,
    string_lists: BTreeMap<String, Vec<String>>,
    string_list_dicts: BTreeMap<String, StringListDict>,
}

impl Registry {
    pub fn string(&self, name: &str) -> Option<&str> {
        self.strings.get(name).map(String::as_str)
    }

    pub fn string_list(&self, name: &str) -> Option<&[String]> {
        self.string_lists.get(name).map(Vec::as_slice)
    }

    pub fn string_list_dict(&self, name: &str) -> Option<&StringListDict> {
        self.string_list_dicts.get(name)
    }

    /// String variables in name order.
    pub fn strings(&self) -> &BTreeMap<String, String> {
        &self.strings
    }

    /// String list variables in name order.
    pub fn string_lists(&self) -> &BTreeMap<String, Vec<String>> {
        &self.string_lists
    }

    /// Dictionary variables in name order.
    pub fn string_list_dicts(&self) -> &BTreeMap<String, StringListDict> {
        &self.string_list_dicts
    }

    /// Total number of registered variables.
    pub fn len(&self) -> usize {
        self.strings.len() + self.string_lists.len() + self.string_list_dicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_registration_wins() {
        let mut builder = RegistryBuilder::new();
        builder
            .export_string("Arch", "arm")
            .export_string("Arch", "arm64")
            .export_string_list("Cflags", ["-O2"])
            .export_string_list("Cflags", ["-O3", "-g"]);
        let registry = builder.freeze().unwrap();

        assert_eq!(registry.string("Arch"), Some("arm64"));
        assert_eq!(
            registry.string_list("Cflags"),
            Some(&["-O3".to_string(), "-g".to_string()][..])
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let mut builder = RegistryBuilder::new();
        builder
            .export_string("Flags", "-a")
            .export_string_list("Flags", ["-b"]);
        let registry = builder.freeze().unwrap();

        assert_eq!(registry.string("Flags"), Some("-a"));
        assert_eq!(registry.string_list("Flags"), Some(&["-b".to_string()][..]));
    }

    #[test]
    fn test_freeze_rejects_invalid_names() {
        let mut builder = RegistryBuilder::new();
        builder.export_string("Bad-Name", "x");
        assert_eq!(
            builder.freeze().unwrap_err(),
            VarsError::InvalidVariableName("Bad-Name".to_string())
        );

        let mut builder = RegistryBuilder::new();
        builder.export_string_list_dict("", StringListDict::new());
        assert!(builder.freeze().is_err());
    }

    #[test]
    fn test_empty_registry() {
        let registry = RegistryBuilder::new().freeze().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.string("Missing"), None);
    }
}
