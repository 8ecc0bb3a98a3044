//! Configuration axes.
//!
//! An axis is an independent dimension along which an attribute may vary.
//! Axes are never combined here; each is resolved on its own and the
//! emitter decides how conditions compose.

use std::fmt;

use crate::error::AttrError;

/// Reserved config key selecting the fallback branch of an axis.
pub const CONDITIONS_DEFAULT: &str = "conditions_default";

/// Select key rendered for [`CONDITIONS_DEFAULT`].
pub const CONDITIONS_DEFAULT_SELECT_KEY: &str = "//conditions:default";

const ARCH_SELECT_PREFIX: &str = "//build/bazel/platforms/arch:";
const OS_SELECT_PREFIX: &str = "//build/bazel/platforms/os:";
const PRODUCT_VARIABLE_SELECT_PREFIX: &str = "//build/bazel/product_variables:";

/// Architectures accepted on the [`ConfigurationAxis::Arch`] axis.
pub const KNOWN_ARCHES: &[&str] = &["arm", "arm64", "common", "x86", "x86_64"];

/// Operating systems accepted on the [`ConfigurationAxis::Os`] axis.
pub const KNOWN_OSES: &[&str] = &[
    "android",
    "darwin",
    "fuchsia",
    "linux_bionic",
    "linux_glibc",
    "windows",
];

/// A dimension of build-time variability.
///
/// Ordering is total: `NoConfig < Arch < Os < ProductVariable(_)`, with
/// product variables ordered by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigurationAxis {
    /// No axis; values set here become the attribute default.
    NoConfig,
    /// Target architecture.
    Arch,
    /// Target operating system.
    Os,
    /// A named product-configuration switch.
    ProductVariable(String),
}

impl ConfigurationAxis {
    /// Axis for a product variable.
    pub fn product_variable(name: impl Into<String>) -> Self {
        Self::ProductVariable(name.into())
    }

    /// Render the Bazel condition label for `config` on this axis.
    pub fn select_key(&self, config: &str) -> String {
        if config == CONDITIONS_DEFAULT {
            return CONDITIONS_DEFAULT_SELECT_KEY.to_string();
        }
        match self {
            Self::NoConfig => CONDITIONS_DEFAULT_SELECT_KEY.to_string(),
            Self::Arch => format!("{}{}", ARCH_SELECT_PREFIX, config),
            Self::Os => format!("{}{}", OS_SELECT_PREFIX, config),
            Self::ProductVariable(_) => {
                format!("{}{}", PRODUCT_VARIABLE_SELECT_PREFIX, config.to_lowercase())
            }
        }
    }

    /// Check that `config` is a meaningful key for this axis.
    pub fn validate_config(&self, config: &str) -> Result<(), AttrError> {
        let known = match self {
            Self::NoConfig | Self::ProductVariable(_) => return Ok(()),
            Self::Arch => KNOWN_ARCHES,
            Self::Os => KNOWN_OSES,
        };
        if config == CONDITIONS_DEFAULT || known.contains(&config) {
            Ok(())
        } else {
            Err(AttrError::UnknownConfig {
                axis: self.to_string(),
                config: config.to_string(),
            })
        }
    }
}

impl fmt::Display for ConfigurationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfig => write!(f, "no_config"),
            Self::Arch => write!(f, "arch"),
            Self::Os => write!(f, "os"),
            Self::ProductVariable(name) => write!(f, "product_variable:{}", name),
        }
    }
}
