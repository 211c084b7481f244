//! Package configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Tuning and safety switches for one package
///
/// ```rust
/// use biome_tree::PackageConfig;
///
/// let config = PackageConfig::from_toml_str("max_branches = 8").unwrap();
/// assert_eq!(config.max_branches, 8);
/// assert_eq!(config.keyframe_capacity, PackageConfig::default().keyframe_capacity);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Keyframes to reserve per forest up front
    pub keyframe_capacity: usize,
    /// Run structural invariant checks after every commit and revert
    pub verify_invariants: bool,
    /// Maximum number of branches in the tree
    pub max_branches: usize,
}

impl PackageConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML, filling in defaults for missing keys
    ///
    /// # Errors
    /// If the text is not valid TOML or a value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// If `max_branches` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_branches == 0 {
            return Err(ConfigError::Invalid {
                field: "max_branches",
                reason: "a package needs at least one branch".to_owned(),
            });
        }
        Ok(())
    }

    /// With keyframe capacity
    #[inline]
    #[must_use]
    pub fn with_keyframe_capacity(mut self, capacity: usize) -> Self {
        self.keyframe_capacity = capacity;
        self
    }

    /// With invariant verification
    #[inline]
    #[must_use]
    pub fn with_verify_invariants(mut self, verify: bool) -> Self {
        self.verify_invariants = verify;
        self
    }

    /// With branch limit
    #[inline]
    #[must_use]
    pub fn with_max_branches(mut self, max: usize) -> Self {
        self.max_branches = max;
        self
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            keyframe_capacity: 64,
            verify_invariants: cfg!(debug_assertions),
            max_branches: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(PackageConfig::from_toml_str("").unwrap(), PackageConfig::default());
    }

    #[test]
    fn toml_overrides() {
        let config = PackageConfig::from_toml_str(
            "keyframe_capacity = 4\nverify_invariants = true\nmax_branches = 2\n",
        )
        .unwrap();
        assert_eq!(
            config,
            PackageConfig::new()
                .with_keyframe_capacity(4)
                .with_verify_invariants(true)
                .with_max_branches(2)
        );
    }

    #[test]
    fn zero_branches_rejected() {
        assert!(matches!(
            PackageConfig::from_toml_str("max_branches = 0"),
            Err(ConfigError::Invalid { field: "max_branches", .. })
        ));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(
            PackageConfig::from_toml_str("max_branches = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
