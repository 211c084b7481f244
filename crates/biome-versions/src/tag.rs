//! Branch and release tags
//!
//! Provides [`Tag`], the identifier used for branch names and release tags,
//! and [`SemanticVersion`], which a tag may spell.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Longest tag accepted
pub const MAX_TAG_LENGTH: usize = 255;

/// Branch or release identifier
///
/// Tags are non-empty, at most [`MAX_TAG_LENGTH`] bytes, and contain no
/// whitespace, control characters or `@`/`:` (which delimit selectors).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// The tag text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The semantic version this tag spells, if any
    ///
    /// Accepts `1.2.3`, `v1.2.3`, `1.2` and `1`; missing components are zero.
    #[must_use]
    pub fn semantic_version(&self) -> Option<SemanticVersion> {
        let text = self.0.strip_prefix('v').unwrap_or(&self.0);
        let mut components = [0u16; 3];
        let mut count = 0;
        for part in text.split('.') {
            if count == 3 {
                return None;
            }
            components[count] = parse_component(part)?;
            count += 1;
        }
        Some(SemanticVersion::new(components[0], components[1], components[2]))
    }

    fn validate(text: &str) -> Result<(), TagError> {
        if text.is_empty() {
            return Err(TagError::Empty);
        }
        if text.len() > MAX_TAG_LENGTH {
            return Err(TagError::TooLong(text.len()));
        }
        if let Some(c) = text
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || *c == '@' || *c == ':')
        {
            return Err(TagError::InvalidCharacter(c));
        }
        Ok(())
    }
}

fn parse_component(part: &str) -> Option<u16> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Tag {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for Tag {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        Ok(Self(value))
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `major.minor.patch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    /// Major component
    pub major: u16,
    /// Minor component
    pub minor: u16,
    /// Patch component
    pub patch: u16,
}

impl SemanticVersion {
    /// Create a semantic version
    #[inline]
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for SemanticVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Errors from tag validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// Empty tag
    #[error("tag cannot be empty")]
    Empty,

    /// Tag longer than the maximum
    #[error("tag is {0} bytes long (maximum 255)")]
    TooLong(usize),

    /// Disallowed character
    #[error("tag contains invalid character {0:?}")]
    InvalidCharacter(char),
}
