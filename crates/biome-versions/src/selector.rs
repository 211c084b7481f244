//! Version selectors
//!
//! A [`VersionSelector`] is what a reader asks for: a tag, a masked semantic
//! version (`1`, `1.2`, `1.2.3`) or a toolchain date (`2022-08-30-a`).
//! Resolution against a tree happens elsewhere; this module only parses.

use crate::tag::{SemanticVersion, Tag, TagError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A semantic version with trailing components left open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskedVersion {
    /// `major`
    Major(u16),
    /// `major.minor`
    Minor(u16, u16),
    /// `major.minor.patch`
    Patch(u16, u16, u16),
}

impl MaskedVersion {
    /// Whether a full version falls under this mask
    #[must_use]
    pub fn matches(&self, version: SemanticVersion) -> bool {
        match *self {
            Self::Major(major) => version.major == major,
            Self::Minor(major, minor) => version.major == major && version.minor == minor,
            Self::Patch(major, minor, patch) => {
                version == SemanticVersion::new(major, minor, patch)
            }
        }
    }

    fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('.');
        let major = number(parts.next()?)?;
        let Some(minor) = parts.next() else {
            return Some(Self::Major(major));
        };
        let minor = number(minor)?;
        let Some(patch) = parts.next() else {
            return Some(Self::Minor(major, minor));
        };
        let patch = number(patch)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::Patch(major, minor, patch))
    }
}

impl Display for MaskedVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major(major) => write!(f, "{major}"),
            Self::Minor(major, minor) => write!(f, "{major}.{minor}"),
            Self::Patch(major, minor, patch) => write!(f, "{major}.{minor}.{patch}"),
        }
    }
}

fn number<T: FromStr>(part: &str) -> Option<T> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Toolchain snapshot date, `YYYY-MM-DD` with an optional `-a`…`-z` suffix
/// counting snapshots taken on the same day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Date {
    /// Calendar year
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
    /// Day of the month
    pub day: u8,
    /// Snapshot letter index (`a` = 0, `z` = 25)
    pub snapshot: u8,
}

impl Date {
    /// Number of snapshot letters a day can carry
    pub const SNAPSHOTS: u8 = 26;

    /// Create a date
    ///
    /// # Panics
    /// If the day does not exist in the calendar, or `snapshot` is not below
    /// [`Date::SNAPSHOTS`].
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8, snapshot: u8) -> Self {
        match Self::checked(year, month, day, snapshot) {
            Some(date) => date,
            None => panic!(
                "{year:04}-{month:02}-{day:02} snapshot {snapshot} is not a toolchain date"
            ),
        }
    }

    /// Create a date if it names a real calendar day and a snapshot letter
    #[must_use]
    pub fn checked(year: u16, month: u8, day: u8, snapshot: u8) -> Option<Self> {
        if snapshot >= Self::SNAPSHOTS {
            return None;
        }
        NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day)).map(|_| Self {
            year,
            month,
            day,
            snapshot,
        })
    }

    fn parse(text: &str) -> Result<Option<Self>, SelectorError> {
        let mut parts = text.split('-');
        let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next())
        else {
            return Ok(None);
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Ok(None);
        }
        let (Some(year), Some(month), Some(day)) =
            (number::<u16>(year), number::<u8>(month), number::<u8>(day))
        else {
            return Ok(None);
        };
        let invalid = || SelectorError::InvalidDate(text.to_owned());
        let snapshot = match parts.next() {
            None => 0,
            Some(letter) => match letter.as_bytes() {
                [b] if b.is_ascii_lowercase() => b - b'a',
                _ => return Err(invalid()),
            },
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Self::checked(year, month, day, snapshot).map(Some).ok_or_else(invalid)
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        match (b'a'..=b'z').nth(usize::from(self.snapshot)) {
            Some(letter) => write!(f, "-{}", char::from(letter)),
            None => write!(f, "-#{}", self.snapshot),
        }
    }
}

/// Something a reader can ask to be resolved to a version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionSelector {
    /// A tag or branch name
    Tag(Tag),
    /// The highest tagged release under a mask
    Version(MaskedVersion),
    /// The revision committed with a toolchain date
    Date(Date),
}

impl Display for VersionSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "{tag}"),
            Self::Version(mask) => write!(f, "{mask}"),
            Self::Date(date) => write!(f, "{date}"),
        }
    }
}

impl FromStr for VersionSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mask) = MaskedVersion::parse(s) {
            return Ok(Self::Version(mask));
        }
        if let Some(date) = Date::parse(s)? {
            return Ok(Self::Date(date));
        }
        Ok(Self::Tag(s.parse()?))
    }
}

/// Errors from selector parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// Looked like a date but was not one
    #[error("invalid toolchain date: {0}")]
    InvalidDate(String),

    /// Not a valid tag either
    #[error("invalid tag: {0}")]
    Tag(#[from] TagError),
}
