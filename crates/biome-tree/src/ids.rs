//! External identifiers
//!
//! Entities are registered under the identifiers their sources use (module
//! names, symbol USRs, article paths). The intrinsic buffers keep a reverse
//! index from these to atoms.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from text
            #[inline]
            #[must_use]
            pub fn new(text: impl Into<String>) -> Self {
                Self(text.into())
            }

            /// The identifier text
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(text: &str) -> Self {
                Self::new(text)
            }
        }

        impl From<String> for $name {
            fn from(text: String) -> Self {
                Self(text)
            }
        }
    };
}

string_id!(
    /// Package name, unique within an ecosystem
    PackageId
);
string_id!(
    /// Module name, unique within a package
    ModuleId
);
string_id!(
    /// Symbol identifier (a USR), unique within a package
    SymbolId
);
string_id!(
    /// Article path, unique within a package
    ArticleId
);
