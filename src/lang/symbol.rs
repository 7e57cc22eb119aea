use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Name of the variadic argument binding.
pub const ELLIPSIS: &str = "...";

/// An interned-by-content name.
///
/// Symbols are shared between compiled units, which may be produced on
/// worker threads, so the text is held in an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn ellipsis() -> Self {
        Self::new(ELLIPSIS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_ellipsis(&self) -> bool {
        &*self.0 == ELLIPSIS
    }

    /// Returns true when the name can be printed without backquotes.
    pub fn is_syntactic(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '.' => {
                chars.all(|c| c.is_alphanumeric() || c == '.' || c == '_')
            }
            _ => false,
        }
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
