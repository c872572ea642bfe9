//! Resource identifiers.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable handle for a resource in an asset store.
///
/// Integer ids mirror generated resource tables; names are used by
/// file-backed stores. `"42"` parses as `Int(42)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(u32),
    Name(String),
}

impl ResourceId {
    /// Numeric strings become `Int`, anything else a `Name`.
    pub fn parse(s: &str) -> Self {
        match s.parse::<u32>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Name(s.to_owned()),
        }
    }

    /// File stem used by file-backed stores.
    pub fn file_stem(&self) -> Cow<'_, str> {
        match self {
            Self::Int(n) => Cow::Owned(n.to_string()),
            Self::Name(name) => Cow::Borrowed(name),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "#{n}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for ResourceId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl FromStr for ResourceId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
