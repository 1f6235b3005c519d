//! Domain primitives shared by the service and HTTP layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a show. Assigned by the upstream listings source and reused
/// as the primary key, never generated locally.
///
/// # Examples
///
/// ```rust
/// use showsync::domain::ShowId;
///
/// let id = ShowId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ShowId(i32);

impl ShowId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Ids handed out by the listings source are always positive.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ShowId> for i32 {
    fn from(id: ShowId) -> Self {
        id.0
    }
}

impl From<i32> for ShowId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for ShowId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for ShowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}
