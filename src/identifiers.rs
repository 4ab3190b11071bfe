//! Domain identifier types for units taking part in a skirmish.
//!
//! The simulator hands out integer handles; wrapping them keeps friendly and
//! enemy ids from being confused with turn numbers or counts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle for a unit, unique within a side for one episode.
///
/// # Examples
///
/// ```
/// use footman_rl::identifiers::UnitId;
///
/// let id = UnitId::new(7);
/// assert_eq!(id.get(), 7);
/// assert_eq!(id.to_string(), "#7");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(u32);

impl UnitId {
    /// Create a new unit identifier.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw handle.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for UnitId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<UnitId> for u32 {
    fn from(id: UnitId) -> Self {
        id.0
    }
}

/// Which player controls a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Units commanded by this controller
    Friendly,
    /// Units commanded by the opposing player
    Enemy,
}

impl Side {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Friendly => Side::Enemy,
            Side::Enemy => Side::Friendly,
        }
    }

    /// Short label used in logs and reports.
    pub fn label(self) -> &'static str {
        match self {
            Side::Friendly => "friendly",
            Side::Enemy => "enemy",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
