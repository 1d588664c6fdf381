use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a building in the external geometry tables.
///
/// Points and triangles refer to their building through this key rather than
/// holding references into the geometry collaborator.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct BuildingId(String);

impl From<&str> for BuildingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BuildingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl BuildingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a transmitter, as numbered in the site data sheet.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransmitterId(pub u32);

impl fmt::Display for TransmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
