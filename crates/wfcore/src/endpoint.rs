use serde::{Deserialize, Serialize};
use std::fmt;

/// Loop level an endpoint's data flow belongs to.
///
/// Every connection carries one character for its output side and one for its
/// input side; the two may differ, e.g. when a nested driver forwards its
/// results to the enclosing loop.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointCharacter {
    #[default]
    SameLoop,
    OuterLoop,
}

impl EndpointCharacter {
    pub fn opposite(self) -> Self {
        match self {
            EndpointCharacter::SameLoop => EndpointCharacter::OuterLoop,
            EndpointCharacter::OuterLoop => EndpointCharacter::SameLoop,
        }
    }
}

impl fmt::Display for EndpointCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointCharacter::SameLoop => write!(f, "SAME_LOOP"),
            EndpointCharacter::OuterLoop => write!(f, "OUTER_LOOP"),
        }
    }
}
