//! Process-unique entity identity.
//!
//! Every scene entity carries a [`Guid`] from creation until destruction. It
//! survives re-parenting, transform edits and scene duplication, which makes
//! it the only identifier handed to physics and scripting collaborators.

use std::fmt;

use bevy_ecs::prelude::Component;
use uuid::Uuid;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(Uuid);

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl Guid {
    /// The nil GUID. Never assigned to a live entity.
    pub const NULL: Guid = Guid(Uuid::nil());

    /// Generate a fresh random GUID.
    pub fn new() -> Self {
        Guid(Uuid::new_v4())
    }

    /// Rebuild a GUID from its 128-bit value (persistence path).
    pub fn from_u128(value: u128) -> Self {
        Guid(Uuid::from_u128(value))
    }

    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_guids_are_unique_and_not_null() {
        let a = Guid::new();
        let b = Guid::new();
        assert_ne!(a, b);
        assert!(!a.is_null());
        assert!(Guid::NULL.is_null());
    }

    #[test]
    fn u128_roundtrip_preserves_identity() {
        let a = Guid::new();
        assert_eq!(Guid::from_u128(a.as_u128()), a);
    }
}
