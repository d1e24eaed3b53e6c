use bevy_ecs::prelude::Component;

/// Position of an entity in its scene's creation sequence.
///
/// Strictly increasing per scene and never reused, unlike ECS entity ids,
/// which are recycled after a despawn. Listings and "first" lookups sort by it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CreationIndex(pub u64);
