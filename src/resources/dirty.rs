//! Per-category render dirty state.
//!
//! A category flag means the renderer-facing list for that category is stale
//! and must be rebuilt from the component table. The transform-only sets hold
//! members whose membership did not change but whose transform did; those are
//! sent to the renderer as incremental batches. A full rebuild of a category
//! discards its transform-only set.

use bevy_ecs::prelude::*;
use bitflags::bitflags;
use rustc_hash::FxHashSet;

bitflags! {
    /// Renderable categories that can be flagged for a full rebuild.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u16 {
        const MESHES = 1 << 0;
        const SPRITES = 1 << 1;
        const POINT_LIGHTS = 1 << 2;
        const SPOT_LIGHTS = 1 << 3;
        const TEXTS = 1 << 4;
        const TEXTS_2D = 1 << 5;
        const IMAGES_2D = 1 << 6;
    }
}

/// Categories that support transform-only updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformCategory {
    Meshes,
    Sprites,
    Texts,
}

impl TransformCategory {
    pub const ALL: [TransformCategory; 3] = [Self::Meshes, Self::Sprites, Self::Texts];

    /// Full-rebuild flag of the same category.
    pub fn flag(self) -> DirtyFlags {
        match self {
            Self::Meshes => DirtyFlags::MESHES,
            Self::Sprites => DirtyFlags::SPRITES,
            Self::Texts => DirtyFlags::TEXTS,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Meshes => 0,
            Self::Sprites => 1,
            Self::Texts => 2,
        }
    }
}

/// What a spatial component's transform change means for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformDirty {
    /// Gathered every frame, nothing to record.
    None,
    /// The whole category must be rebuilt.
    Full(DirtyFlags),
    /// Only this member's transform must be re-sent.
    TransformOnly(TransformCategory),
}

impl TransformDirty {
    pub fn apply(self, dirty: &mut RenderDirty, entity: Entity) {
        match self {
            TransformDirty::None => {}
            TransformDirty::Full(flags) => dirty.mark(flags),
            TransformDirty::TransformOnly(category) => dirty.mark_transform(category, entity),
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct RenderDirty {
    flags: DirtyFlags,
    transforms: [FxHashSet<Entity>; 3],
}

impl Default for RenderDirty {
    /// Everything starts dirty so the first snapshot feeds the renderer.
    fn default() -> Self {
        Self {
            flags: DirtyFlags::all(),
            transforms: Default::default(),
        }
    }
}

impl RenderDirty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    pub fn is_dirty(&self, flags: DirtyFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn mark(&mut self, flags: DirtyFlags) {
        self.flags |= flags;
    }

    /// Flag every category, used when a scene becomes current.
    pub fn mark_all(&mut self) {
        self.flags = DirtyFlags::all();
    }

    pub fn mark_transform(&mut self, category: TransformCategory, entity: Entity) {
        self.transforms[category.index()].insert(entity);
    }

    pub fn transform_dirty(&self, category: TransformCategory) -> &FxHashSet<Entity> {
        &self.transforms[category.index()]
    }

    /// True when nothing needs to be sent to the renderer.
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty() && self.transforms.iter().all(|s| s.is_empty())
    }

    pub fn clear(&mut self) {
        self.flags = DirtyFlags::empty();
        for set in &mut self.transforms {
            set.clear();
        }
    }
}
