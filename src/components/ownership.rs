//! Parent/children links between scene entities.
//!
//! The scene keeps these bidirectional: `a` is listed in `b.children` iff
//! `a.parent == Some(b)`. Only the hierarchy functions in
//! [`crate::systems::hierarchy`] mutate them.

use bevy_ecs::prelude::{Component, Entity};
use smallvec::SmallVec;

#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Ownership {
    pub(crate) parent: Option<Entity>,
    pub(crate) children: SmallVec<[Entity; 4]>,
}

impl Ownership {
    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    /// Children in attachment order.
    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn add_child(&mut self, child: Entity) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn remove_child(&mut self, child: Entity) -> bool {
        match self.children.iter().position(|c| *c == child) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }
}
