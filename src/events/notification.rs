//! Observer fan-out for entity notifications.
//!
//! Components that need to react to changes on their owning entity register
//! an [`ObserverEntry`] against it in the scene's [`NotificationHub`]. The
//! hierarchy calls [`Scene::notify`](crate::scene::Scene::notify) after an
//! entity's world transform changes, which invokes every registered entry in
//! registration order.
//!
//! Observers are identified by the component type that registered them; an
//! entity holds at most one component per type, so `(subject, type)` names an
//! observer uniquely. Entries are removed by the component's removal hook and
//! the subject's whole list is dropped when the entity is despawned, so no
//! observer outlives its entity.
//!
//! Handlers may mutate transforms (which notifies further subjects) but must
//! not register or unregister observers on the subject currently being
//! dispatched. Dispatch iterates a snapshot, so such edits only take effect
//! on the next notification.

use std::any::TypeId;

use bevy_ecs::prelude::Entity;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::scene::Scene;

/// Kinds of notifications delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The subject's world transform changed, usually because an ancestor moved.
    ParentTransformChanged,
}

/// Callback invoked with the scene, the subject entity and the notification.
pub type NotifyFn = fn(&mut Scene, Entity, Notification);

/// A registered observer.
#[derive(Clone, Copy)]
pub struct ObserverEntry {
    pub observer: TypeId,
    pub on_notify: NotifyFn,
}

impl ObserverEntry {
    pub fn new(observer: TypeId, on_notify: NotifyFn) -> Self {
        Self {
            observer,
            on_notify,
        }
    }
}

impl std::fmt::Debug for ObserverEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverEntry")
            .field("observer", &self.observer)
            .finish()
    }
}

pub type ObserverList = SmallVec<[ObserverEntry; 4]>;

/// Subject entity -> observers, in registration order.
#[derive(Debug, Default)]
pub struct NotificationHub {
    observers: FxHashMap<Entity, ObserverList>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` on `subject`. Registering the same observer twice
    /// replaces the callback and keeps the original position.
    pub fn add_observer(&mut self, subject: Entity, entry: ObserverEntry) {
        let list = self.observers.entry(subject).or_default();
        match list.iter_mut().find(|e| e.observer == entry.observer) {
            Some(existing) => existing.on_notify = entry.on_notify,
            None => list.push(entry),
        }
    }

    /// Unregister an observer. Returns whether it was registered.
    pub fn remove_observer(&mut self, subject: Entity, observer: TypeId) -> bool {
        let Some(list) = self.observers.get_mut(&subject) else {
            return false;
        };
        let before = list.len();
        list.retain(|e| e.observer != observer);
        let removed = list.len() != before;
        if list.is_empty() {
            self.observers.remove(&subject);
        }
        removed
    }

    /// Snapshot of the observers registered on `subject`.
    pub fn observers(&self, subject: Entity) -> ObserverList {
        self.observers.get(&subject).cloned().unwrap_or_default()
    }

    pub fn has_observers(&self, subject: Entity) -> bool {
        self.observers.contains_key(&subject)
    }

    /// Drop every observer registered on `subject`.
    pub fn remove_entity(&mut self, subject: Entity) {
        self.observers.remove(&subject);
    }

    /// Number of subjects with at least one observer.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }
}
