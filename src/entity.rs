// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entity identifiers, registration keys, and the id allocator.

use crate::archetype::{Archetype, Tag};
use crate::error::{EcsError, Result};

/// Opaque 32-bit entity identifier.
///
/// At most one live id holds any given value; values are recycled after
/// [`World::delete`](crate::World::delete). `u32::MAX` is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(u32);

impl EntityId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        EntityId(raw)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Registration tag distinguishing multiple registrations of one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Role(pub u32);

impl Role {
    pub const NONE: Role = Role(0);
}

/// Row locator for one registration of an entity.
///
/// `index` is the row inside the bucket for `archetype`; `(component,
/// role)` disambiguate when the same id is registered more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pointer {
    pub index: u32,
    pub archetype: Archetype,
    pub component: Option<Tag>,
    pub role: Role,
}

impl Pointer {
    /// Sentinel row index for a registration not yet placed in any bucket.
    pub const UNPLACED: u32 = u32::MAX;

    pub fn is_placed(&self) -> bool {
        self.index != Self::UNPLACED
    }
}

/// Lookup triple naming one registration of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Key {
    pub id: EntityId,
    pub component: Option<Tag>,
    pub role: Role,
}

impl Key {
    pub fn new(id: EntityId, component: Option<Tag>, role: Role) -> Self {
        Self {
            id,
            component,
            role,
        }
    }

    /// Position of the matching pointer in an entity's list.
    ///
    /// Matches on `(component, role)` only; the list is already keyed by id.
    pub(crate) fn position_in(&self, list: &[Pointer]) -> Option<usize> {
        list.iter()
            .position(|p| p.component == self.component && p.role == self.role)
    }
}

impl From<EntityId> for Key {
    fn from(id: EntityId) -> Self {
        Key::new(id, None, Role::NONE)
    }
}

/// Issues and recycles entity identifiers.
///
/// `allocate` is the single fallible point: it pre-reserves freelist
/// capacity for every id issued so far, so `release` never allocates and
/// stays callable from rollback paths.
pub struct EntityManager {
    next: u32,
    dead: Vec<EntityId>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self {
            next: 0,
            dead: Vec::new(),
        }
    }

    /// Pop a recycled id, or issue a fresh one.
    ///
    /// Fails with `OutOfMemory` when the freelist cannot grow or the
    /// 32-bit id space is exhausted (`u32::MAX` is reserved).
    pub fn allocate(&mut self) -> Result<EntityId> {
        if let Some(id) = self.dead.pop() {
            return Ok(id);
        }
        if self.next == u32::MAX {
            return Err(EcsError::OutOfMemory);
        }
        // Capacity for every issued id; release() must never allocate.
        let issued = self.next as usize + 1;
        if self.dead.capacity() < issued {
            self.dead.try_reserve(issued - self.dead.len())?;
        }
        let id = EntityId(self.next);
        self.next += 1;
        Ok(id)
    }

    /// Return an id to the freelist. Infallible; `allocate` reserved the slot.
    pub fn release(&mut self, id: EntityId) {
        debug_assert!(
            self.dead.len() < self.dead.capacity(),
            "release without a reserved freelist slot"
        );
        self.dead.push(id);
    }

    /// Number of ids issued so far (recycled or not).
    pub fn issued(&self) -> u32 {
        self.next
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let mut manager = EntityManager::new();
        assert_eq!(manager.allocate().unwrap().index(), 0);
        assert_eq!(manager.allocate().unwrap().index(), 1);
        assert_eq!(manager.allocate().unwrap().index(), 2);
        assert_eq!(manager.issued(), 3);
    }

    #[test]
    fn released_ids_are_recycled_before_fresh_ones() {
        let mut manager = EntityManager::new();
        let a = manager.allocate().unwrap();
        let b = manager.allocate().unwrap();

        manager.release(a);
        manager.release(b);

        assert_eq!(manager.allocate().unwrap(), b);
        assert_eq!(manager.allocate().unwrap(), a);
        assert_eq!(manager.allocate().unwrap().index(), 2);
    }

    #[test]
    fn exhausted_id_space_surfaces_out_of_memory() {
        // Simulate a manager that has issued every id below the sentinel.
        let mut manager = EntityManager {
            next: u32::MAX,
            dead: Vec::with_capacity(4),
        };
        assert_eq!(manager.allocate(), Err(EcsError::OutOfMemory));

        // A returned id makes allocation succeed again, yielding that id.
        manager.release(EntityId(7));
        assert_eq!(manager.allocate().unwrap(), EntityId(7));
        assert_eq!(manager.allocate(), Err(EcsError::OutOfMemory));
    }

    #[test]
    fn key_matches_on_component_and_role() {
        let id = EntityId(3);
        let list = [
            Pointer {
                index: 0,
                archetype: Archetype::EMPTY,
                component: None,
                role: Role::NONE,
            },
            Pointer {
                index: 4,
                archetype: Archetype::EMPTY,
                component: Some(Tag::new(2)),
                role: Role(9),
            },
        ];

        let key = Key::new(id, Some(Tag::new(2)), Role(9));
        assert_eq!(key.position_in(&list), Some(1));
        assert_eq!(Key::from(id).position_in(&list), Some(0));
        assert_eq!(Key::new(id, None, Role(1)).position_in(&list), None);
    }

    #[test]
    fn unplaced_sentinel() {
        let ptr = Pointer {
            index: Pointer::UNPLACED,
            archetype: Archetype::EMPTY,
            component: None,
            role: Role::NONE,
        };
        assert!(!ptr.is_placed());
    }
}
