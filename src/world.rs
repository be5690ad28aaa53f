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

//! World: central entity and bucket storage
//!
//! The world keys buckets by archetype and entities by id. An entity's
//! registrations live in a pointer list; every structural change keeps
//! the two maps in agreement, including the pointer patch after a
//! swap-remove displaces another entity's row.

use ahash::AHashMap;
use smallvec::SmallVec;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::archetype::{Archetype, Tag};
use crate::bucket::Bucket;
use crate::component::{Bundle, Component};
use crate::entity::{EntityId, EntityManager, Key, Pointer, Role};
use crate::error::{EcsError, Result};
use crate::query::{Query, QueryMut};
use crate::schema::Schema;

/// Central ECS store: the id allocator, a pointer list per entity, and a
/// bucket per archetype.
///
/// Single-threaded; wrap it externally if it must be shared.
pub struct World {
    schema: Schema,
    manager: EntityManager,
    entities: AHashMap<EntityId, SmallVec<[Pointer; 2]>>,
    buckets: AHashMap<Archetype, Bucket>,
}

impl World {
    /// Create an empty world over a fixed schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            manager: EntityManager::new(),
            // Start with reasonable defaults to avoid resize spikes
            entities: AHashMap::with_capacity(64),
            buckets: AHashMap::with_capacity(16),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of live entity ids.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Live ids, in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// All buckets, including empty ones, in unspecified order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.values()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The registrations of `id`, in list order.
    pub fn pointers(&self, id: EntityId) -> Option<&[Pointer]> {
        self.entities.get(&id).map(|list| list.as_slice())
    }

    /// Shape of a bundle type under this world's schema.
    pub fn shape_of<B: Bundle>(&self) -> Result<Archetype> {
        B::shape(&self.schema)
    }

    /// Allocate a fresh id with no registrations.
    pub fn spawn(&mut self) -> Result<EntityId> {
        self.entities.try_reserve(1)?;
        let id = self.manager.allocate()?;
        self.entities.insert(id, SmallVec::new());
        Ok(id)
    }

    /// Allocate an id, register it under `(None, Role::NONE)` and place it
    /// with the bundle's components.
    pub fn insert<B: Bundle>(&mut self, values: B) -> Result<Key> {
        self.insert_keyed(None, Role::NONE, values)
    }

    /// Allocate an id and register it under `(component, role)`.
    ///
    /// On failure the id is released again; nothing is left behind.
    pub fn insert_keyed<B: Bundle>(
        &mut self,
        component: Option<Tag>,
        role: Role,
        values: B,
    ) -> Result<Key> {
        #[cfg(feature = "profiling")]
        let span = info_span!("world.insert", buckets = self.buckets.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        self.entities.try_reserve(1)?;
        let id = self.manager.allocate()?;

        let mut list = SmallVec::new();
        list.push(Pointer {
            index: Pointer::UNPLACED,
            archetype: Archetype::EMPTY,
            component,
            role,
        });
        self.entities.insert(id, list);

        let key = Key::new(id, component, role);
        match self.update(key, values) {
            Ok(()) => Ok(key),
            Err(err) => {
                // The registration was never placed; unwind the allocation.
                self.entities.remove(&id);
                self.manager.release(id);
                Err(err)
            }
        }
    }

    /// Register an existing id under an additional `(component, role)`.
    ///
    /// The pair must not be registered already (debug-asserted).
    pub fn extend<B: Bundle>(&mut self, key: Key, values: B) -> Result<()> {
        let list = self
            .entities
            .get_mut(&key.id)
            .ok_or(EcsError::EntityNotFound)?;
        debug_assert!(
            key.position_in(list).is_none(),
            "duplicate (component, role) registration for {:?}",
            key.id
        );
        list.try_reserve(1).map_err(|_| EcsError::OutOfMemory)?;
        list.push(Pointer {
            index: Pointer::UNPLACED,
            archetype: Archetype::EMPTY,
            component: key.component,
            role: key.role,
        });

        match self.update(key, values) {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Some(list) = self.entities.get_mut(&key.id) {
                    list.pop();
                }
                Err(err)
            }
        }
    }

    /// Write a bundle to the registration named by `key`, migrating it to
    /// a wider bucket when the bundle adds component kinds.
    ///
    /// Presents either the pre-state (on failure) or the post-state;
    /// every fallible allocation happens before any observable change.
    pub fn update<B: Bundle>(&mut self, key: Key, values: B) -> Result<()> {
        #[cfg(feature = "profiling")]
        let span = info_span!("world.update");
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let added = B::shape(&self.schema)?;
        let (position, current) = self.find_pointer(key)?;
        let target = current.archetype.merge(added);

        if target != current.archetype || !current.is_placed() {
            self.place(key.id, position, current, target, added, |schema, bucket| {
                values.push(schema, bucket)
            })
        } else {
            let bucket = self
                .buckets
                .get_mut(&current.archetype)
                .expect("placed pointer refers to a missing bucket");
            values.write(&self.schema, bucket, current.index as usize);
            Ok(())
        }
    }

    /// Drop the kinds in `dropped` from the registration named by `key`,
    /// migrating it to a narrower bucket. Kinds it never had are ignored.
    pub fn remove(&mut self, key: Key, dropped: Archetype) -> Result<()> {
        let (position, current) = self.find_pointer(key)?;
        let target = current.archetype.difference(dropped);
        if target == current.archetype {
            return Ok(());
        }
        self.place(key.id, position, current, target, Archetype::EMPTY, |_, _| {})
    }

    /// Remove the single registration named by `key`, dropping its row.
    pub fn delete_key(&mut self, key: Key) -> Result<()> {
        let list = self
            .entities
            .get_mut(&key.id)
            .ok_or(EcsError::EntityNotFound)?;
        let position = key.position_in(list).ok_or(EcsError::KeyNotFound)?;
        let pointer = list.swap_remove(position);
        self.unplace(pointer);
        Ok(())
    }

    /// Remove every registration of `id`, drop its rows, and recycle the id.
    pub fn delete(&mut self, id: EntityId) -> Result<()> {
        #[cfg(feature = "profiling")]
        let span = info_span!("world.delete");
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        if !self.entities.contains_key(&id) {
            return Err(EcsError::EntityNotFound);
        }

        // Pop registrations one at a time while the list stays in the map:
        // a swap-remove may displace another registration of this same id,
        // and the patch must be able to find it.
        loop {
            let popped = self.entities.get_mut(&id).and_then(|list| list.pop());
            match popped {
                Some(pointer) => self.unplace(pointer),
                None => break,
            }
        }

        self.entities.remove(&id);
        self.manager.release(id);
        Ok(())
    }

    /// Read one component of the registration named by `key`.
    ///
    /// Absent when the key is stale, the kind is void, or the registration
    /// does not carry it.
    pub fn get<T: Component>(&self, key: Key) -> Option<&T> {
        let list = self.entities.get(&key.id)?;
        let pointer = list[key.position_in(list)?];
        if !pointer.is_placed() {
            return None;
        }
        let tag = self.schema.lookup::<T>()?;
        let bucket = self.buckets.get(&pointer.archetype)?;
        bucket.slice::<T>(tag)?.get(pointer.index as usize)
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut<T: Component>(&mut self, key: Key) -> Option<&mut T> {
        let list = self.entities.get(&key.id)?;
        let pointer = list[key.position_in(list)?];
        if !pointer.is_placed() {
            return None;
        }
        let tag = self.schema.lookup::<T>()?;
        let bucket = self.buckets.get_mut(&pointer.archetype)?;
        bucket.slice_mut::<T>(tag)?.get_mut(pointer.index as usize)
    }

    /// Archetype of the registration named by `key`.
    pub fn archetype_of(&self, key: Key) -> Option<Archetype> {
        let list = self.entities.get(&key.id)?;
        Some(list[key.position_in(list)?].archetype)
    }

    /// Whether the registration named by `key` carries `tag`.
    pub fn has(&self, key: Key, tag: Tag) -> bool {
        self.archetype_of(key).is_some_and(|arch| arch.has(tag))
    }

    /// Iterate buckets whose archetype contains `shape`, skipping empty ones.
    pub fn query(&self, shape: Archetype) -> Query<'_> {
        Query::new(self.buckets.values(), shape, &self.schema)
    }

    /// Mutable counterpart of [`query`](Self::query).
    pub fn query_mut(&mut self, shape: Archetype) -> QueryMut<'_> {
        QueryMut::new(self.buckets.values_mut(), shape, &self.schema)
    }

    fn find_pointer(&self, key: Key) -> Result<(usize, Pointer)> {
        let list = self.entities.get(&key.id).ok_or(EcsError::EntityNotFound)?;
        let position = key.position_in(list).ok_or(EcsError::KeyNotFound)?;
        Ok((position, list[position]))
    }

    /// Move one registration into the bucket for `target` and write the
    /// bundle's values there.
    ///
    /// `provided` is the bundle's shape; kinds common to source and target
    /// but not provided are transferred, provided ones take the new value
    /// and the stale source value drops with the source row.
    fn place<F>(
        &mut self,
        id: EntityId,
        position: usize,
        current: Pointer,
        target: Archetype,
        provided: Archetype,
        write: F,
    ) -> Result<()>
    where
        F: FnOnce(&Schema, &mut Bucket),
    {
        debug_assert!(
            !current.is_placed() || target != current.archetype,
            "placement must change the bucket of a placed registration"
        );

        // Target bucket, created on first use.
        let created = !self.buckets.contains_key(&target);
        if created {
            self.buckets.try_reserve(1)?;
            let bucket = Bucket::new(target, &self.schema);
            self.buckets.insert(target, bucket);
        }

        // The one fallible step. A bucket created just now must not
        // outlive a failed reservation: nothing would ever point at it.
        {
            let bucket = self
                .buckets
                .get_mut(&target)
                .expect("target bucket vanished");
            if let Err(err) = bucket.reserve_row() {
                if created {
                    self.buckets.remove(&target);
                }
                return Err(err);
            }
        }

        let new_row;
        if current.is_placed() {
            // Hold source and target at once by taking the source out.
            let mut source = self
                .buckets
                .remove(&current.archetype)
                .expect("placed pointer refers to a missing bucket");
            let bucket = self
                .buckets
                .get_mut(&target)
                .expect("target bucket vanished");
            new_row = bucket.push_id(id);

            // Values the bundle does not overwrite move across.
            let carried = current
                .archetype
                .intersection(target)
                .difference(provided)
                .difference(self.schema.void_mask());
            for tag in carried.tags() {
                let from = source
                    .column_position(tag)
                    .expect("carried tag missing from source");
                let to = bucket
                    .column_position(tag)
                    .expect("carried tag missing from target");
                source
                    .column_mut(from)
                    .transfer(current.index as usize, bucket.column_mut(to));
            }

            let displaced = source.swap_remove_row(current.index as usize, carried);
            let old_last = source.len() as u32;
            self.buckets.insert(current.archetype, source);

            if let Some(moved) = displaced {
                self.patch_displaced(moved, current.archetype, old_last, current.index);
            }
        } else {
            let bucket = self
                .buckets
                .get_mut(&target)
                .expect("target bucket vanished");
            new_row = bucket.push_id(id);
        }

        let bucket = self
            .buckets
            .get_mut(&target)
            .expect("target bucket vanished");
        write(&self.schema, bucket);

        let pointer = &mut self
            .entities
            .get_mut(&id)
            .expect("entity vanished during placement")[position];
        pointer.archetype = target;
        pointer.index = new_row as u32;
        Ok(())
    }

    /// Remove a registration's row and patch whoever got swapped into it.
    fn unplace(&mut self, pointer: Pointer) {
        if !pointer.is_placed() {
            return;
        }
        let bucket = self
            .buckets
            .get_mut(&pointer.archetype)
            .expect("placed pointer refers to a missing bucket");
        let displaced = bucket.swap_remove_row(pointer.index as usize, Archetype::EMPTY);
        let old_last = bucket.len() as u32;
        if let Some(moved) = displaced {
            self.patch_displaced(moved, pointer.archetype, old_last, pointer.index);
        }
    }

    /// After a swap-remove moved the last row of `archetype` into
    /// `new_index`, redirect the one pointer that still names the old
    /// last row. `(archetype, old_index)` identifies it uniquely.
    fn patch_displaced(
        &mut self,
        id: EntityId,
        archetype: Archetype,
        old_index: u32,
        new_index: u32,
    ) {
        let Some(list) = self.entities.get_mut(&id) else {
            debug_assert!(false, "displaced id {id:?} is not live");
            return;
        };
        for pointer in list.iter_mut() {
            if pointer.archetype == archetype && pointer.index == old_index {
                pointer.index = new_index;
                return;
            }
        }
        debug_assert!(
            false,
            "displaced id {id:?} has no pointer at ({archetype:?}, {old_index})"
        );
    }

    /// Cross-check the entity map against the bucket map.
    ///
    /// Panics on the first inconsistency; meant for tests and debugging
    /// sweeps, not steady-state use.
    pub fn assert_consistent(&self) {
        for (id, list) in &self.entities {
            for pointer in list {
                if !pointer.is_placed() {
                    continue;
                }
                let bucket = self.buckets.get(&pointer.archetype).unwrap_or_else(|| {
                    panic!("{id:?} points at missing bucket {:?}", pointer.archetype)
                });
                assert_eq!(
                    bucket.entities().get(pointer.index as usize),
                    Some(id),
                    "{id:?} not at row {} of {:?}",
                    pointer.index,
                    pointer.archetype
                );
            }
        }

        for bucket in self.buckets.values() {
            bucket.assert_parity();
            for (row, id) in bucket.entities().iter().enumerate() {
                let list = self
                    .entities
                    .get(id)
                    .unwrap_or_else(|| panic!("bucket row holds dead id {id:?}"));
                let matching = list
                    .iter()
                    .filter(|p| p.archetype == bucket.archetype() && p.index == row as u32)
                    .count();
                assert_eq!(
                    matching, 1,
                    "{id:?} must have exactly one pointer at ({:?}, {row})",
                    bucket.archetype()
                );
            }
        }
    }
}
