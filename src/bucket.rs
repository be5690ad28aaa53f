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

//! Bucket storage with row reservation and removal
//!
//! One bucket holds every entity of one archetype: an entity-id column
//! plus one data column per non-void tag, in ascending tag order. Rows
//! are removed by swap-remove, which keeps columns packed and reports
//! the id that was moved so its pointer can be patched.

use crate::archetype::{Archetype, Tag};
use crate::column::{self, Column};
use crate::entity::EntityId;
use crate::error::Result;
use crate::schema::Schema;

/// Columnar storage for all entities of one archetype.
pub struct Bucket {
    archetype: Archetype,
    /// Tags that own columns: `archetype` minus the schema's void mask.
    data: Archetype,
    entities: Vec<EntityId>,
    columns: Vec<Box<dyn Column>>,
}

impl Bucket {
    pub(crate) fn new(archetype: Archetype, schema: &Schema) -> Self {
        let data = archetype.difference(schema.void_mask());
        let columns = data.tags().map(|tag| schema.new_column(tag)).collect();
        Self {
            archetype,
            data,
            entities: Vec::new(),
            columns,
        }
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Tags with a backing column.
    pub fn data_mask(&self) -> Archetype {
        self.data
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column position for `tag`, absent for void or missing tags.
    pub(crate) fn column_position(&self, tag: Tag) -> Option<usize> {
        self.data.position_of(tag)
    }

    pub(crate) fn column(&self, position: usize) -> &dyn Column {
        &*self.columns[position]
    }

    pub(crate) fn column_mut(&mut self, position: usize) -> &mut dyn Column {
        &mut *self.columns[position]
    }

    /// Mutable access to several columns at once, for tuple fetches.
    /// Panics if any position repeats or is out of bounds.
    pub(crate) fn columns_disjoint_mut<const N: usize>(
        &mut self,
        positions: [usize; N],
    ) -> [&mut Box<dyn Column>; N] {
        self.columns
            .get_disjoint_mut(positions)
            .expect("fetch requires distinct in-bounds columns")
    }

    /// Make room for one more row in the id column and every data column.
    ///
    /// Capacity only; on failure nothing observable has changed, which is
    /// what lets callers reserve before mutating anything.
    pub(crate) fn reserve_row(&mut self) -> Result<()> {
        self.entities.try_reserve(1)?;
        for column in &mut self.columns {
            column.reserve(1)?;
        }
        Ok(())
    }

    /// Append `id`, returning its row. Callers push exactly one value per
    /// data column afterwards (bundle writes and transfers).
    pub(crate) fn push_id(&mut self, id: EntityId) -> usize {
        debug_assert!(
            self.entities.capacity() > self.entities.len(),
            "push_id without a reserved row"
        );
        let row = self.entities.len();
        self.entities.push(id);
        row
    }

    /// Swap-remove `row` from the id column and every data column, and
    /// return the id that was moved into `row` from the former last slot.
    ///
    /// Columns whose tag is in `already_moved` had their value transferred
    /// out during migration and are skipped; the rest drop theirs.
    pub(crate) fn swap_remove_row(
        &mut self,
        row: usize,
        already_moved: Archetype,
    ) -> Option<EntityId> {
        debug_assert!(row < self.entities.len(), "row {row} out of bounds");
        let data = self.data;
        for (tag, column) in data.tags().zip(self.columns.iter_mut()) {
            if !already_moved.has(tag) {
                column.swap_remove(row);
            }
        }
        self.entities.swap_remove(row);

        // If we swapped someone in, return their id so the caller can
        // update that registration's pointer.
        if row < self.entities.len() {
            Some(self.entities[row])
        } else {
            None
        }
    }

    /// Typed slice of the column for `tag`, absent for void or missing tags.
    pub fn slice<T: 'static>(&self, tag: Tag) -> Option<&[T]> {
        let position = self.column_position(tag)?;
        Some(column::slice::<T>(self.column(position)))
    }

    /// Mutable counterpart of [`slice`](Self::slice).
    pub fn slice_mut<T: 'static>(&mut self, tag: Tag) -> Option<&mut [T]> {
        let position = self.column_position(tag)?;
        Some(column::slice_mut::<T>(self.column_mut(position)))
    }

    /// Check the column parity invariants; used by consistency sweeps.
    pub(crate) fn assert_parity(&self) {
        assert_eq!(
            self.columns.len(),
            self.data.len(),
            "bucket {:?} column count diverged from its data mask",
            self.archetype
        );
        for column in &self.columns {
            assert_eq!(
                column.len(),
                self.entities.len(),
                "bucket {:?} column {} length diverged from its id column",
                self.archetype,
                column.element_type_name()
            );
        }
    }
}
