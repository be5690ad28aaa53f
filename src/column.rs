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

//! Type-erased component columns
//!
//! One packed growable array per data component kind, driven through a
//! small vtable so buckets can hold columns of heterogeneous element
//! types in one vector. Every downcast re-checks the element `TypeId`
//! and panics on mismatch.

use std::any::{type_name, Any, TypeId};

use crate::error::Result;

/// Vtable over one packed component array.
///
/// `reserve` is the only fallible operation and only grows capacity, so a
/// failed reservation leaves nothing to roll back. `transfer` is the
/// migration primitive: it moves the value at `row` into the end of
/// another column of the same element type.
pub trait Column {
    fn element_type_id(&self) -> TypeId;

    fn element_type_name(&self) -> &'static str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow capacity for `additional` more values. Never changes `len`.
    fn reserve(&mut self, additional: usize) -> Result<()>;

    /// Lower `len`, retaining capacity and dropping the tail values.
    fn truncate(&mut self, len: usize);

    /// Swap-remove the value at `row`, dropping it.
    fn swap_remove(&mut self, row: usize);

    /// Swap-remove the value at `row` and push it onto `target`.
    ///
    /// `target` must hold the same element type and have a reserved slot.
    fn transfer(&mut self, row: usize, target: &mut dyn Column);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> Column for Vec<T> {
    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.try_reserve(additional)?;
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    fn swap_remove(&mut self, row: usize) {
        Vec::swap_remove(self, row);
    }

    fn transfer(&mut self, row: usize, target: &mut dyn Column) {
        let value = Vec::swap_remove(self, row);
        let target = vec_mut::<T>(target);
        debug_assert!(target.capacity() > target.len(), "transfer into an unreserved column");
        target.push(value);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Construct an empty boxed column for element type `T`.
pub(crate) fn new_boxed<T: 'static>() -> Box<dyn Column> {
    Box::new(Vec::<T>::new())
}

/// Downcast to the typed slice. Panics on element type mismatch.
pub(crate) fn slice<T: 'static>(column: &dyn Column) -> &[T] {
    match column.as_any().downcast_ref::<Vec<T>>() {
        Some(vec) => vec.as_slice(),
        None => mismatch::<T>(column.element_type_name()),
    }
}

/// Downcast to the typed mutable slice. Panics on element type mismatch.
pub(crate) fn slice_mut<T: 'static>(column: &mut dyn Column) -> &mut [T] {
    let found = column.element_type_name();
    match column.as_any_mut().downcast_mut::<Vec<T>>() {
        Some(vec) => vec.as_mut_slice(),
        None => mismatch::<T>(found),
    }
}

/// Downcast to the backing vector, for pushes. Panics on mismatch.
pub(crate) fn vec_mut<T: 'static>(column: &mut dyn Column) -> &mut Vec<T> {
    let found = column.element_type_name();
    match column.as_any_mut().downcast_mut::<Vec<T>>() {
        Some(vec) => vec,
        None => mismatch::<T>(found),
    }
}

fn mismatch<T>(found: &'static str) -> ! {
    panic!(
        "column type mismatch: expected {}, found {}",
        type_name::<T>(),
        found
    )
}
