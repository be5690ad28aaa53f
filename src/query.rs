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

//! Query iteration over matching buckets
//!
//! A query walks every bucket whose archetype contains the requested
//! shape, skipping empty ones, and hands out views with typed column
//! slices. Bucket order follows the map and is unspecified.

use std::any::type_name;
use std::collections::hash_map::{Values, ValuesMut};

use crate::archetype::{Archetype, Tag};
use crate::bucket::Bucket;
use crate::column;
use crate::component::Component;
use crate::entity::EntityId;
use crate::schema::Schema;

/// Iterator over shared views of the buckets containing `shape`.
pub struct Query<'w> {
    buckets: Values<'w, Archetype, Bucket>,
    shape: Archetype,
    schema: &'w Schema,
}

impl<'w> Query<'w> {
    pub(crate) fn new(
        buckets: Values<'w, Archetype, Bucket>,
        shape: Archetype,
        schema: &'w Schema,
    ) -> Self {
        Self {
            buckets,
            shape,
            schema,
        }
    }
}

impl<'w> Iterator for Query<'w> {
    type Item = BucketRef<'w>;

    fn next(&mut self) -> Option<BucketRef<'w>> {
        loop {
            let bucket = self.buckets.next()?;
            if bucket.archetype().contains(self.shape) && !bucket.is_empty() {
                return Some(BucketRef {
                    bucket,
                    schema: self.schema,
                });
            }
        }
    }
}

/// Iterator over mutable views of the buckets containing `shape`.
pub struct QueryMut<'w> {
    buckets: ValuesMut<'w, Archetype, Bucket>,
    shape: Archetype,
    schema: &'w Schema,
}

impl<'w> QueryMut<'w> {
    pub(crate) fn new(
        buckets: ValuesMut<'w, Archetype, Bucket>,
        shape: Archetype,
        schema: &'w Schema,
    ) -> Self {
        Self {
            buckets,
            shape,
            schema,
        }
    }
}

impl<'w> Iterator for QueryMut<'w> {
    type Item = BucketMut<'w>;

    fn next(&mut self) -> Option<BucketMut<'w>> {
        loop {
            let bucket = self.buckets.next()?;
            if bucket.archetype().contains(self.shape) && !bucket.is_empty() {
                return Some(BucketMut {
                    bucket,
                    schema: self.schema,
                });
            }
        }
    }
}

/// Shared view of one matching bucket.
pub struct BucketRef<'w> {
    bucket: &'w Bucket,
    schema: &'w Schema,
}

impl<'w> BucketRef<'w> {
    pub fn archetype(&self) -> Archetype {
        self.bucket.archetype()
    }

    pub fn entities(&self) -> &'w [EntityId] {
        self.bucket.entities()
    }

    pub fn len(&self) -> usize {
        self.bucket.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bucket.is_empty()
    }

    /// Column slice for `tag`; absent for void or missing tags.
    /// Panics if `T` is not the column's element type.
    pub fn get<T: Component>(&self, tag: Tag) -> Option<&'w [T]> {
        self.bucket.slice::<T>(tag)
    }

    /// Column slice for component type `T`, resolved through the schema.
    pub fn column<T: Component>(&self) -> Option<&'w [T]> {
        self.get(self.schema.lookup::<T>()?)
    }

    /// Slices for every kind in the tuple at once.
    ///
    /// Panics if the bucket does not carry the requested shape.
    pub fn fetch<F: Fetch<'w>>(&self) -> F::Slices {
        F::fetch(self.bucket, self.schema)
    }
}

/// Mutable view of one matching bucket.
pub struct BucketMut<'w> {
    bucket: &'w mut Bucket,
    schema: &'w Schema,
}

impl<'w> BucketMut<'w> {
    pub fn archetype(&self) -> Archetype {
        self.bucket.archetype()
    }

    pub fn entities(&self) -> &[EntityId] {
        self.bucket.entities()
    }

    pub fn len(&self) -> usize {
        self.bucket.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bucket.is_empty()
    }

    pub fn get<T: Component>(&self, tag: Tag) -> Option<&[T]> {
        self.bucket.slice::<T>(tag)
    }

    pub fn get_mut<T: Component>(&mut self, tag: Tag) -> Option<&mut [T]> {
        self.bucket.slice_mut::<T>(tag)
    }

    pub fn column<T: Component>(&self) -> Option<&[T]> {
        self.get(self.schema.lookup::<T>()?)
    }

    pub fn column_mut<T: Component>(&mut self) -> Option<&mut [T]> {
        self.get_mut(self.schema.lookup::<T>()?)
    }

    /// Mutable slices for every kind in the tuple at once.
    ///
    /// Panics if the bucket does not carry the requested shape or the
    /// tuple repeats a kind.
    pub fn fetch_mut<'a, F: FetchMut<'a>>(&'a mut self) -> F::Slices {
        F::fetch_mut(&mut *self.bucket, self.schema)
    }
}

/// Tuple of component types fetched as shared slices.
pub trait Fetch<'w> {
    type Slices;

    fn fetch(bucket: &'w Bucket, schema: &Schema) -> Self::Slices;
}

/// Tuple of component types fetched as mutable slices.
pub trait FetchMut<'w> {
    type Slices;

    fn fetch_mut(bucket: &'w mut Bucket, schema: &Schema) -> Self::Slices;
}

fn fetch_position<T: Component>(bucket: &Bucket, schema: &Schema) -> usize {
    let tag = schema
        .lookup::<T>()
        .unwrap_or_else(|| panic!("component {} is not declared in the schema", type_name::<T>()));
    bucket.column_position(tag).unwrap_or_else(|| {
        panic!(
            "bucket {:?} has no column for {}",
            bucket.archetype(),
            type_name::<T>()
        )
    })
}

// Macro for tuple Fetch implementations
macro_rules! impl_fetch {
    ($($T:ident),+) => {
        impl<'w, $($T: Component),+> Fetch<'w> for ($($T,)+) {
            type Slices = ($(&'w [$T],)+);

            fn fetch(bucket: &'w Bucket, schema: &Schema) -> Self::Slices {
                ($(
                    column::slice::<$T>(bucket.column(fetch_position::<$T>(bucket, schema))),
                )+)
            }
        }

        impl<'w, $($T: Component),+> FetchMut<'w> for ($($T,)+) {
            type Slices = ($(&'w mut [$T],)+);

            #[allow(non_snake_case)]
            fn fetch_mut(bucket: &'w mut Bucket, schema: &Schema) -> Self::Slices {
                $(let $T = fetch_position::<$T>(bucket, schema);)+
                let [$($T,)+] = bucket.columns_disjoint_mut([$($T),+]);
                ($(column::slice_mut::<$T>(&mut **$T),)+)
            }
        }
    };
}

// Implement for tuples of 1-8 components
impl_fetch!(A);
impl_fetch!(A, B);
impl_fetch!(A, B, C);
impl_fetch!(A, B, C, D);
impl_fetch!(A, B, C, D, E);
impl_fetch!(A, B, C, D, E, F);
impl_fetch!(A, B, C, D, E, F, G);
impl_fetch!(A, B, C, D, E, F, G, H);
