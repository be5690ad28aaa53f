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

//! Component and Bundle traits
//!
//! Components are data attached to entities. Bundles group multiple
//! component values for one insert or update; their types are checked
//! against the schema before anything is written.

use std::any::type_name;

use crate::archetype::Archetype;
use crate::bucket::Bucket;
use crate::column;
use crate::error::{EcsError, Result};
use crate::schema::Schema;

/// Maximum number of components supported by Bundle implementations
pub const MAX_BUNDLE_COMPONENTS: usize = 8;

/// Marker trait for components
///
/// Components must be 'static (no borrowed data)
pub trait Component: 'static {}

/// Automatically implement Component for all valid types
impl<T: 'static> Component for T {}

/// Bundle of component values
///
/// Implemented for tuples of up to eight components. Marker (void) kinds
/// may appear in a bundle; they contribute their tag to the shape and
/// write nothing.
pub trait Bundle {
    /// Archetype of the bundle's kinds.
    ///
    /// Rejects types the schema does not declare and types repeated
    /// within the tuple, before any mutation happens.
    fn shape(schema: &Schema) -> Result<Archetype>
    where
        Self: Sized;

    /// Push the values as the freshly reserved last row of `bucket`.
    fn push(self, schema: &Schema, bucket: &mut Bucket)
    where
        Self: Sized;

    /// Overwrite the values at `row` in place, dropping the old ones.
    fn write(self, schema: &Schema, bucket: &mut Bucket, row: usize)
    where
        Self: Sized;
}

// Macro for tuple Bundle implementations
macro_rules! impl_bundle {
    ($($T:ident),*) => {
        impl<$($T: Component),*> Bundle for ($($T,)*) {
            #[allow(unused_variables)]
            fn shape(schema: &Schema) -> Result<Archetype> {
                #[allow(unused_mut)]
                let mut shape = Archetype::EMPTY;
                $(
                    let tag = schema.tag_of::<$T>()?;
                    if shape.has(tag) {
                        return Err(EcsError::DuplicateComponent(type_name::<$T>()));
                    }
                    shape = shape.with(tag);
                )*
                Ok(shape)
            }

            #[allow(non_snake_case, unused_variables)]
            fn push(self, schema: &Schema, bucket: &mut Bucket) {
                let ($($T,)*) = self;
                $(
                    if let Some(tag) = schema.lookup::<$T>() {
                        if let Some(position) = bucket.column_position(tag) {
                            column::vec_mut::<$T>(bucket.column_mut(position)).push($T);
                        }
                    }
                )*
            }

            #[allow(non_snake_case, unused_variables)]
            fn write(self, schema: &Schema, bucket: &mut Bucket, row: usize) {
                let ($($T,)*) = self;
                $(
                    if let Some(tag) = schema.lookup::<$T>() {
                        if let Some(position) = bucket.column_position(tag) {
                            column::slice_mut::<$T>(bucket.column_mut(position))[row] = $T;
                        }
                    }
                )*
            }
        }
    };
}

// Implement for tuples of 0-8 components
impl_bundle!();
impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);
