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

//! Lattice ECS - archetype-based entity-component store
//!
//! Component data is partitioned by the exact set of kinds an entity
//! carries (its archetype, a machine-word bitset), so iteration over a
//! shape is a contiguous walk over packed columns. Entities migrate
//! between buckets when kinds are added or removed; one id may be
//! registered several times under distinct `(component, role)` keys.

pub mod archetype;
pub mod bucket;
pub mod column;
pub mod command;
pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod schedule;
pub mod schema;
pub mod system;
pub mod world;

pub mod prelude;

// Re-exports for convenience
pub use archetype::{Archetype, Tag, MAX_COMPONENTS};
pub use bucket::Bucket;
pub use command::CommandBuffer;
pub use component::{Bundle, Component, MAX_BUNDLE_COMPONENTS};
pub use entity::{EntityId, EntityManager, Key, Pointer, Role};
pub use error::{EcsError, Result};
pub use query::{BucketMut, BucketRef, Fetch, FetchMut, Query, QueryMut};
pub use schedule::Runner;
pub use schema::{Schema, SchemaBuilder, TagInfo};
pub use system::{BoxedSystem, System, SystemContext};
pub use world::World;
