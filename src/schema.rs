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

//! Component schema registry
//!
//! The schema fixes the set of component kinds up front: each Rust type
//! becomes a [`Tag`], data kinds get a column constructor, and marker
//! kinds (zero-sized types) fold into the void mask. All later schema
//! checks are a single map probe.

use std::any::{type_name, TypeId};
use std::mem;

use rustc_hash::FxHashMap;

use crate::archetype::{Archetype, Tag, MAX_COMPONENTS};
use crate::column::{self, Column};
use crate::component::Component;
use crate::error::{EcsError, Result};

/// Per-kind registration record.
#[derive(Debug)]
pub struct TagInfo {
    pub name: &'static str,
    pub type_id: TypeId,
    pub size: usize,
    /// `None` for marker kinds; they own no column.
    pub(crate) make_column: Option<fn() -> Box<dyn Column>>,
}

impl TagInfo {
    pub fn is_void(&self) -> bool {
        self.make_column.is_none()
    }
}

/// Immutable component registry built by [`SchemaBuilder`].
#[derive(Debug)]
pub struct Schema {
    infos: Vec<TagInfo>,
    by_type: FxHashMap<TypeId, Tag>,
    void: Archetype,
}

impl Schema {
    /// Number of declared kinds.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// The archetype of exactly the marker kinds.
    pub fn void_mask(&self) -> Archetype {
        self.void
    }

    pub fn info(&self, tag: Tag) -> &TagInfo {
        &self.infos[tag.index()]
    }

    pub fn is_void(&self, tag: Tag) -> bool {
        self.void.has(tag)
    }

    /// Tag for a declared component type, if any.
    pub fn lookup<T: Component>(&self) -> Option<Tag> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Tag for a declared component type, or `UnknownComponent`.
    pub fn tag_of<T: Component>(&self) -> Result<Tag> {
        self.lookup::<T>()
            .ok_or(EcsError::UnknownComponent(type_name::<T>()))
    }

    /// Number of data columns a bucket for `archetype` owns.
    pub fn count(&self, archetype: Archetype) -> usize {
        archetype.difference(self.void).len()
    }

    /// Column position of `tag` inside a bucket for `archetype`.
    ///
    /// `tag` must be present and non-void.
    pub fn column_index(&self, archetype: Archetype, tag: Tag) -> usize {
        debug_assert!(!self.is_void(tag), "void tag {} has no column", tag.index());
        archetype.difference(self.void).position(tag)
    }

    /// Checked form of [`column_index`](Self::column_index).
    pub fn column_index_of(&self, archetype: Archetype, tag: Tag) -> Option<usize> {
        archetype.difference(self.void).position_of(tag)
    }

    pub(crate) fn new_column(&self, tag: Tag) -> Box<dyn Column> {
        let info = self.info(tag);
        match info.make_column {
            Some(make) => make(),
            None => panic!("void kind {} has no column", info.name),
        }
    }
}

/// Declares component kinds and builds a [`Schema`].
///
/// Kinds are numbered in declaration order; at most [`MAX_COMPONENTS`]
/// may be declared and a schema with none is rejected.
#[derive(Debug)]
pub struct SchemaBuilder {
    infos: Vec<TagInfo>,
    by_type: FxHashMap<TypeId, Tag>,
    void: Archetype,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            infos: Vec::new(),
            by_type: FxHashMap::default(),
            void: Archetype::EMPTY,
        }
    }

    /// Declare a data component kind. `T` must carry data.
    pub fn component<T: Component>(self, name: &'static str) -> Result<Self> {
        if mem::size_of::<T>() == 0 {
            return Err(EcsError::ZeroSizedComponent(name));
        }
        self.declare::<T>(name, Some(column::new_boxed::<T>))
    }

    /// Declare a marker (void) kind. `T` must be zero-sized.
    pub fn marker<T: Component>(self, name: &'static str) -> Result<Self> {
        if mem::size_of::<T>() != 0 {
            return Err(EcsError::MarkerNotEmpty(name));
        }
        self.declare::<T>(name, None)
    }

    fn declare<T: Component>(
        mut self,
        name: &'static str,
        make_column: Option<fn() -> Box<dyn Column>>,
    ) -> Result<Self> {
        if self.infos.len() >= MAX_COMPONENTS {
            return Err(EcsError::TooManyComponents);
        }
        if self.by_type.contains_key(&TypeId::of::<T>()) {
            return Err(EcsError::DuplicateComponent(name));
        }

        let tag = Tag::new(self.infos.len());
        if make_column.is_none() {
            self.void = self.void.with(tag);
        }
        self.by_type.insert(TypeId::of::<T>(), tag);
        self.infos.push(TagInfo {
            name,
            type_id: TypeId::of::<T>(),
            size: mem::size_of::<T>(),
            make_column,
        });
        Ok(self)
    }

    pub fn build(self) -> Result<Schema> {
        if self.infos.is_empty() {
            return Err(EcsError::EmptySchema);
        }
        Ok(Schema {
            infos: self.infos,
            by_type: self.by_type,
            void: self.void,
        })
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
