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

//! Command buffer for deferred structural mutation
//!
//! Systems must not insert, migrate, or delete while a query sweep holds
//! the buckets; they queue commands instead and the runner applies them
//! at the frame barrier.

use crate::archetype::Archetype;
use crate::component::Bundle;
use crate::entity::{EntityId, Key};
use crate::error::Result;
use crate::world::World;

/// Type alias for world mutation closures
pub type CommandClosure = Box<dyn FnOnce(&mut World) -> Result<()>>;

/// Deferred command for world mutations
pub enum Command {
    /// Insert a new entity with a closure
    Insert(CommandClosure),

    /// Delete an entity and all its registrations
    Delete(EntityId),

    /// Delete one registration
    DeleteKey(Key),

    /// Custom world mutation
    Custom(CommandClosure),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Insert(_) => write!(f, "Insert(...)"),
            Command::Delete(id) => f.debug_tuple("Delete").field(id).finish(),
            Command::DeleteKey(key) => f.debug_tuple("DeleteKey").field(key).finish(),
            Command::Custom(_) => write!(f, "Custom(...)"),
        }
    }
}

/// Command buffer for deferred operations
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Create new command buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Queue an insert of a new entity with the bundle's components
    pub fn insert<B: Bundle + 'static>(&mut self, values: B) {
        self.commands.push(Command::Insert(Box::new(move |world| {
            world.insert(values).map(|_| ())
        })));
    }

    /// Queue an update of an existing registration
    pub fn update<B: Bundle + 'static>(&mut self, key: Key, values: B) {
        self.commands.push(Command::Custom(Box::new(move |world| {
            world.update(key, values)
        })));
    }

    /// Queue the removal of component kinds from a registration
    pub fn remove(&mut self, key: Key, dropped: Archetype) {
        self.commands.push(Command::Custom(Box::new(move |world| {
            world.remove(key, dropped)
        })));
    }

    /// Queue the deletion of an entity
    pub fn delete(&mut self, id: EntityId) {
        self.commands.push(Command::Delete(id));
    }

    /// Queue the deletion of one registration
    pub fn delete_key(&mut self, key: Key) {
        self.commands.push(Command::DeleteKey(key));
    }

    /// Queue a custom world mutation
    pub fn add<F>(&mut self, f: F)
    where
        F: FnOnce(&mut World) -> Result<()> + 'static,
    {
        self.commands.push(Command::Custom(Box::new(f)));
    }

    /// Apply all commands to the world in queue order and clear the buffer
    pub fn apply(&mut self, world: &mut World) -> Result<()> {
        for command in self.commands.drain(..) {
            match command {
                Command::Insert(f) => f(world)?,
                Command::Delete(id) => world.delete(id)?,
                Command::DeleteKey(key) => world.delete_key(key)?,
                Command::Custom(f) => f(world)?,
            }
        }
        Ok(())
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
