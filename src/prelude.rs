//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use lattice_ecs::prelude::*;
//! ```

pub use crate::archetype::{Archetype, Tag};
pub use crate::command::CommandBuffer;
pub use crate::component::{Bundle, Component};
pub use crate::entity::{EntityId, Key, Role};
pub use crate::error::{EcsError, Result};
pub use crate::query::{BucketMut, BucketRef};
pub use crate::schedule::Runner;
pub use crate::schema::{Schema, SchemaBuilder};
pub use crate::system::{System, SystemContext};
pub use crate::world::World;
