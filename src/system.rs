//! System trait and per-frame context

use bumpalo::Bump;

use crate::archetype::Archetype;
use crate::command::CommandBuffer;
use crate::error::Result;
use crate::query::BucketMut;
use crate::schema::Schema;

/// Per-frame context handed to systems.
///
/// `scratch` is a frame-scoped arena, reset at the barrier; allocations
/// in it must not escape the frame. Structural changes go through
/// `commands` and apply at the barrier.
pub struct SystemContext<'a> {
    pub scratch: &'a Bump,
    pub commands: &'a mut CommandBuffer,
}

/// A unit of per-frame work over one component shape.
///
/// The runner visits every non-empty bucket whose archetype contains
/// `inputs`, calling `run` once per bucket with that bucket's columns.
pub trait System {
    /// Get system name
    fn name(&self) -> &'static str;

    /// Required component shape
    fn inputs(&self, schema: &Schema) -> Archetype;

    /// Hook before the bucket sweep
    fn begin(&mut self, _ctx: &mut SystemContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Process one matching bucket
    fn run(&mut self, ctx: &mut SystemContext<'_>, bucket: &mut BucketMut<'_>) -> Result<()>;

    /// Hook after the bucket sweep
    fn end(&mut self, _ctx: &mut SystemContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Boxed system
pub type BoxedSystem = Box<dyn System>;
