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

//! Single-threaded system runner
//!
//! Systems execute in registration order, each sweeping the buckets that
//! match its input shape. Queued commands apply at the frame barrier,
//! after every system has run, and the scratch arena resets with them.

use bumpalo::Bump;

use crate::command::CommandBuffer;
use crate::error::Result;
use crate::system::{BoxedSystem, System, SystemContext};
use crate::world::World;

/// Frame runner over an ordered list of systems.
pub struct Runner {
    systems: Vec<BoxedSystem>,
    scratch: Bump,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            scratch: Bump::new(),
        }
    }

    /// Append a system; frame order is registration order.
    pub fn add<S: System + 'static>(&mut self, system: S) -> &mut Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Execute one frame: every system over its matching buckets, then
    /// the command barrier.
    pub fn run_frame(&mut self, world: &mut World) -> Result<()> {
        let mut commands = CommandBuffer::new();

        for system in &mut self.systems {
            let shape = system.inputs(world.schema());
            let mut ctx = SystemContext {
                scratch: &self.scratch,
                commands: &mut commands,
            };

            system.begin(&mut ctx)?;
            for mut bucket in world.query_mut(shape) {
                system.run(&mut ctx, &mut bucket)?;
            }
            system.end(&mut ctx)?;
        }

        // Barrier: structural changes land only here.
        commands.apply(world)?;
        self.scratch.reset();
        Ok(())
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Archetype;
    use crate::query::BucketMut;
    use crate::schema::{Schema, SchemaBuilder};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity {
        x: i32,
        y: i32,
    }

    fn schema() -> Schema {
        SchemaBuilder::new()
            .component::<Position>("position")
            .unwrap()
            .component::<Velocity>("velocity")
            .unwrap()
            .build()
            .unwrap()
    }

    struct Movement {
        buckets_seen: usize,
    }

    impl System for Movement {
        fn name(&self) -> &'static str {
            "movement"
        }

        fn inputs(&self, schema: &Schema) -> Archetype {
            <(Position, Velocity)>::shape(schema).unwrap()
        }

        fn run(&mut self, _ctx: &mut SystemContext<'_>, bucket: &mut BucketMut<'_>) -> Result<()> {
            self.buckets_seen += 1;
            let (positions, velocities) = bucket.fetch_mut::<(Position, Velocity)>();
            for (pos, vel) in positions.iter_mut().zip(velocities.iter()) {
                pos.x += vel.x;
                pos.y += vel.y;
            }
            Ok(())
        }
    }

    use crate::component::Bundle;

    #[test]
    fn runner_sweeps_matching_buckets_and_applies_commands() {
        let mut world = World::new(schema());
        let moving = world
            .insert((Position { x: 0, y: 0 }, Velocity { x: 1, y: 2 }))
            .unwrap();
        let still = world.insert((Position { x: 5, y: 5 },)).unwrap();

        struct Cull;
        impl System for Cull {
            fn name(&self) -> &'static str {
                "cull"
            }

            fn inputs(&self, schema: &Schema) -> Archetype {
                <(Position,)>::shape(schema).unwrap()
            }

            fn run(
                &mut self,
                ctx: &mut SystemContext<'_>,
                bucket: &mut BucketMut<'_>,
            ) -> Result<()> {
                // queue deletion of entities that wandered past x == 5
                let positions = bucket.column::<Position>().unwrap();
                for (id, pos) in bucket.entities().iter().zip(positions) {
                    if pos.x >= 5 {
                        ctx.commands.delete(*id);
                    }
                }
                Ok(())
            }
        }

        let mut runner = Runner::new();
        runner.add(Movement { buckets_seen: 0 });
        runner.add(Cull);
        runner.run_frame(&mut world).unwrap();

        // movement applied before the barrier, culling at it
        assert_eq!(
            world.get::<Position>(moving),
            Some(&Position { x: 1, y: 2 })
        );
        assert!(!world.is_live(still.id));
        world.assert_consistent();
    }
}
