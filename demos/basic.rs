//! Minimal end-to-end walk: schema, inserts, a movement system, queries.
//!
//! Run with: cargo run --example basic

use lattice_ecs::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}

struct Anchored;

struct Movement;

impl System for Movement {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn inputs(&self, schema: &Schema) -> Archetype {
        <(Position, Velocity)>::shape(schema).unwrap()
    }

    fn run(&mut self, _ctx: &mut SystemContext<'_>, bucket: &mut BucketMut<'_>) -> Result<()> {
        let (positions, velocities) = bucket.fetch_mut::<(Position, Velocity)>();
        for (pos, vel) in positions.iter_mut().zip(velocities.iter()) {
            pos.x += vel.x;
            pos.y += vel.y;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let schema = SchemaBuilder::new()
        .component::<Position>("position")?
        .component::<Velocity>("velocity")?
        .marker::<Anchored>("anchored")?
        .build()?;
    let mut world = World::new(schema);

    for i in 0..4 {
        world.insert((
            Position {
                x: i as f32,
                y: 0.0,
            },
            Velocity { x: 1.0, y: 0.5 },
        ))?;
    }
    let pinned = world.insert((Position { x: 100.0, y: 100.0 }, Anchored))?;

    let mut runner = Runner::new();
    runner.add(Movement);
    for _ in 0..3 {
        runner.run_frame(&mut world)?;
    }

    let shape = world.shape_of::<(Position,)>()?;
    for bucket in world.query(shape) {
        for (id, pos) in bucket.entities().iter().zip(bucket.column::<Position>().unwrap()) {
            println!("entity {:>3}  at ({:5.1}, {:5.1})", id.index(), pos.x, pos.y);
        }
    }

    // anchored entities never matched the movement shape
    assert_eq!(
        world.get::<Position>(pinned),
        Some(&Position { x: 100.0, y: 100.0 })
    );
    Ok(())
}
