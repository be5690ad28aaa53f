//! Migration behavior: value movement, overwrite, and drop discipline.

use std::cell::Cell;
use std::rc::Rc;

use lattice_ecs::prelude::*;

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

struct Frozen;

/// Component whose drops are counted, to catch double-drops and leaks.
struct Payload {
    drops: Rc<Cell<u32>>,
    value: u32,
}

impl Drop for Payload {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

fn schema() -> Schema {
    SchemaBuilder::new()
        .component::<Position>("position")
        .unwrap()
        .component::<Velocity>("velocity")
        .unwrap()
        .component::<Payload>("payload")
        .unwrap()
        .marker::<Frozen>("frozen")
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn migrated_values_move_instead_of_dropping() {
    let drops = Rc::new(Cell::new(0));
    let mut world = World::new(schema());

    let key = world
        .insert((Payload {
            drops: drops.clone(),
            value: 11,
        },))
        .unwrap();

    // two migrations: widen, then narrow back
    world.update(key, (Position { x: 1, y: 2 },)).unwrap();
    let pos_tag = world.schema().tag_of::<Position>().unwrap();
    world.remove(key, Archetype::just(pos_tag)).unwrap();

    assert_eq!(drops.get(), 0, "the payload only ever moved");
    assert_eq!(world.get::<Payload>(key).map(|p| p.value), Some(11));

    world.delete(key.id).unwrap();
    assert_eq!(drops.get(), 1);
    world.assert_consistent();
}

#[test]
fn overwrites_drop_the_previous_value() {
    let drops = Rc::new(Cell::new(0));
    let mut world = World::new(schema());
    let payload = |value: u32| Payload {
        drops: drops.clone(),
        value,
    };

    let key = world.insert((payload(1),)).unwrap();

    // in place: same shape
    world.update(key, (payload(2),)).unwrap();
    assert_eq!(drops.get(), 1);

    // while migrating: the stale source value drops with the source row
    world.update(key, (payload(3), Frozen)).unwrap();
    assert_eq!(drops.get(), 2);
    assert_eq!(world.get::<Payload>(key).map(|p| p.value), Some(3));

    world.delete(key.id).unwrap();
    assert_eq!(drops.get(), 3);
    world.assert_consistent();
}

#[test]
fn removed_kinds_drop_their_value() {
    let drops = Rc::new(Cell::new(0));
    let mut world = World::new(schema());

    let key = world
        .insert((
            Payload {
                drops: drops.clone(),
                value: 9,
            },
            Position { x: 0, y: 0 },
        ))
        .unwrap();

    let payload_tag = world.schema().tag_of::<Payload>().unwrap();
    world.remove(key, Archetype::just(payload_tag)).unwrap();

    assert_eq!(drops.get(), 1);
    assert_eq!(world.get::<Position>(key), Some(&Position { x: 0, y: 0 }));
    assert!(world.get::<Payload>(key).is_none());

    world.delete(key.id).unwrap();
    assert_eq!(drops.get(), 1, "the payload was gone before the delete");
    world.assert_consistent();
}

#[test]
fn world_drop_releases_remaining_values() {
    let drops = Rc::new(Cell::new(0));
    {
        let mut world = World::new(schema());
        for value in 0..5 {
            world
                .insert((Payload {
                    drops: drops.clone(),
                    value,
                },))
                .unwrap();
        }
        assert_eq!(drops.get(), 0);
    }
    assert_eq!(drops.get(), 5);
}

#[test]
fn long_migration_chain_preserves_every_value() {
    let mut world = World::new(schema());

    let key = world.insert((Position { x: 1, y: 2 },)).unwrap();
    world.update(key, (Velocity { x: 3, y: 4 },)).unwrap();
    world.update(key, (Frozen,)).unwrap();

    assert_eq!(world.get::<Position>(key), Some(&Position { x: 1, y: 2 }));
    assert_eq!(world.get::<Velocity>(key), Some(&Velocity { x: 3, y: 4 }));

    let frozen_tag = world.schema().tag_of::<Frozen>().unwrap();
    let vel_tag = world.schema().tag_of::<Velocity>().unwrap();
    world
        .remove(key, Archetype::just(frozen_tag).with(vel_tag))
        .unwrap();

    assert_eq!(world.get::<Position>(key), Some(&Position { x: 1, y: 2 }));
    assert!(world.get::<Velocity>(key).is_none());
    assert_eq!(
        world.archetype_of(key).unwrap(),
        Archetype::just(world.schema().tag_of::<Position>().unwrap())
    );
    world.assert_consistent();
}

#[test]
fn removing_absent_kinds_is_a_no_op() {
    let mut world = World::new(schema());
    let key = world.insert((Position { x: 1, y: 1 },)).unwrap();
    let before = world.pointers(key.id).unwrap()[0];

    let vel_tag = world.schema().tag_of::<Velocity>().unwrap();
    world.remove(key, Archetype::just(vel_tag)).unwrap();

    assert_eq!(world.pointers(key.id).unwrap()[0], before);
    world.assert_consistent();
}
