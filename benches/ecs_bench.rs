//! Benchmarks for the storage core
//!
//! Run with: cargo bench
//!
//! Measures insert throughput, shape migration, and query iteration.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lattice_ecs::prelude::*;

#[derive(Debug, Copy, Clone)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Copy, Clone)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Copy, Clone)]
struct Health(u32);

fn schema() -> Schema {
    SchemaBuilder::new()
        .component::<Position>("position")
        .unwrap()
        .component::<Velocity>("velocity")
        .unwrap()
        .component::<Health>("health")
        .unwrap()
        .build()
        .unwrap()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    group.bench_function("insert_1k_single_component", |b| {
        b.iter(|| {
            let mut world = World::new(schema());
            for i in 0..1_000 {
                let _ = world.insert((Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },));
            }
            black_box(world.len())
        });
    });

    group.bench_function("insert_1k_three_components", |b| {
        b.iter(|| {
            let mut world = World::new(schema());
            for i in 0..1_000 {
                let _ = world.insert((
                    Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                    Velocity {
                        x: 1.0,
                        y: 1.0,
                        z: 1.0,
                    },
                    Health(100),
                ));
            }
            black_box(world.len())
        });
    });

    group.finish();
}

fn bench_migrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("migrate");

    group.bench_function("widen_1k", |b| {
        b.iter(|| {
            let mut world = World::new(schema());
            let keys: Vec<Key> = (0..1_000)
                .map(|i| {
                    world
                        .insert((Position {
                            x: i as f32,
                            y: 0.0,
                            z: 0.0,
                        },))
                        .unwrap()
                })
                .collect();
            for key in &keys {
                world
                    .update(
                        *key,
                        (Velocity {
                            x: 1.0,
                            y: 0.0,
                            z: 0.0,
                        },),
                    )
                    .unwrap();
            }
            black_box(world.bucket_count())
        });
    });

    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    let mut world = World::new(schema());
    for i in 0..10_000 {
        world
            .insert((
                Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },
                Velocity {
                    x: 1.0,
                    y: 2.0,
                    z: 3.0,
                },
            ))
            .unwrap();
    }
    let shape = world.shape_of::<(Position, Velocity)>().unwrap();

    group.bench_function("sum_10k_two_columns", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for bucket in world.query(shape) {
                let (positions, velocities) = bucket.fetch::<(Position, Velocity)>();
                for (pos, vel) in positions.iter().zip(velocities) {
                    sum += pos.x + vel.z;
                }
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_migrate, bench_iterate);
criterion_main!(benches);
