//! Tick benchmarks for the arena server
//!
//! Measures a full tick, projectile collision and delta building at several
//! player counts against the 33ms budget of a 30 Hz loop.
//!
//! Run with: cargo bench --bench tick

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arena_sync_server::config::SimulationConfig;
use arena_sync_server::game::constants::tick::DT;
use arena_sync_server::game::simulation::{self, TickReport};
use arena_sync_server::game::state::{AbilityUse, MoveIntent, WorldState};
use arena_sync_server::game::systems::projectile;
use arena_sync_server::net::delta::DeltaTracker;
use arena_sync_server::net::protocol::{encode, ServerMessage};
use arena_sync_server::util::vec2::Vec2;

/// World with `count` players holding random intents plus a projectile per player
fn create_world(count: usize, config: &SimulationConfig) -> WorldState {
    let mut world = WorldState::with_seed(count as u64);
    let mut rng = StdRng::seed_from_u64(0xA5E4A);

    for _ in 0..count {
        let id = world.add_player(config);
        let player = world.get_player_mut(id).unwrap();
        player.intent = MoveIntent {
            up: rng.gen_bool(0.5),
            down: rng.gen_bool(0.5),
            left: rng.gen_bool(0.5),
            right: rng.gen_bool(0.5),
        };
        let position = player.position;
        let direction = Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU));
        world.spawn_projectile(id, position + direction * 30.0, direction, config.projectile_speed);
    }

    world
}

/// Queue one ability per player, cycling through the three kinds
fn queue_abilities(world: &mut WorldState, rng: &mut StdRng) {
    let ids: Vec<_> = world.players.keys().copied().collect();
    for (i, id) in ids.into_iter().enumerate() {
        let ability = match i % 3 {
            0 => {
                let origin = world.players[&id].position;
                let target = Vec2::new(rng.gen_range(0.0..1600.0), rng.gen_range(0.0..900.0));
                AbilityUse::Primary { origin, target }
            }
            1 => AbilityUse::Secondary,
            _ => AbilityUse::Mobility,
        };
        world.queue_ability(id, ability);
    }
}

fn bench_full_tick(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let mut group = c.benchmark_group("full_tick");
    group.sample_size(50);

    for count in [10, 50, 200, 500] {
        let mut world = create_world(count, &config);
        let mut rng = StdRng::seed_from_u64(7);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("advance", count), &count, |b, _| {
            b.iter(|| {
                queue_abilities(&mut world, &mut rng);
                black_box(simulation::advance(&mut world, &config, DT))
            })
        });
    }
    group.finish();
}

fn bench_collisions(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let mut group = c.benchmark_group("collisions");
    group.sample_size(50);

    for count in [10, 50, 200, 500] {
        let world = create_world(count, &config);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("resolve", count), &count, |b, _| {
            b.iter_batched(
                || world.clone(),
                |mut world| {
                    let mut report = TickReport::new(world.tick);
                    projectile::advance_projectiles(&mut world, DT);
                    black_box(projectile::resolve_collisions(&mut world, &config, &mut report))
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_delta(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let mut group = c.benchmark_group("delta");
    group.sample_size(50);

    for count in [10, 50, 200, 500] {
        let world = create_world(count, &config);
        let changed: BTreeSet<_> = world.players.keys().copied().collect();
        let mut tracker = DeltaTracker::new();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("build_and_encode", count), &count, |b, _| {
            b.iter(|| {
                let delta = tracker.build(&world, &changed);
                black_box(encode(&ServerMessage::Delta(delta)).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_full_tick, bench_collisions, bench_delta);

criterion_main!(benches);
