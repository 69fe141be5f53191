//! Benchmark for the weighted draw selector.
//!
//! TARGET: draw cost stays negligible next to the chain transfer
//!
//! Run with: cargo bench --package shardvault_economy --bench draw_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::SeedableRng;
use shardvault_economy::draw::{run_statistics, select_prize, select_with_roll, DrawRng};
use shardvault_economy::{AssetKind, PrizeDefinition};

fn create_test_catalog() -> Vec<PrizeDefinition> {
    vec![
        PrizeDefinition::new("shard_x5", AssetKind::FungibleShard, 70.0).with_amount(5),
        PrizeDefinition::new("shard_x25", AssetKind::FungibleShard, 20.0),
        PrizeDefinition::new("eth_dust", AssetKind::FungibleNative, 8.0).with_amount(10_000_000_000_000),
        PrizeDefinition::new("dragon_egg", AssetKind::UniqueAsset, 1.5).with_xp(100),
        PrizeDefinition::new("retired_badge", AssetKind::UniqueAsset, 0.0),
        PrizeDefinition::new("genesis_key", AssetKind::UniqueAsset, 0.5).with_xp(500),
    ]
}

fn benchmark_single_draw(c: &mut Criterion) {
    let catalog = create_test_catalog();
    let mut rng = DrawRng::seed_from_u64(7);

    c.bench_function("single_draw", |b| {
        b.iter(|| black_box(select_prize(black_box(&catalog), &mut rng)));
    });
}

fn benchmark_boundary_walk(c: &mut Criterion) {
    let catalog = create_test_catalog();

    // Worst case: the roll walks the whole list.
    c.bench_function("boundary_walk", |b| {
        b.iter(|| black_box(select_with_roll(black_box(&catalog), black_box(99.999_999))));
    });
}

fn benchmark_million_draws(c: &mut Criterion) {
    let catalog = create_test_catalog();

    let mut group = c.benchmark_group("million_draws");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_draws", |b| {
        b.iter(|| {
            let mut rng = DrawRng::seed_from_u64(42);
            for _ in 0..1_000_000u32 {
                let _ = black_box(select_prize(&catalog, &mut rng));
            }
        });
    });

    group.finish();
}

fn benchmark_statistics(c: &mut Criterion) {
    let catalog = create_test_catalog();

    c.bench_function("statistics_100k", |b| {
        b.iter(|| {
            let mut rng = DrawRng::seed_from_u64(1);
            black_box(run_statistics(black_box(&catalog), &mut rng, black_box(100_000)))
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_draw,
    benchmark_boundary_walk,
    benchmark_million_draws,
    benchmark_statistics
);
criterion_main!(benches);
