use battlefield::battle::{Battle, Strategy};
use battlefield::core::{ManualClock, SimulationConfig};
use battlefield::report::NullReporter;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn full_battle(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_battle");
    for strategy in Strategy::ALL {
        let config = SimulationConfig::new(2024, 4, strategy, 3, 8);
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &config, |b, config| {
            b.iter(|| {
                let mut battle = Battle::with_rng(
                    config,
                    ChaCha8Rng::seed_from_u64(config.seed),
                    ManualClock::new(0),
                )
                .unwrap();
                black_box(battle.run(&mut NullReporter))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, full_battle);
criterion_main!(benches);
