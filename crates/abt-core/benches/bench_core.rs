// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK SUITE - abt-core
//
// Measures quoting and trade execution.
// Run: cargo bench -p abt-core
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use abt_core::{
    BondingCurveMarket, CurveConfig, InMemoryEscrow, InMemoryLedger, LinearCurve, SharedMarket,
    MAX_SUPPLY_UNITS, RAW_PER_UNIT,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ─────────────────────────────────────────────────────────────────
// CURVE BENCHMARKS
// ─────────────────────────────────────────────────────────────────

fn bench_quote_buy(c: &mut Criterion) {
    let curve = LinearCurve::canonical();
    let mut group = c.benchmark_group("curve/quote_buy");
    for supply in [0u128, 1_000, 1_000_000, MAX_SUPPLY_UNITS / 2] {
        group.bench_with_input(BenchmarkId::from_parameter(supply), &supply, |b, &s| {
            b.iter(|| black_box(curve.quote_buy(black_box(100), s)))
        });
    }
    group.finish();
}

fn bench_quote_sell(c: &mut Criterion) {
    let curve = LinearCurve::canonical();
    c.bench_function("curve/quote_sell", |b| {
        b.iter(|| black_box(curve.quote_sell(black_box(100), black_box(1_000_000))))
    });
}

fn bench_max_affordable(c: &mut Criterion) {
    let curve = LinearCurve::canonical();
    c.bench_function("curve/max_affordable", |b| {
        b.iter(|| black_box(curve.max_affordable(black_box(5 * RAW_PER_UNIT), black_box(10_000))))
    });
}

fn bench_price_schedule(c: &mut Criterion) {
    let curve = LinearCurve::canonical();
    c.bench_function("curve/price_schedule_1000", |b| {
        b.iter(|| black_box(curve.price_schedule(black_box(0), 1_000)))
    });
}

// ─────────────────────────────────────────────────────────────────
// MARKET BENCHMARKS
// ─────────────────────────────────────────────────────────────────

fn funded_market() -> BondingCurveMarket<InMemoryLedger, InMemoryEscrow> {
    let mut escrow = InMemoryEscrow::new();
    escrow.fund("LOADTEST", u128::MAX / 2).ok();
    BondingCurveMarket::new(
        &CurveConfig::canonical(),
        InMemoryLedger::new("Bench Ability", "BENCH").unwrap(),
        escrow,
    )
    .unwrap()
}

fn bench_buy_sell_cycle(c: &mut Criterion) {
    let mut market = funded_market();
    c.bench_function("market/buy_sell_cycle", |b| {
        b.iter(|| {
            market
                .execute_buy(black_box(10), RAW_PER_UNIT, "LOADTEST")
                .unwrap();
            market.execute_sell(black_box(10), "LOADTEST").unwrap();
            market.drain_events();
        })
    });
}

fn bench_shared_buy_sell_cycle(c: &mut Criterion) {
    let market = SharedMarket::new(funded_market());
    c.bench_function("market/shared_buy_sell_cycle", |b| {
        b.iter(|| {
            market
                .execute_buy(black_box(10), RAW_PER_UNIT, "LOADTEST")
                .unwrap();
            market.execute_sell(black_box(10), "LOADTEST").unwrap();
            market.drain_events();
        })
    });
}

// ─────────────────────────────────────────────────────────────────

criterion_group!(
    benches,
    bench_quote_buy,
    bench_quote_sell,
    bench_max_affordable,
    bench_price_schedule,
    bench_buy_sell_cycle,
    bench_shared_buy_sell_cycle,
);
criterion_main!(benches);
