use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use robinhood_hashmap::RobinHoodMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("robinhood_hashmap_insert_10k", |b| {
        b.iter_batched(
            RobinHoodMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("robinhood_hashmap_get_hit", |b| {
        let mut m = RobinHoodMap::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.insert(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("robinhood_hashmap_get_miss", |b| {
        let mut m = RobinHoodMap::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.insert(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(m.get(&k));
        })
    });
}

fn bench_remove_insert_churn(c: &mut Criterion) {
    c.bench_function("robinhood_hashmap_remove_insert", |b| {
        let mut m = RobinHoodMap::new();
        let keys: Vec<_> = lcg(13).take(10_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.insert(k, i as u64);
        }
        // Steady state: occupancy stays at 10k, so every remove shifts a
        // chain and every insert probes a warm table.
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            m.remove(k.as_str());
            m.insert(k.clone(), 0);
        })
    });
}

fn bench_iter(c: &mut Criterion) {
    c.bench_function("robinhood_hashmap_iter_10k", |b| {
        let mut m = RobinHoodMap::new();
        for (i, x) in lcg(17).take(10_000).enumerate() {
            m.insert(key(x), i as u64);
        }
        b.iter(|| {
            let sum: u64 = m.iter().map(|(_, v)| *v).sum();
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_remove_insert_churn, bench_iter
}
criterion_main!(benches);
