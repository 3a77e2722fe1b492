//! Benchmarks for debouncing and rate limiting

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::{Duration, Instant};
use timing::{debounce, RateLimiter};

fn bench_debounce_call(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .expect("failed to build runtime");
    let _guard = runtime.enter();

    let debounced = debounce(|x: u64| black_box(x), Duration::from_secs(3600))
        .expect("runtime is entered");

    c.bench_function("debounce_call_reschedule", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i = i.wrapping_add(1);
            debounced.call(black_box(i));
        });
    });
}

fn bench_rate_limiter(c: &mut Criterion) {
    let limiter = RateLimiter::new(1_000_000.0, 1_000_000).expect("valid parameters");
    let keyed = RateLimiter::new(1_000_000.0, 1_000_000).expect("valid parameters");
    let now = Instant::now();

    c.bench_function("rate_limit_single_key", |b| {
        b.iter(|| black_box(limiter.allow_at(&"client", now)));
    });

    c.bench_function("rate_limit_many_keys", |b| {
        let mut key = 0u32;
        b.iter(|| {
            key = (key + 1) % 1024;
            black_box(keyed.allow_at(&key, now))
        });
    });
}

criterion_group!(benches, bench_debounce_call, bench_rate_limiter);
criterion_main!(benches);
