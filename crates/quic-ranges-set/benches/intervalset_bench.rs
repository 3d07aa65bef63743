// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{
    BatchSize, BenchmarkGroup, Criterion, Throughput, criterion_group, criterion_main,
    measurement::WallTime,
};
use quic_ranges_core::interval::Interval;
use quic_ranges_set::IntervalSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

#[inline]
fn iv(a: u64, b: u64) -> Interval<u64> {
    Interval::new(a, b)
}

fn gen_intervals(universe: u64, max_len: u64, n: usize, rng: &mut impl Rng) -> Vec<Interval<u64>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let a = rng.random_range(0..universe);
        let len = rng.random_range(1..=max_len);
        out.push(iv(a, (a + len).min(universe)));
    }
    out
}

fn gen_sequential_intervals(stride: u64, max_gap: u64, n: usize, rng: &mut impl Rng) -> Vec<Interval<u64>> {
    let mut out = Vec::with_capacity(n);
    let mut cursor = 0u64;
    for _ in 0..n {
        // mostly contiguous, with occasional holes
        let gap = if rng.random_range(0..10u8) == 0 {
            rng.random_range(1..=max_gap)
        } else {
            0
        };
        let start = cursor + gap;
        let end = start + rng.random_range(1..=stride);
        out.push(iv(start, end));
        cursor = end;
    }
    out
}

fn prepare_set(intervals: &[Interval<u64>]) -> IntervalSet<u64> {
    let mut set = IntervalSet::new();
    for &interval in intervals {
        set.add(interval);
    }
    set
}

fn register_add(group: &mut BenchmarkGroup<'_, WallTime>, universe: u64, n: usize) {
    group.throughput(Throughput::Elements(n as u64));

    let mut rng = ChaCha8Rng::seed_from_u64(0xA11C_EDEA_DBEE_F000);
    let random = gen_intervals(universe, 128, n, &mut rng);
    let sequential = gen_sequential_intervals(64, 256, n, &mut rng);

    group.bench_function("add/random", |b| {
        b.iter_batched(
            IntervalSet::new,
            |mut set| {
                for &interval in &random {
                    set.add(interval);
                }
                black_box(set);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("append/sequential", |b| {
        b.iter_batched(
            IntervalSet::new,
            |mut set| {
                for &interval in &sequential {
                    set.append(interval);
                }
                black_box(set);
            },
            BatchSize::SmallInput,
        )
    });
}

fn register_set_algebra(group: &mut BenchmarkGroup<'_, WallTime>, universe: u64, n: usize) {
    group.throughput(Throughput::Elements(n as u64));

    let mut rng = ChaCha8Rng::seed_from_u64(0xFEED_FACE_CAFE_BABE);
    let a = prepare_set(&gen_intervals(universe, 64, n, &mut rng));
    let b = prepare_set(&gen_intervals(universe, 64, n, &mut rng));

    group.bench_function("union", |bench| {
        bench.iter_batched(
            || a.clone(),
            |mut lhs| {
                lhs.union(&b);
                black_box(lhs);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("intersection", |bench| {
        bench.iter_batched(
            || a.clone(),
            |mut lhs| {
                lhs.intersection(&b);
                black_box(lhs);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("difference", |bench| {
        bench.iter_batched(
            || a.clone(),
            |mut lhs| {
                lhs.difference(&b);
                black_box(lhs);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("complement", |bench| {
        bench.iter_batched(
            || a.clone(),
            |mut lhs| {
                lhs.complement(iv(0, universe));
                black_box(lhs);
            },
            BatchSize::SmallInput,
        )
    });
}

fn register_probes(group: &mut BenchmarkGroup<'_, WallTime>, universe: u64, n: usize, probes: usize) {
    group.throughput(Throughput::Elements(probes as u64));

    let mut rng = ChaCha8Rng::seed_from_u64(0x0DDB_A11B_EEFC_A4E5);
    let set = prepare_set(&gen_intervals(universe, 64, n, &mut rng));
    let values: Vec<u64> = (0..probes).map(|_| rng.random_range(0..universe)).collect();
    let queries = gen_intervals(universe, 64, probes, &mut rng);

    group.bench_function("contains/value", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for &value in &values {
                if set.contains(value) {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });

    group.bench_function("find/value", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for &value in &values {
                if set.find(value).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });

    group.bench_function("is_disjoint/interval", |b| {
        b.iter(|| {
            let mut disjoint = 0usize;
            for &query in &queries {
                if set.is_disjoint(query) {
                    disjoint += 1;
                }
            }
            black_box(disjoint)
        })
    });
}

fn intervalset_benches(c: &mut Criterion) {
    const UNIVERSE: u64 = 1 << 20;
    const N: usize = 4_096;
    const PROBES: usize = 8_192;

    let mut group = c.benchmark_group("intervalset/build");
    register_add(&mut group, UNIVERSE, N);
    group.finish();

    let mut group = c.benchmark_group("intervalset/algebra");
    register_set_algebra(&mut group, UNIVERSE, N);
    group.finish();

    let mut group = c.benchmark_group("intervalset/probes");
    register_probes(&mut group, UNIVERSE, N, PROBES);
    group.finish();
}

criterion_group!(benches, intervalset_benches);
criterion_main!(benches);
