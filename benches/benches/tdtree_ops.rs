// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_tdtree::{TdTree, TdTreeConfig};

/// 2023-11-14T22:13:20Z in epoch milliseconds.
const EPOCH_BASE: i64 = 1_700_000_000_000;
const DAY_MS: i64 = 86_400_000;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, bound: i64) -> i64 {
        (self.next_u64() % bound as u64) as i64
    }
}

/// Validity intervals spread over a year, each lasting up to a week.
fn gen_intervals(count: usize) -> Vec<(String, i64, i64)> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|i| {
            let start = EPOCH_BASE + rng.below(365 * DAY_MS);
            let end = start + rng.below(7 * DAY_MS);
            (format!("obj-{i}"), start, end)
        })
        .collect()
}

/// Many versions of a few objects, back to back.
fn gen_histories(objects: usize, versions: usize) -> Vec<(String, i64, i64)> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let mut out = Vec::with_capacity(objects * versions);
    for o in 0..objects {
        let mut start = EPOCH_BASE + rng.below(DAY_MS);
        for _ in 0..versions {
            let end = start + 1 + rng.below(DAY_MS);
            out.push((format!("obj-{o}"), start, end));
            start = end;
        }
    }
    out
}

fn filled(records: &[(String, i64, i64)], block_size: usize) -> TdTree<u32> {
    let config = TdTreeConfig::default().with_block_size(block_size);
    let mut tree = TdTree::with_config(config).unwrap();
    for (i, (id, start, end)) in records.iter().enumerate() {
        tree.insert_value(id, *start, *end, i as u32).unwrap();
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[1_000usize, 10_000] {
        let records = gen_intervals(n);
        group.throughput(Throughput::Elements(n as u64));
        for &block_size in &[16usize, 64, 256] {
            group.bench_function(format!("n{n}_block{block_size}"), |b| {
                b.iter_batched(
                    || records.clone(),
                    |records| black_box(filled(&records, block_size)),
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_value");
    let records = gen_intervals(10_000);
    for &block_size in &[16usize, 64, 256] {
        let tree = filled(&records, block_size);
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_function(format!("midpoints_block{block_size}"), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for (id, start, end) in &records {
                    if tree.get_value(id, start + (end - start) / 2).is_some() {
                        hits += 1;
                    }
                }
                black_box(hits)
            })
        });
    }
    let histories = gen_histories(100, 100);
    let tree = filled(&histories, 64);
    group.bench_function("histories_block64", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for (id, start, _) in &histories {
                if tree.get_value(id, *start).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    let records = gen_intervals(10_000);
    group.bench_function("after_deleting_a_third", |b| {
        b.iter_batched(
            || {
                let mut tree = filled(&records, 64);
                for (id, start, _) in records.iter().step_by(3) {
                    tree.delete_value(id, *start);
                }
                tree
            },
            |mut tree| {
                tree.rebuild_index();
                black_box(tree.calculate_fragmentation())
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_rebuild);
criterion_main!(benches);
