// Copyright The Ebus Authors
// SPDX-License-Identifier: Apache-2.0

//! Criterion benchmarks for the MPSC ring against a flume bounded channel.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ebus_engine::MpscRing;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

const BATCH: u64 = 1024;
const CAPACITY: usize = 4096;

/// Single-threaded push/pop cycles: the floor for hand-off cost.
fn bench_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_uncontended");
    let _ = group.throughput(Throughput::Elements(BATCH));

    let _ = group.bench_function("mpsc_ring", |b| {
        let ring = MpscRing::with_capacity(CAPACITY);
        b.iter(|| {
            for i in 0..BATCH {
                ring.push(black_box(i)).expect("ring should have space");
            }
            for _ in 0..BATCH {
                let _ = black_box(ring.pop());
            }
        });
    });

    let _ = group.bench_function("flume_bounded", |b| {
        let (tx, rx) = flume::bounded::<u64>(CAPACITY);
        b.iter(|| {
            for i in 0..BATCH {
                tx.try_send(black_box(i)).expect("channel should have space");
            }
            for _ in 0..BATCH {
                let _ = black_box(rx.try_recv().expect("channel should have data"));
            }
        });
    });

    group.finish();
}

/// Producer threads race on the CAS while the bench thread drains.
fn bench_contended(c: &mut Criterion) {
    const PER_PRODUCER: u64 = 8192;

    let mut group = c.benchmark_group("ring_contended");
    for producers in [2u64, 4] {
        let _ = group.throughput(Throughput::Elements(producers * PER_PRODUCER));

        let _ = group.bench_with_input(
            BenchmarkId::new("mpsc_ring", producers),
            &producers,
            |b, &producers| {
                b.iter(|| {
                    let ring = Arc::new(MpscRing::with_capacity(CAPACITY));
                    let handles: Vec<_> = (0..producers)
                        .map(|p| {
                            let ring = Arc::clone(&ring);
                            thread::spawn(move || {
                                for i in 0..PER_PRODUCER {
                                    let mut value = p * PER_PRODUCER + i;
                                    loop {
                                        match ring.push(value) {
                                            Ok(()) => break,
                                            Err(back) => {
                                                value = back;
                                                std::hint::spin_loop();
                                            }
                                        }
                                    }
                                }
                            })
                        })
                        .collect();

                    let mut drained = 0;
                    while drained < producers * PER_PRODUCER {
                        if let Some(value) = ring.pop() {
                            let _ = black_box(value);
                            drained += 1;
                        }
                    }
                    for handle in handles {
                        handle.join().expect("producer thread panicked");
                    }
                });
            },
        );

        let _ = group.bench_with_input(
            BenchmarkId::new("flume_bounded", producers),
            &producers,
            |b, &producers| {
                b.iter(|| {
                    let (tx, rx) = flume::bounded::<u64>(CAPACITY);
                    let handles: Vec<_> = (0..producers)
                        .map(|p| {
                            let tx = tx.clone();
                            thread::spawn(move || {
                                for i in 0..PER_PRODUCER {
                                    tx.send(p * PER_PRODUCER + i).expect("channel open");
                                }
                            })
                        })
                        .collect();
                    drop(tx);

                    let mut drained = 0;
                    while drained < producers * PER_PRODUCER {
                        if let Ok(value) = rx.recv() {
                            let _ = black_box(value);
                            drained += 1;
                        }
                    }
                    for handle in handles {
                        handle.join().expect("producer thread panicked");
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_uncontended, bench_contended);
criterion_main!(benches);
