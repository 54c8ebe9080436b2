//! Benchmarks for reconciling chip reports
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tablewatch::store::{SensorReading, Store, UnknownSensorPolicy};

fn create_readings(count: usize, occupied: bool) -> Vec<SensorReading> {
    (0..count)
        .map(|i| SensorReading::new(format!("chair-{}", i + 1), occupied ^ (i % 2 == 0)))
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [6, 64] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("create_chip_{}", size), |b| {
            let store = Store::open_in_memory().unwrap();
            let readings = create_readings(size, true);
            let mut n = 0u64;

            b.iter(|| {
                n += 1;
                store
                    .reconcile(
                        &format!("esp32-{}", n),
                        black_box(&readings),
                        UnknownSensorPolicy::Create,
                    )
                    .unwrap()
            })
        });

        group.bench_function(format!("update_chip_{}", size), |b| {
            let store = Store::open_in_memory().unwrap();
            let on = create_readings(size, true);
            let off = create_readings(size, false);
            store
                .reconcile("esp32-1", &on, UnknownSensorPolicy::Reject)
                .unwrap();
            let mut flip = false;

            b.iter(|| {
                flip = !flip;
                let readings = if flip { &off } else { &on };
                store
                    .reconcile("esp32-1", black_box(readings), UnknownSensorPolicy::Reject)
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let store = Store::open_in_memory().unwrap();
    for chip in 0..50 {
        store
            .reconcile(
                &format!("esp32-{}", chip),
                &create_readings(6, chip % 2 == 0),
                UnknownSensorPolicy::Create,
            )
            .unwrap();
    }

    c.bench_function("list_chips_50x6", |b| {
        b.iter(|| black_box(store.list_chips().unwrap()))
    });
}

criterion_group!(benches, bench_reconcile, bench_list);
criterion_main!(benches);
