use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use hydrant::{EventKind, EventStream};

const BATCH_SIZES: &[usize] = &[64, 256, 1024];

async fn publish_batch(batch: usize) {
    let stream = EventStream::builder("bench")
        .sink_capacity(batch + 1)
        .build();
    let mut tap = stream.attach();

    for i in 0..batch {
        stream.info(format!("message-{i}"));
    }
    stream.info("batch-complete");

    // Scanning to the marker drains every line of the batch.
    tap.wait_for(
        EventKind::Info,
        "batch-complete",
        Duration::from_secs(10),
    )
    .await
    .expect("batch drained");
}

fn broadcast_throughput(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("broadcast_publish");

    for &batch in BATCH_SIZES {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &size| {
            b.to_async(&runtime).iter(|| publish_batch(size));
        });
    }

    group.finish();
}

criterion_group!(benches, broadcast_throughput);
criterion_main!(benches);
