//! Criterion benchmarks for ticket_transaction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use ticket_transaction::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

async fn purchase_store() -> Arc<SqliteStore> {
    let store = Arc::new(SqliteStore::new());
    store.connect(":memory:").await.expect("Failed to connect");
    schema::install(store.as_ref(), 5)
        .await
        .expect("Failed to install schema");
    store
}

// ============================================================================
// Purchase Benchmarks
// ============================================================================

fn bench_purchase(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("purchase");
    group.throughput(Throughput::Elements(1));

    for strategy in [ExecutionStrategy::Explicit, ExecutionStrategy::Managed] {
        let store = rt.block_on(purchase_store());
        let executor = build_executor(Arc::clone(&store), strategy, 10_000);

        // 3 tickets commits, 6 tickets hits the CHECK constraint and rolls back
        for quantity in [3i64, 6] {
            let request = PurchaseRequest::new("bench", quantity).expect("valid request");
            group.bench_with_input(
                BenchmarkId::new(strategy.to_str(), quantity),
                &request,
                |b, request| {
                    b.iter(|| rt.block_on(executor.execute(black_box(request))));
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Statement Construction Benchmarks
// ============================================================================

fn bench_statements(c: &mut Criterion) {
    let request = PurchaseRequest::new("cust01", 3).expect("valid request");

    c.bench_function("purchase_statements", |b| {
        b.iter(|| {
            let payment = schema::payment_statement(&black_box(&request).payment(10_000));
            let count = schema::ticket_count_statement(&black_box(&request).ticket_count());
            black_box((payment, count))
        });
    });
}

criterion_group!(benches, bench_purchase, bench_statements);
criterion_main!(benches);
