//! # Materialization Benchmarks
//!
//! Throughput of record construction and field path resolution.
//!
//! Run with: `cargo bench -p graphql-nodes-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use graphql_nodes_core::{FieldPath, NodeMaterializer, TypeConfiguration};
use serde_json::{Map, Value, json};
use std::hint::black_box;

/// A post with `size` comments, each carrying an author object.
fn create_post(size: usize) -> Value {
    let comments: Vec<Value> = (0..size)
        .map(|i| json!({"id": i, "author": {"handle": format!("user-{i}")}, "body": "lorem ipsum"}))
        .collect();
    json!({"slug": "hello-world", "title": "Hello", "comments": comments})
}

/// Nest `value` under `depth` alternating object/list levels.
fn create_deep(depth: usize) -> (Value, FieldPath) {
    let mut value = json!("leaf");
    let mut segments = Vec::with_capacity(depth);
    for i in (0..depth).rev() {
        let name = format!("f{i}");
        let mut level = Map::new();
        level.insert(name.clone(), value);
        value = Value::Array(vec![Value::Object(level)]);
        segments.push(name);
    }
    segments.reverse();
    let path = FieldPath::from_segments(segments).expect("path");
    (value, path)
}

fn bench_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize");
    let materializer = NodeMaterializer::default();
    let with_id = TypeConfiguration::new().with_id_field("slug");
    let without_id = TypeConfiguration::new();

    for size in [1, 10, 100, 1000] {
        let post = create_post(size);

        group.bench_with_input(BenchmarkId::new("id_field", size), &post, |b, post| {
            b.iter(|| {
                materializer
                    .materialize(black_box(post.clone()), &with_id, "Post")
                    .expect("materialize")
            });
        });

        group.bench_with_input(BenchmarkId::new("digest_identity", size), &post, |b, post| {
            b.iter(|| {
                materializer
                    .materialize(black_box(post.clone()), &without_id, "Post")
                    .expect("materialize")
            });
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for depth in [1, 8, 64] {
        let (value, path) = create_deep(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &value, |b, value| {
            b.iter(|| path.resolve(black_box(value)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_materialize, bench_resolve);
criterion_main!(benches);
