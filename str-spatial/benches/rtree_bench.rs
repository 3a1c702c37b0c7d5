//! StrRTree benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use str_spatial::{IndexConfig, Point, Polygon, Rectangle, Shape, StrRTree};

fn boxes(count: usize) -> Vec<Shape> {
    (0..count)
        .map(|i| {
            let x = (i % 100) as f64;
            let y = (i / 100) as f64;
            Shape::Rectangle(Rectangle::new(x, y, x + 1.0, y + 1.0))
        })
        .collect()
}

fn bench_bulk_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("StrRTree Bulk Load");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_with_setup(
                || boxes(size),
                |records| {
                    let (tree, _) = StrRTree::build(records, &IndexConfig::default()).unwrap();
                    black_box(tree.num_nodes())
                },
            );
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("StrRTree Query");

    let (tree, _) = StrRTree::build(boxes(10000), &IndexConfig::default()).unwrap();

    group.bench_function("window_10k", |b| {
        let query = Shape::Rectangle(Rectangle::new(25.0, 25.0, 75.0, 75.0));
        b.iter(|| black_box(tree.query(&query)));
    });

    group.bench_function("polygon_10k", |b| {
        let query = Shape::Polygon(
            Polygon::from_vertices(vec![
                Point::new(10.0, 10.0),
                Point::new(90.0, 20.0),
                Point::new(50.0, 50.0),
                Point::new(80.0, 90.0),
                Point::new(15.0, 70.0),
            ])
            .unwrap(),
        );
        b.iter(|| black_box(tree.query(&query)));
    });

    group.bench_function("byte_ranges_10k", |b| {
        let query = Shape::Rectangle(Rectangle::new(25.0, 25.0, 75.0, 75.0));
        b.iter(|| black_box(tree.query_byte_ranges(&query)));
    });

    group.finish();
}

criterion_group!(benches, bench_bulk_load, bench_query);
criterion_main!(benches);
