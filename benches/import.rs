//! Benchmarks for the surface importers.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use meshstitch::prelude::*;
use nalgebra::Point3;

fn grid_data(n: usize) -> SurfaceImportData {
    let mut data = SurfaceImportData::new("position");
    data.reserve((n + 1) * (n + 1), n * n * 2);

    // Create grid vertices
    for j in 0..=n {
        for i in 0..=n {
            data.add_vertex(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    // Create triangles
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            data.add_face(&[v00, v10, v11]);
            data.add_face(&[v00, v11, v01]);
        }
    }

    data
}

fn bench_cmap_import(c: &mut Criterion) {
    let data = grid_data(100);
    let options = ImportOptions::default();

    c.bench_function("cmap_import_grid_100x100", |b| {
        b.iter_batched(
            || data.clone(),
            |mut data| {
                let mut map: CMap2 = CMap2::new();
                import_surface_data(&mut map, &mut data, &options).unwrap();
                map
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_graph_import(c: &mut Criterion) {
    let data = grid_data(100);
    let options = ImportOptions::default();

    c.bench_function("graph_import_grid_100x100", |b| {
        b.iter_batched(
            || data.clone(),
            |mut data| {
                let mut graph: IncidenceGraph = IncidenceGraph::new();
                import_surface_graph(&mut graph, &mut data, &options).unwrap();
                graph
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_traversal(c: &mut Criterion) {
    let mut data = grid_data(50);
    let mut map: CMap2 = CMap2::new();
    import_surface_data(&mut map, &mut data, &ImportOptions::default()).unwrap();

    c.bench_function("vertex_darts_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for d in map.darts() {
                count += map.vertex_darts(d).count();
            }
            count
        });
    });
}

criterion_group!(benches, bench_cmap_import, bench_graph_import, bench_traversal);
criterion_main!(benches);
