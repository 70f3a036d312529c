use criterion::{criterion_group, criterion_main, Criterion};
use mandelbrot::{ImageSize, Renderer, Strategy};

fn renderer() -> Renderer {
    Renderer::for_size(ImageSize::new(400, 400).unwrap())
}

fn sequential(c: &mut Criterion) {
    let r = renderer();
    c.bench_function("sequential 400x400", move |b| {
        b.iter(|| r.render(Strategy::Sequential).unwrap())
    });
}

fn row_tasks(c: &mut Criterion) {
    let r = renderer();
    c.bench_function("row tasks 400x400", move |b| {
        b.iter(|| r.render(Strategy::RowTasks).unwrap())
    });
}

fn worker_pool(c: &mut Criterion) {
    let r = renderer();
    c.bench_function("worker pool 400x400", move |b| {
        b.iter(|| r.render(Strategy::pool()).unwrap())
    });
}

fn worker_scaling(c: &mut Criterion) {
    let r = renderer();
    c.bench_function_over_inputs(
        "worker pool scaling 400x400",
        move |b, &&workers| b.iter(|| r.render(Strategy::WorkerPool(workers)).unwrap()),
        &[1usize, 2, 4, 8],
    );
}

criterion_group!(benches, sequential, row_tasks, worker_pool, worker_scaling);
criterion_main!(benches);
