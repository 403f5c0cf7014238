//! Benchmarks for compiled sorting programs.
//!
//! Measures:
//! - Compilation of each builtin network
//! - Reference-executor throughput against the scalar network and `sort_unstable`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sortgen::network::builtin;
use sortgen::{Compiler, LaneExecutor, SequenceTable};

const INPUT: [f32; 8] = [3.0, 1.0, 4.0, 1.5, 5.0, 9.0, 2.0, 6.0];

fn bench_compile(c: &mut Criterion) {
    let table = SequenceTable::build();
    let compiler = Compiler::new(&table);

    let mut group = c.benchmark_group("compile");
    for net in builtin() {
        group.bench_with_input(BenchmarkId::from_parameter(net.name()), &net, |b, net| {
            b.iter(|| black_box(compiler.compile(black_box(net))))
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let table = SequenceTable::build();
    let compiler = Compiler::new(&table);

    let mut group = c.benchmark_group("sort8");
    group.throughput(Throughput::Elements(8));

    for net in builtin() {
        let Ok(program) = compiler.compile(&net) else {
            continue;
        };
        let mut exec = LaneExecutor::new();
        group.bench_function(BenchmarkId::new("executor", net.name()), |b| {
            b.iter(|| {
                let mut data = black_box(INPUT);
                exec.run(&program, &mut data);
                black_box(data)
            })
        });
        group.bench_function(BenchmarkId::new("network", net.name()), |b| {
            b.iter(|| {
                let mut data = black_box(INPUT);
                net.apply(&mut data);
                black_box(data)
            })
        });
    }

    group.bench_function("sort_unstable_by", |b| {
        b.iter(|| {
            let mut data = black_box(INPUT);
            data.sort_unstable_by(f32::total_cmp);
            black_box(data)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_sort);
criterion_main!(benches);
