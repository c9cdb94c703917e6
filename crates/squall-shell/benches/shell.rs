//! Benchmarks for expression evaluation, completion, and lookup.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use squall_shell::interpreter::Registry;
use squall_shell::{complete, evaluate, register_builtins};

fn builtin_registry() -> Registry {
    let mut reg = Registry::new();
    register_builtins(&mut reg).unwrap();
    reg
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let cases = [
        ("int_chain", "1+2*3-4/2+5%3"),
        ("power_tower", "2**3**2+7"),
        ("nested_parens", "((((1+2)*(3+4))-5)*(6+7))%11"),
        ("float_mix", "3.5*2-1.25/0.5+2**0.5"),
    ];
    for (label, expr) in cases {
        group.bench_function(BenchmarkId::new("expr", label), |b| {
            b.iter(|| evaluate(expr));
        });
    }

    group.finish();
}

fn bench_complete(c: &mut Criterion) {
    let reg = builtin_registry();
    let mut group = c.benchmark_group("complete");

    let cases = [
        ("empty", ""),
        ("name_prefix", "c"),
        ("info_arg", "info ver"),
        ("arg_prefix", "greet alice t"),
    ];
    for (label, input) in cases {
        group.bench_function(BenchmarkId::new("input", label), |b| {
            b.iter(|| complete(&reg, input));
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let reg = builtin_registry();

    c.bench_function("resolve_name", |b| {
        b.iter(|| reg.resolve("DOWNLOAD"));
    });
    c.bench_function("resolve_alias", |b| {
        b.iter(|| reg.resolve_alias("dl"));
    });
}

criterion_group!(benches, bench_evaluate, bench_complete, bench_resolve);
criterion_main!(benches);
