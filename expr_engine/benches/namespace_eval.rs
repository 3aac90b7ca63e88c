//! Benchmarks for parsing and evaluating through the full Namespace
//! stack: a cold parse+attach, a memoized re-fetch, and a forward-
//! referencing dependency chain.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use expr_engine::Namespace;

fn define_and_fetch(c: &mut Criterion) {
    c.bench_function("define_and_value_arithmetic", |b| {
        b.iter(|| {
            let mut ns = Namespace::new(true);
            let vref = ns.define(black_box("(-2)^-(3+4) * 5 % 6 / (7 // 0.03)")).unwrap();
            black_box(ns.value(vref).unwrap());
        })
    });
}

fn memoized_refetch(c: &mut Criterion) {
    let mut ns = Namespace::new(true);
    let vref = ns.define("x: 2 + 3 * 4 - 5 / 6").unwrap();
    ns.value(vref).unwrap();

    c.bench_function("memoized_value_refetch", |b| {
        b.iter(|| black_box(ns.value(black_box(vref)).unwrap()))
    });
}

fn dependency_chain(c: &mut Criterion) {
    c.bench_function("ten_variable_dependency_chain", |b| {
        b.iter(|| {
            let mut ns = Namespace::new(true);
            ns.define("v0: 1").unwrap();
            for i in 1..10 {
                ns.define(&format!("v{i}: v{prev} + 1", prev = i - 1)).unwrap();
            }
            let last = ns.get("v9").unwrap();
            black_box(ns.value(last).unwrap());
        })
    });
}

fn user_function_call(c: &mut Criterion) {
    c.bench_function("user_function_call", |b| {
        b.iter(|| {
            let mut ns = Namespace::new(true);
            ns.define("f(x): x^3 - sqrt(x)").unwrap();
            let q = ns.define("q: f(9)").unwrap();
            black_box(ns.value(q).unwrap());
        })
    });
}

criterion_group!(
    benches,
    define_and_fetch,
    memoized_refetch,
    dependency_chain,
    user_function_call
);
criterion_main!(benches);
