use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use spantree_engine::query::{Query, QueryGrammar};

fn nested_query(depth: usize) -> String {
    let mut q = String::from("a");
    for i in 0..depth {
        q = format!("!(x{i}|{q}){{1,3}} & ⟦lit {i}⟧?");
    }
    q
}

fn bench_grammar_construction(c: &mut Criterion) {
    c.bench_function("grammar_new", |b| {
        b.iter(|| black_box(QueryGrammar::new().unwrap()));
    });
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_compile");
    group.sample_size(20);

    let grammar = QueryGrammar::new().unwrap();
    for depth in [1, 8, 32] {
        let source = nested_query(depth);
        group.bench_function(format!("parse_depth_{depth}"), |b| {
            b.iter(|| black_box(grammar.parse(black_box(&source)).unwrap()));
        });
        group.bench_function(format!("compile_depth_{depth}"), |b| {
            b.iter(|| black_box(Query::compile_with(&grammar, black_box(&source)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_grammar_construction, bench_compile);
criterion_main!(benches);
