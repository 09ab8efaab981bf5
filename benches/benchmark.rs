use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recomb::prelude::*;

struct Rules {
    value: Parser,
}

// JSON風のリスト: [1,[2,3],[]]
fn nested_lists() -> (Parser, Environment) {
    let value = lookup("value", |env| env.get::<Rules>().map(|rules| rules.value.clone()));
    let number = regex("[0-9]+").unwrap();
    let list = delimited(string("["), separated_list(value, string(",")), string("]"));
    let grammar = alternative(vec![number, list]).unwrap();
    let env = Environment::new(Rules {
        value: grammar.clone(),
    });
    (grammar, env)
}

fn bench_nested_lists(c: &mut Criterion) {
    let (grammar, env) = nested_lists();
    let input = format!("[{}]", vec!["[1,[22,333],[]]"; 200].join(","));
    c.bench_function("nested lists", |b| {
        b.iter(|| grammar.parse_with(black_box(&input), &env))
    });
}

fn bench_alternative_failure(c: &mut Criterion) {
    let keywords: Vec<Parser> = ["let", "const", "fn", "struct", "enum", "impl", "trait"]
        .into_iter()
        .map(string)
        .collect();
    let keyword = alternative(keywords).unwrap();
    let statement = many(sequence(vec![keyword, regex(" [a-z]+;").unwrap()]));
    let input = format!("{}loop", "let x;fn y;".repeat(100));
    c.bench_function("furthest failure", |b| {
        b.iter(|| statement.parse(black_box(&input)))
    });
}

criterion_group!(benches, bench_nested_lists, bench_alternative_failure);
criterion_main!(benches);
