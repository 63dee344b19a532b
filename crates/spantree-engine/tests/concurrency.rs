//! One grammar and one ontology, used from many threads at once.

use std::thread;

use pretty_assertions::assert_eq;
use spantree_engine::query::{Query, QueryGrammar};
use spantree_engine::{Discoveries, Node, Ontology, PatternRule, render_tree};

const QUERIES: [&str; 6] = [
    "a&b",
    "!a{2,3}|c",
    "(a|b)+",
    "!!(⟦x y⟧ | z_1)? & w",
    "((x))&((y|z)*)",
    "&a",
];

fn outcome(grammar: &QueryGrammar, source: &str) -> String {
    let tokens = grammar.parse(source).map(|t| render_tree(&t));
    let compiled = Query::compile_with(grammar, source).map(|q| q.to_string());
    format!("{tokens:?}\n{compiled:?}")
}

fn ontology() -> Ontology {
    Ontology::default()
        .with_rule(PatternRule::new(r"\d+", Some("number")).unwrap())
        .with_child(
            "words",
            Ontology::default()
                .with_rule(PatternRule::new("[a-z]+", Some("word")).unwrap())
                .with_child(
                    "long",
                    Ontology::default().with_rule(PatternRule::new("[a-z]{6,}", None).unwrap()),
                ),
        )
}

#[test]
fn shared_grammar_parses_the_same_on_every_thread() {
    let grammar = QueryGrammar::shared().unwrap();
    let expected: Vec<String> = QUERIES.iter().map(|q| outcome(grammar, q)).collect();

    let results: Vec<Vec<String>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| QUERIES.iter().map(|q| outcome(grammar, q)).collect::<Vec<_>>()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in results {
        assert_eq!(result, expected);
    }
}

#[test]
fn shared_grammar_is_one_instance() {
    let first = QueryGrammar::shared().unwrap();
    let addresses: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| std::ptr::from_ref(QueryGrammar::shared().unwrap()) as usize))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(addresses.iter().all(|&a| a == std::ptr::from_ref(first) as usize));
}

#[test]
fn ontology_discovers_the_same_on_every_thread() {
    let ontology = ontology();
    let inputs: Vec<Node> = ["alpha 12 beta", "x9 yy 300 lengthy", "", "((7))"]
        .into_iter()
        .map(|text| Node::new(text, None))
        .collect();
    let expected = ontology.discover(&inputs).unwrap();

    let results: Vec<Discoveries> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| ontology.discover(&inputs).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in results {
        assert_eq!(result.flatten(false), expected.flatten(false));
        assert_eq!(result.to_string(), expected.to_string());
    }
}

#[test]
fn oversized_queries_fail_cleanly_on_worker_threads() {
    let grammar = QueryGrammar::shared().unwrap();
    let sources = [
        "(".repeat(50_000),
        "⟦(".repeat(25_000),
        format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000)),
    ];

    thread::scope(|s| {
        for source in &sources {
            s.spawn(move || {
                // Parsing may succeed or report an error; it must not abort.
                let _ = grammar.parse(source);
                assert!(Query::compile_with(grammar, source).is_err());
            });
        }
    });
}
