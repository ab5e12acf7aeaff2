// tests/tables_handpicked.rs
// Hand-picked tests proving the scorers are driven by the tables, not by
// hardcoded lists: a substituted TOML changes tiers, weights, and the
// clustering threshold without touching scoring logic.

use source_credibility_analyzer::evaluator::evaluate_with_tables;
use source_credibility_analyzer::heuristics::HeuristicTables;
use source_credibility_analyzer::{Source, SourceBatch, SourceKind};

const TEST_TOML: &str = r#"
version = 7

[authority]
base = 0.4
author_bonus = 0.2

[[authority.tiers]]
id = "trusted_wiki"
score = 0.95
domains = ["example.org"]

[[authority.tiers]]
id = "link_farm"
score = 0.1
domains = ["spam.example"]

[recency]
unknown = 0.6
fallback = 0.2

[[recency.buckets]]
max_days = 10
score = 1.0

[bias]
base = 0.5
paper_base = 0.9
neutral_score = 0.95
neutral_domains = ["example.org"]
sensational_penalty = 0.3
sensational = ["unbelievable"]

[methodology]
base = 0.5
paper_base = 0.7
citation_bonus = 0.2
evidence_bonus = 0.1
hedging_penalty = 0.2
evidence = ["benchmark"]
hedging = ["rumor"]

[clustering]
jaccard_threshold = 0.9

[weights]
authority = 0.6
recency = 0.1
corroboration = 0.1
bias = 0.1
methodology = 0.1
"#;

fn tables() -> HeuristicTables {
    HeuristicTables::from_toml_str(TEST_TOML).expect("load test tables")
}

#[test]
fn substituted_tiers_drive_authority() {
    let batch = SourceBatch {
        query: "q".into(),
        web: vec![
            Source::new(SourceKind::Web, "some long article", "https://example.org/wiki/x"),
            Source::new(SourceKind::Web, "other piece entirely", "https://spam.example/y"),
            // arxiv is not in the substituted tier list, so base applies.
            Source::new(SourceKind::Web, "unlisted domain here", "https://arxiv.org/abs/1"),
        ],
        ..Default::default()
    };
    let report = evaluate_with_tables(&batch, &tables());
    assert!((report.sources[0].dimensions.authority - 0.95).abs() < 1e-6);
    assert!((report.sources[1].dimensions.authority - 0.1).abs() < 1e-6);
    assert!((report.sources[2].dimensions.authority - 0.4).abs() < 1e-6);
}

#[test]
fn substituted_keywords_drive_bias_and_methodology() {
    let batch = SourceBatch {
        query: "q".into(),
        web: vec![Source::new(
            SourceKind::Web,
            "Unbelievable benchmark results on widget throughput",
            "https://nowhere.example/post",
        )
        .with_snippet("A rumor-adjacent benchmark writeup.")],
        ..Default::default()
    };
    let report = evaluate_with_tables(&batch, &tables());
    let d = &report.sources[0].dimensions;
    // bias: 0.5 base − 0.3 "unbelievable"
    assert!((d.bias - 0.2).abs() < 1e-6);
    // methodology: 0.5 + 0.1 "benchmark" − 0.2 "rumor"
    assert!((d.methodology - 0.4).abs() < 1e-6);
}

#[test]
fn substituted_recency_defaults_apply() {
    let batch = SourceBatch {
        query: "q".into(),
        web: vec![Source::new(SourceKind::Web, "undated thing", "https://x.example")],
        ..Default::default()
    };
    let report = evaluate_with_tables(&batch, &tables());
    assert!((report.sources[0].dimensions.recency - 0.6).abs() < 1e-6);
}

#[test]
fn raised_threshold_disables_loose_clustering() {
    let batch = SourceBatch {
        query: "q".into(),
        web: vec![
            Source::new(SourceKind::Web, "OpenAI releases GPT-5 model", "https://a.example"),
            Source::new(SourceKind::Web, "GPT-5 model released by OpenAI", "https://b.example"),
        ],
        ..Default::default()
    };
    // ~0.57 overlap is below the substituted 0.9 threshold: no clusters,
    // both sources are treated as unconfirmed singletons.
    let report = evaluate_with_tables(&batch, &tables());
    assert_eq!(report.cross_validation.cross_reference_count, 0);
    for e in &report.sources {
        assert!((e.dimensions.corroboration - 0.3).abs() < 1e-6);
    }
}

#[test]
fn substituted_weights_drive_composite() {
    let batch = SourceBatch {
        query: "q".into(),
        web: vec![Source::new(SourceKind::Web, "plain title words", "https://example.org/a")],
        ..Default::default()
    };
    let report = evaluate_with_tables(&batch, &tables());
    let e = &report.sources[0];
    // authority 0.95 (trusted tier), recency 0.6 (unknown), corroboration
    // 0.3 (singleton), bias 0.95 (neutral domain), methodology 0.5 (base).
    let expect = 0.95 * 0.6 + 0.6 * 0.1 + 0.3 * 0.1 + 0.95 * 0.1 + 0.5 * 0.1;
    assert!(
        (e.composite_score - (expect * 1000.0_f32).round() / 1000.0).abs() < 1e-6,
        "composite {} vs expected {}",
        e.composite_score,
        expect
    );
}
