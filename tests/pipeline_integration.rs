//! Integration tests for the simplifier pipeline with the built-in routines

use std::fs;
use vbsimplifier::vbs::config::load_defaults;
use vbsimplifier::vbs::routines::{RoutineRegistry, RESOLVE, STRINGS};
use vbsimplifier::vbs::{History, Phase, Simplifier, TokenKind, VbsError};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/dropper.vbs");

/// A simplifier over the fixture with the configured default routines.
fn default_simplifier(registry: &RoutineRegistry) -> Simplifier {
    let config = load_defaults().unwrap();
    let mut simplifier = Simplifier::from_path(FIXTURE).unwrap();
    for name in &config.pipeline.routines {
        simplifier.register(registry.get(name).unwrap());
    }
    simplifier
}

#[test]
fn test_default_routines_simplify_fixture() {
    let registry = RoutineRegistry::with_defaults(64).unwrap();
    let mut simplifier = default_simplifier(&registry);
    simplifier.run(Phase::LINES).unwrap();

    insta::assert_debug_snapshot!(simplifier.code(), @r###"
[
    "Dim url",
    "url = \"http://example.com\"",
    "port = 4043",
    "delay = 55",
    "payload = \"POWERshell -nop\"",
    "Sub Run(cmd)",
    "\tIf port > 4000 Then",
    "\t\tshell = Chr(65) & \"cmd\"",
    "\tEnd If",
    "End Sub",
]
"###);

    // Root, comments, concatenate, math, string functions and the final
    // concatenate. The second math pass changes nothing and is not recorded.
    assert_eq!(simplifier.history().len(), 6);
}

#[test]
fn test_rerunning_adds_no_iterations() {
    let registry = RoutineRegistry::with_defaults(64).unwrap();
    let mut simplifier = default_simplifier(&registry);
    simplifier.run(Phase::LINES).unwrap();
    let iterations = simplifier.history().len();
    let code = simplifier.code();

    simplifier.run(Phase::LINES).unwrap();
    assert_eq!(simplifier.history().len(), iterations);
    assert_eq!(simplifier.code(), code);
}

#[test]
fn test_lineage_is_a_chain_back_to_the_root() {
    let registry = RoutineRegistry::with_defaults(64).unwrap();
    let mut simplifier = default_simplifier(&registry);
    simplifier.run(Phase::LINES).unwrap();

    let history = simplifier.history();
    let mut id = history.active_id().unwrap();
    let mut hops = 0;
    while let Some(parent) = history.get(id).unwrap().parent() {
        assert!(history.get(parent).unwrap().children().contains(&id));
        id = parent;
        hops += 1;
    }
    assert_eq!(id, 0);
    assert_eq!(hops, history.len() - 1);
}

#[test]
fn test_string_report_after_simplification() {
    let registry = RoutineRegistry::with_defaults(64).unwrap();
    let mut simplifier = default_simplifier(&registry);
    simplifier.run(Phase::LINES).unwrap();
    let before = simplifier.history().len();

    simplifier.register_and_run(registry.get(STRINGS).unwrap()).unwrap();
    assert_eq!(simplifier.history().len(), before);

    let strings: Vec<String> = registry
        .report()
        .of_kind(TokenKind::String)
        .into_iter()
        .map(|entry| entry.to_string())
        .collect();
    assert_eq!(
        strings,
        vec![
            "1 | \"http://example.com\"",
            "4 | \"POWERshell -nop\"",
            "7 | \"cmd\"",
        ]
    );
}

#[test]
fn test_resolver_substitutes_constants() {
    let registry = RoutineRegistry::with_defaults(64).unwrap();
    let mut simplifier = Simplifier::from_lines(&[
        "key = \"secret\"",
        "Sub Go(key)",
        "MsgBox key",
        "End Sub",
        "MsgBox key",
    ])
    .unwrap();
    simplifier.register(registry.get(RESOLVE).unwrap());
    simplifier.run(Phase::MULTILINE).unwrap();

    insta::assert_debug_snapshot!(simplifier.code(), @r###"
[
    "key = \"secret\"",
    "Sub Go(key)",
    "\tMsgBox key",
    "End Sub",
    "MsgBox \"secret\"",
]
"###);
}

#[test]
fn test_dump_and_history_files() {
    let dir = tempfile::tempdir().unwrap();
    let registry = RoutineRegistry::with_defaults(64).unwrap();
    let mut simplifier = default_simplifier(&registry);
    simplifier.run(Phase::LINES).unwrap();

    let out = dir.path().join("out.vbs");
    simplifier.dump_to_path(&out, true).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("0 | Dim url\n1 | url = \"http://example.com\"\n"));
    assert_eq!(written.lines().count(), 10);

    let json = dir.path().join("history.json");
    fs::write(&json, simplifier.history().to_json().unwrap()).unwrap();
    let restored = History::from_json(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(restored.len(), simplifier.history().len());
    assert_eq!(restored.code(), simplifier.code());

    let yaml = simplifier.history().to_yaml().unwrap();
    let restored = History::from_yaml(&yaml).unwrap();
    assert_eq!(restored.active_id(), simplifier.history().active_id());
}

#[test]
fn test_missing_input_file_is_an_io_error() {
    let err = Simplifier::from_path("/nonexistent/input.vbs").unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, VbsError::Io(_)));
}
