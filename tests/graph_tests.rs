/// Graph integration tests — loading authored RON graphs and linting them.

use dialogue_graph::core::store::VariableStore;
use dialogue_graph::schema::graph::{Graph, GraphIssue};
use dialogue_graph::schema::node::Node;
use dialogue_graph::schema::value::{BoxTransition, Color, NodeId, Value};
use std::path::Path;

#[test]
fn tavern_graph_loads_and_lints_clean() {
    let graph = Graph::load_from_ron(Path::new("graph_data/tavern.ron")).unwrap();

    assert_eq!(graph.entry, Some(NodeId::from("greet")));
    assert_eq!(graph.len(), 8);
    assert!(graph.settings.allow_escape);
    assert_eq!(graph.settings.box_transition, BoxTransition::FadeIn);
    assert_eq!(graph.variables.len(), 4);

    let issues = graph.lint();
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

#[test]
fn tavern_fields_parse_with_their_types() {
    let graph = Graph::load_from_ron(Path::new("graph_data/tavern.ron")).unwrap();
    let store = VariableStore::from_template(&graph.variables);

    let greet = graph.dialogue("greet").unwrap();
    // Bound to a Float variable, so the store wins over the literal.
    assert_eq!(greet.settings.print_speed.resolve(&store), 0.03);
    assert_eq!(
        greet.settings.music_queue.resolve_active(&store),
        Some(vec!["lute_loop".to_string(), "crowd_murmur".to_string()])
    );

    let ale = graph.dialogue("ale").unwrap();
    assert_eq!(
        ale.settings.color.resolve_active(&store),
        Some(Color::rgb(0xC8, 0xA0, 0x40))
    );

    let ask = graph.dialogue("ask").unwrap();
    assert_eq!(ask.choices.len(), 3);
    assert!(ask.choices[2].next.is_none());

    assert!(matches!(graph.node("pause"), Some(Node::Interrupt(_))));
    assert!(matches!(graph.node("check"), Some(Node::Splitter(_))));
}

#[test]
fn broken_graph_lint_report() {
    let graph = Graph::load_from_ron(Path::new("tests/fixtures/broken.ron")).unwrap();
    let issues = graph.lint();

    assert!(issues.contains(&GraphIssue::DanglingTarget {
        from: NodeId::from("start"),
        target: NodeId::from("missing"),
    }));
    assert!(issues.contains(&GraphIssue::SplitterWithoutDefault(NodeId::from("fork"))));
    assert!(issues.contains(&GraphIssue::UndeclaredVariable {
        node: NodeId::from("start"),
        name: "loud".to_string(),
    }));
    assert!(issues.contains(&GraphIssue::Unreachable(NodeId::from("fork"))));
    assert!(issues.contains(&GraphIssue::Unreachable(NodeId::from("orphan"))));
    // Nothing here prevents a session from starting.
    assert!(issues.iter().all(|i| !i.is_error()));
}

#[test]
fn missing_entry_is_a_lint_error() {
    let graph = Graph::parse_ron(r#"(nodes: [Dialogue((id: "A", text: "Hi"))])"#).unwrap();
    let issues = graph.lint();
    assert!(issues.contains(&GraphIssue::MissingEntry));
    assert!(issues.iter().any(GraphIssue::is_error));
}

#[test]
fn scenario_fixture_seeds_store() {
    let graph = Graph::load_from_ron(Path::new("tests/fixtures/scenario.ron")).unwrap();
    let store = VariableStore::from_template(&graph.variables);
    assert_eq!(store.value("score"), Some(&Value::Int(5)));
    assert_eq!(store.get::<i64>("score"), Some(5));
    assert_eq!(store.get::<bool>("score"), None);
}

#[test]
fn saved_graph_reloads() {
    let graph = Graph::load_from_ron(Path::new("graph_data/tavern.ron")).unwrap();
    let text = graph.to_ron().unwrap();
    let back = Graph::parse_ron(&text).unwrap();

    assert_eq!(back.len(), graph.len());
    assert_eq!(back.entry, graph.entry);
    assert_eq!(back.settings, graph.settings);
    assert_eq!(back.node("ask"), graph.node("ask"));
}

#[test]
fn malformed_ron_is_an_error() {
    assert!(Graph::parse_ron("(nodes: [Dialogue((text: \"no id\"))])").is_err());
    assert!(Graph::load_from_ron(Path::new("tests/fixtures/does_not_exist.ron")).is_err());
}
