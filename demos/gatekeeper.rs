/// Gatekeeper example — a graph built in code, driven by a host that
/// answers external signals and writes store variables.
///
/// The host plays the part of a password prompt: each time the session
/// waits for a signal it writes `password` and sends a continue. A splitter
/// then routes on the stored value.
///
/// Run with: cargo run --example gatekeeper

use dialogue_graph::core::config::SessionConfig;
use dialogue_graph::core::session::{Input, Session, SessionEvent, SessionState};
use dialogue_graph::schema::condition::{ComparisonOp, Condition};
use dialogue_graph::schema::graph::Graph;
use dialogue_graph::schema::node::{
    Choice, DialogueNode, InterruptNode, Node, Speaker, SplitterBranch, SplitterNode,
};
use dialogue_graph::schema::resolved::Resolved;
use dialogue_graph::schema::value::{Color, NodeId, Value, VariableTemplate};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

fn main() {
    let graph = build_graph();
    for issue in graph.lint() {
        println!("lint: {}", issue);
    }

    let config = SessionConfig {
        auto_advance_delay: 0.6,
        ..Default::default()
    };
    let mut session = Session::builder()
        .with_graph(graph)
        .with_config(config)
        .build()
        .expect("Failed to build session");

    println!("=== The North Gate ===\n");
    session.start();
    session.set_auto_advance(true);

    let guesses = ["open sesame", "mellon"];
    let mut attempts = 0;
    let mut frames = 0u32;

    while session.state() != SessionState::Idle && frames < 60 * 60 {
        session.tick(FRAME);
        frames += 1;

        for event in session.drain_events() {
            report(&event);
        }

        match session.state() {
            SessionState::AwaitingSignal if !session.is_typing() => {
                let guess = guesses[attempts.min(guesses.len() - 1)];
                attempts += 1;
                println!("   (the traveller whispers \"{}\")", guess);
                session.set_variable("password", guess.to_string());
                session.set_variable("attempts", attempts as i64);
                session.handle_input(Input::ExternalContinue);
            }
            SessionState::Holding => {
                println!("   (the gate animation plays)");
                session.handle_input(Input::ResumeRequested);
            }
            SessionState::Running if !session.choices().is_empty() && !session.is_typing() => {
                session.handle_input(Input::ChoiceSelected(0));
            }
            _ => {}
        }
    }

    for event in session.drain_events() {
        report(&event);
    }
    println!("\n=== {} attempt(s) ===", attempts);
}

// --- Graph construction ---

fn say(id: &str, speaker: Option<&str>, text: &str, next: Option<&str>) -> DialogueNode {
    DialogueNode {
        id: id.into(),
        next: next.map(NodeId::from),
        text: text.to_string(),
        speakers: speaker.map(Speaker::talking).into_iter().collect(),
        ..Default::default()
    }
}

fn build_graph() -> Graph {
    let mut halt = say("halt", Some("Gatekeeper"), "Halt! Who goes there?", None);
    halt.choices = vec![
        Choice::new("A friend.", Some("ask")),
        Choice::new("Nobody.", None),
    ];

    let mut ask = say("ask", Some("Gatekeeper"), "Then speak the password.", Some("judge"));
    ask.settings.await_continue = true;

    let judge = SplitterNode {
        id: "judge".into(),
        branches: vec![
            SplitterBranch {
                conditions: vec![Condition::string(
                    Resolved::bound("password", String::new()),
                    true,
                    Resolved::literal("mellon".to_string()),
                )],
                next: Some("open".into()),
            },
            SplitterBranch {
                conditions: vec![Condition::int(
                    Resolved::bound("attempts", 0),
                    ComparisonOp::GreaterOrEqual,
                    Resolved::literal(3),
                )],
                next: Some("turned_away".into()),
            },
        ],
        default: Some("wrong".into()),
    };

    let mut wrong = say("wrong", Some("Gatekeeper"), "Wrong. ", Some("ask"));
    wrong.settings.color = Resolved::literal(Color::rgb(0xB0, 0x30, 0x30));

    let mut open = say("open", None, "The bar lifts. ", Some("gate"));
    open.settings.sounds = Resolved::literal(vec!["gate_creak".to_string()]);
    let mut through = say("through", None, "You pass beneath the arch.", None);
    through.settings.keep_previous_text = true;

    let nodes = vec![
        Node::Dialogue(halt),
        Node::Dialogue(ask),
        Node::Splitter(judge),
        Node::Dialogue(wrong),
        Node::Dialogue(say(
            "turned_away",
            Some("Gatekeeper"),
            "Begone.",
            None,
        )),
        Node::Dialogue(open),
        Node::Interrupt(InterruptNode {
            id: "gate".into(),
            next: Some("through".into()),
        }),
        Node::Dialogue(through),
    ];

    Graph::from_nodes(Some("halt"), nodes).with_variables(vec![
        VariableTemplate::new("password", Value::String(String::new())),
        VariableTemplate::new("attempts", Value::Int(0)),
    ])
}

// --- Output ---

fn report(event: &SessionEvent) {
    match event {
        SessionEvent::NodeEntered(id) => println!("-> {}", id),
        SessionEvent::DialogueShown(frame) => {
            let who = frame.speakers.first().map_or("", String::as_str);
            println!("[{}] {}", who, frame.text);
            for choice in &frame.choices {
                println!("   {}. {}", choice.index + 1, choice.text);
            }
        }
        SessionEvent::ChoiceSelected { index, .. } => println!("   > choice {}", index + 1),
        SessionEvent::Held => println!("   -- held --"),
        SessionEvent::Resumed => println!("   -- resumed --"),
        SessionEvent::SessionEnded => println!("   -- end --"),
        _ => {}
    }
}
