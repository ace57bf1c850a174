/// Preview — interactive terminal player for dialogue graphs.
///
/// Usage: preview <graph.ron> [--config <session.ron>]
///
/// Time only moves when asked to, so timing can be inspected step by step.
///
/// Commands:
///   start                 — (re)start the session
///   tick <ms>             — advance the clock
///   run                   — advance until the session needs input
///   click                 — advance request (skip / cut delay / next)
///   choose <n>            — select choice n
///   skip | interrupt | resume | continue | escape
///   ff <on|off>           — fast-forward toggle
///   auto <on|off>         — auto-advance toggle
///   set <var> <value>     — write a store variable
///   vars                  — list store variables
///   state                 — show session state
///   help                  — list commands
///   quit                  — exit

use dialogue_graph::core::session::{Input, Session, SessionEvent, SessionState};
use dialogue_graph::schema::value::VariableKind;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Step size and ceiling for `run`.
const RUN_STEP: Duration = Duration::from_millis(10);
const RUN_LIMIT: Duration = Duration::from_secs(120);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut builder = Session::builder().graph_file(&args[1]);
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                builder = builder.config_file(&args[i]);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut session = match builder.build() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Loaded graph: {} nodes, {} variables",
        session.graph().len(),
        session.store().len()
    );
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        let accepted = match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
                continue;
            }
            "start" => {
                session.start();
                true
            }
            "tick" => {
                let Some(ms) = parts.get(1).and_then(|s| s.parse::<u64>().ok()) else {
                    println!("Usage: tick <ms>");
                    continue;
                };
                session.tick(Duration::from_millis(ms));
                true
            }
            "run" => {
                run_until_input(&mut session);
                true
            }
            "click" => session.handle_input(Input::AdvanceRequested),
            "choose" => {
                let Some(n) = parts.get(1).and_then(|s| s.parse::<usize>().ok()) else {
                    println!("Usage: choose <n>");
                    continue;
                };
                session.handle_input(Input::ChoiceSelected(n))
            }
            "skip" => session.handle_input(Input::SkipRequested),
            "interrupt" => session.handle_input(Input::InterruptRequested),
            "resume" => session.handle_input(Input::ResumeRequested),
            "continue" => session.handle_input(Input::ExternalContinue),
            "escape" => session.handle_input(Input::EscapeRequested),
            "ff" | "auto" => {
                let on = match parts.get(1).copied() {
                    Some("on") => true,
                    Some("off") => false,
                    _ => {
                        println!("Usage: {} <on|off>", cmd);
                        continue;
                    }
                };
                if cmd == "ff" {
                    session.set_fast_forward(on);
                } else {
                    session.set_auto_advance(on);
                }
                true
            }
            "set" => {
                if parts.len() < 3 {
                    println!("Usage: set <var> <value>");
                    continue;
                }
                set_variable(&mut session, parts[1], &parts[2..].join(" "))
            }
            "vars" => {
                for name in session.store().names() {
                    if let Some(value) = session.store().value(name) {
                        println!("  {} = {}", name, value);
                    }
                }
                continue;
            }
            "state" => {
                print_state(&session);
                continue;
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
                continue;
            }
        };

        if !accepted {
            println!("(ignored)");
        }
        print_events(&mut session);
    }
}

/// Tick until nothing is pending, the session holds, or it ends.
fn run_until_input(session: &mut Session) {
    let mut elapsed = Duration::ZERO;
    while elapsed < RUN_LIMIT && session.has_pending_work() {
        if session.state() == SessionState::Holding {
            return;
        }
        session.tick(RUN_STEP);
        elapsed += RUN_STEP;
    }
}

fn set_variable(session: &mut Session, name: &str, raw: &str) -> bool {
    let written = match session.store().kind_of(name) {
        Some(VariableKind::Bool) => raw.parse::<bool>().ok().map(|v| session.set_variable(name, v)),
        Some(VariableKind::Int) => raw.parse::<i64>().ok().map(|v| session.set_variable(name, v)),
        Some(VariableKind::Float) => raw.parse::<f64>().ok().map(|v| session.set_variable(name, v)),
        Some(VariableKind::String) => Some(session.set_variable(name, raw.to_string())),
        None => {
            println!("Unknown variable: {}", name);
            return false;
        }
    };
    written.unwrap_or_else(|| {
        println!("Could not parse '{}' for {}", raw, name);
        false
    })
}

fn print_events(session: &mut Session) {
    while let Some(event) = session.poll_event() {
        match event {
            SessionEvent::SessionStarted => println!("[session started]"),
            SessionEvent::SessionEnded => println!("[session ended]"),
            SessionEvent::NodeEntered(id) => println!("[node {}]", id),
            SessionEvent::DialogueShown(frame) => {
                if !frame.speakers.is_empty() {
                    println!("  {}:", frame.speakers.join(" & "));
                }
                for choice in frame.choices.iter().filter(|c| c.visible) {
                    let marker = if choice.enabled { " " } else { "x" };
                    println!("  [{}]{} {}", choice.index, marker, choice.text);
                }
            }
            SessionEvent::TextCleared => {}
            // Per-character frames are too noisy to print.
            SessionEvent::TextRevealed(_) => {}
            SessionEvent::TextCompleted { text, .. } => println!("  \"{}\"", text),
            SessionEvent::ChoiceSelected { index, .. } => println!("[chose {}]", index),
            SessionEvent::Held => println!("[held]"),
            SessionEvent::Resumed => println!("[resumed]"),
            SessionEvent::Stalled(id) => println!("[stalled at {}]", id),
            SessionEvent::Cue(cue) => println!("  cue: {:?}", cue),
        }
    }
    if session.is_typing() {
        println!("  ... \"{}\"", session.visible_text());
    }
}

fn print_state(session: &Session) {
    println!("State:        {:?}", session.state());
    println!(
        "Node:         {}",
        session.current_node().map_or("-", |id| id.as_str())
    );
    println!("Clock:        {:?}", session.now());
    println!("Typing:       {}", session.is_typing());
    println!("Delaying:     {}", session.is_delaying());
    println!("Fast-forward: {}", session.fast_forward());
    println!("Auto-advance: {}", session.auto_advance());
    println!("Print speed:  {}s", session.print_speed());
    println!("Visible:      \"{}\"", session.visible_text());
}

fn print_usage() {
    println!("Usage: preview <graph.ron> [--config <session.ron>]");
}

fn print_help() {
    println!("Commands:");
    println!("  start               (re)start the session");
    println!("  tick <ms>           advance the clock");
    println!("  run                 advance until the session needs input");
    println!("  click               advance request");
    println!("  choose <n>          select choice n");
    println!("  skip | interrupt | resume | continue | escape");
    println!("  ff <on|off>         fast-forward toggle");
    println!("  auto <on|off>       auto-advance toggle");
    println!("  set <var> <value>   write a store variable");
    println!("  vars                list store variables");
    println!("  state               show session state");
    println!("  quit                exit");
}
