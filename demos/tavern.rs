/// Tavern example — plays `graph_data/tavern.ron` with a scripted host.
///
/// A greeting → a gated choice → a splitter on a flag → an interrupt the
/// host resumes → farewell.
///
/// Run with: cargo run --example tavern

use dialogue_graph::core::session::{Cue, Input, Session, SessionEvent, SessionState};
use std::time::Duration;

/// One simulated frame at 60 fps.
const FRAME: Duration = Duration::from_micros(16_667);

fn main() {
    let mut session = Session::builder()
        .graph_file("graph_data/tavern.ron")
        .config_file("graph_data/session.ron")
        .build()
        .expect("Failed to build session");

    for issue in session.graph().lint() {
        println!("lint: {}", issue);
    }

    println!("=== The Rusty Flagon ===\n");
    session.start();

    // The host's script: which choice to take, when to click, when to
    // release a hold. Everything else is driven by time.
    let mut frames = 0u32;
    while session.state() != SessionState::Idle && frames < 60 * 120 {
        session.tick(FRAME);
        frames += 1;

        for event in session.drain_events() {
            narrate(&event);
        }

        match session.state() {
            SessionState::Holding => {
                println!("   (the host plays a cutscene, then resumes)");
                session.handle_input(Input::ResumeRequested);
            }
            SessionState::Running if !session.is_typing() && !session.is_delaying() => {
                if let Some(choice) = session.choices().iter().find(|c| c.enabled && c.index == 0) {
                    println!("   > {}", choice.text);
                    session.handle_input(Input::ChoiceSelected(choice.index));
                } else if session.choices().is_empty() {
                    session.handle_input(Input::AdvanceRequested);
                }
            }
            _ => {}
        }
    }

    for event in session.drain_events() {
        narrate(&event);
    }
    println!(
        "\n=== Curtain ({:.2}s of simulated time) ===",
        session.now().as_secs_f64()
    );
}

fn narrate(event: &SessionEvent) {
    match event {
        SessionEvent::DialogueShown(frame) => {
            let who = if frame.speakers.is_empty() {
                "Narrator".to_string()
            } else {
                frame.speakers.join(" & ")
            };
            println!("[{}] {}", who, frame.text);
            for choice in frame.choices.iter().filter(|c| c.visible) {
                let note = if choice.enabled { "" } else { " (unavailable)" };
                println!("   {}. {}{}", choice.index + 1, choice.text, note);
            }
        }
        SessionEvent::Cue(Cue::StopSounds | Cue::ResetAudio) => {}
        SessionEvent::Cue(cue) => println!("   ~ {:?}", cue),
        SessionEvent::Held => println!("   -- held --"),
        SessionEvent::Stalled(id) => println!("   !! stalled at {}", id),
        SessionEvent::SessionEnded => println!("   -- end --"),
        _ => {}
    }
}
