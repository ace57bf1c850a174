//! WASM bindings for dialogue-graph — powers the browser preview.

use std::time::Duration;
use wasm_bindgen::prelude::*;

use dialogue_graph::core::config::SessionConfig;
use dialogue_graph::core::session::{Input, Session, SessionEvent};
use dialogue_graph::schema::graph::Graph;
use dialogue_graph::schema::value::VariableKind;

// ---------------------------------------------------------------------------
// Embedded graph data — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const TAVERN_GRAPH: &str = include_str!("../../graph_data/tavern.ron");
    pub const SESSION_CONFIG: &str = include_str!("../../graph_data/session.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputMessage {
    Advance,
    Choose { index: usize },
    Skip,
    Interrupt,
    Resume,
    Continue,
    Escape,
}

impl From<InputMessage> for Input {
    fn from(message: InputMessage) -> Self {
        match message {
            InputMessage::Advance => Input::AdvanceRequested,
            InputMessage::Choose { index } => Input::ChoiceSelected(index),
            InputMessage::Skip => Input::SkipRequested,
            InputMessage::Interrupt => Input::InterruptRequested,
            InputMessage::Resume => Input::ResumeRequested,
            InputMessage::Continue => Input::ExternalContinue,
            InputMessage::Escape => Input::EscapeRequested,
        }
    }
}

#[derive(serde::Serialize)]
struct StatusInfo {
    state: String,
    node: Option<String>,
    visible_text: String,
    typing: bool,
    delaying: bool,
    auto_advance: bool,
    fast_forward: bool,
}

// ---------------------------------------------------------------------------
// DialoguePlayer — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct DialoguePlayer {
    session: Session,
}

#[wasm_bindgen]
impl DialoguePlayer {
    /// Create a player for a RON graph. An empty string loads the bundled
    /// tavern graph.
    #[wasm_bindgen(constructor)]
    pub fn new(graph_ron: &str) -> Result<DialoguePlayer, JsError> {
        let source = if graph_ron.trim().is_empty() {
            data::TAVERN_GRAPH
        } else {
            graph_ron
        };
        let graph = Graph::parse_ron(source)
            .map_err(|e| JsError::new(&format!("Graph parse error: {e}")))?;
        let config = SessionConfig::parse_ron(data::SESSION_CONFIG)
            .map_err(|e| JsError::new(&format!("Config parse error: {e}")))?;

        let session = Session::builder()
            .with_graph(graph)
            .with_config(config)
            .build()
            .map_err(|e| JsError::new(&format!("Session build error: {e}")))?;

        Ok(DialoguePlayer { session })
    }

    /// Lint the loaded graph. Returns a JSON array of issue descriptions.
    pub fn lint(&self) -> String {
        let issues: Vec<String> = self
            .session
            .graph()
            .lint()
            .iter()
            .map(ToString::to_string)
            .collect();
        serde_json::to_string(&issues).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn start(&mut self) {
        self.session.start();
    }

    pub fn end(&mut self) {
        self.session.end();
    }

    /// Advance the session clock by `ms` milliseconds.
    pub fn tick(&mut self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            self.session.tick(Duration::from_secs_f64(ms / 1000.0));
        }
    }

    /// Send one input described by a JSON string.
    ///
    /// Expected JSON shape:
    /// ```json
    /// { "type": "choose", "index": 1 }
    /// ```
    /// Other types: `advance`, `skip`, `interrupt`, `resume`, `continue`,
    /// `escape`. Returns whether the session accepted the input.
    pub fn input(&mut self, input_json: &str) -> Result<bool, JsError> {
        let message: InputMessage = serde_json::from_str(input_json)
            .map_err(|e| JsError::new(&format!("Invalid input JSON: {e}")))?;
        Ok(self.session.handle_input(message.into()))
    }

    pub fn set_fast_forward(&mut self, on: bool) {
        self.session.set_fast_forward(on);
    }

    pub fn set_auto_advance(&mut self, on: bool) {
        self.session.set_auto_advance(on);
    }

    /// Write a store variable from a JSON scalar. Returns false when the
    /// variable is unknown or the value does not fit its type.
    pub fn set_variable(&mut self, name: &str, value_json: &str) -> Result<bool, JsError> {
        let value: serde_json::Value = serde_json::from_str(value_json)
            .map_err(|e| JsError::new(&format!("Invalid value JSON: {e}")))?;
        let written = match (self.session.store().kind_of(name), value) {
            (Some(VariableKind::Bool), serde_json::Value::Bool(b)) => {
                self.session.set_variable(name, b)
            }
            (Some(VariableKind::Int), serde_json::Value::Number(n)) => n
                .as_i64()
                .is_some_and(|i| self.session.set_variable(name, i)),
            (Some(VariableKind::Float), serde_json::Value::Number(n)) => n
                .as_f64()
                .is_some_and(|f| self.session.set_variable(name, f)),
            (Some(VariableKind::String), serde_json::Value::String(s)) => {
                self.session.set_variable(name, s)
            }
            _ => false,
        };
        Ok(written)
    }

    /// Drain pending session events. Returns a JSON array.
    pub fn poll_events(&mut self) -> String {
        let events: Vec<SessionEvent> = self.session.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Snapshot of the session for the page's status bar. Returns JSON.
    pub fn status(&self) -> String {
        let info = StatusInfo {
            state: format!("{:?}", self.session.state()),
            node: self.session.current_node().map(ToString::to_string),
            visible_text: self.session.visible_text().to_string(),
            typing: self.session.is_typing(),
            delaying: self.session.is_delaying(),
            auto_advance: self.session.auto_advance(),
            fast_forward: self.session.fast_forward(),
        };
        serde_json::to_string(&info).unwrap_or_else(|_| "{}".to_string())
    }
}
