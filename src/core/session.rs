/// Session controller — the single owner of a playthrough's state.
///
/// A `Session` ties together the graph, the variable store, traversal,
/// text reveal, and the task scheduler. Hosts drive it with explicit time
/// (`tick`) and discrete input, and read back what to draw as a queue of
/// `SessionEvent`s.

use serde::Serialize;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::core::config::{ConfigError, SessionConfig};
use crate::core::reveal::{RevealStep, TextReveal};
use crate::core::scheduler::{seconds, Scheduler, TaskKind};
use crate::core::store::VariableStore;
use crate::core::styling::{strip_color_tags, styled_text};
use crate::core::traversal::{find_next_dialogue, present_choices, PresentedChoice, Step, Traversal};
use crate::schema::graph::{Graph, GraphError};
use crate::schema::node::{DialogueNode, Node};
use crate::schema::value::{
    BackgroundTransition, BoxTransition, Color, NodeId, StoreValue, TextAlign,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no graph was provided")]
    MissingGraph,
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse playback state, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Running,
    /// Held by an interrupt node or request until resumed.
    Holding,
    /// The current node waits for an external continue signal.
    AwaitingSignal,
}

/// Discrete host input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    AdvanceRequested,
    ChoiceSelected(usize),
    SkipRequested,
    InterruptRequested,
    ResumeRequested,
    ExternalContinue,
    EscapeRequested,
}

/// Opaque requests for the host's audio and scene layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cue {
    Broadcast(String),
    Background {
        image: String,
        transition: BackgroundTransition,
    },
    MusicQueue {
        tracks: Vec<String>,
        looping: bool,
        shuffle: bool,
    },
    PlaySounds(Vec<String>),
    StopSounds,
    PauseMusic,
    ResumeMusic,
    ResetAudio,
}

/// Text layout overrides. `None` means the host's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextLayout {
    pub align: Option<TextAlign>,
    pub wrap: Option<bool>,
}

/// Dialogue box appearance. `None` means the host's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoxStyle {
    pub transition: BoxTransition,
    pub box_color: Option<Color>,
    pub box_image: Option<String>,
    pub name_plate_color: Option<Color>,
    pub name_plate_image: Option<String>,
}

/// Everything the host needs to draw a dialogue node once it is set up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueFrame {
    pub node: NodeId,
    /// Name plate entries: talking speakers, `???` for hidden names.
    pub speakers: Vec<String>,
    /// Styled body of this node alone.
    pub text: String,
    /// The body is appended to the text already on screen.
    pub keep_previous_text: bool,
    pub choices: Vec<PresentedChoice>,
    pub layout: TextLayout,
    pub box_style: BoxStyle,
    pub text_shadow: bool,
    /// `text` without color tags, for the shadow layer. Set with `text_shadow`.
    pub shadow_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    SessionStarted,
    SessionEnded,
    NodeEntered(NodeId),
    DialogueShown(DialogueFrame),
    TextCleared,
    /// The visible prefix after one reveal step.
    TextRevealed(String),
    TextCompleted { node: NodeId, text: String },
    ChoiceSelected { index: usize, next: Option<NodeId> },
    Held,
    Resumed,
    /// A splitter could not transition; nothing advances.
    Stalled(NodeId),
    Cue(Cue),
}

/// One playthrough of a graph. Built via `Session::builder()`.
pub struct Session {
    graph: Arc<Graph>,
    config: SessionConfig,
    store: VariableStore,
    traversal: Traversal,
    scheduler: Scheduler,
    reveal: TextReveal,
    choices: Vec<PresentedChoice>,
    events: VecDeque<SessionEvent>,
    running: bool,
    held: bool,
    awaiting: bool,
    allow_escape: bool,
    allow_fast_advance: bool,
    text_shadow: bool,
    auto_advance: bool,
    fast_forward: bool,
    base_print_speed: f64,
}

/// Builder for constructing a `Session`.
#[derive(Default)]
pub struct SessionBuilder {
    graph_path: Option<String>,
    config_path: Option<String>,
    /// Directly provided graph (for testing without files).
    graph: Option<Graph>,
    /// Directly provided config (for testing without files).
    config: Option<SessionConfig>,
}

impl SessionBuilder {
    pub fn graph_file(mut self, path: &str) -> Self {
        self.graph_path = Some(path.to_string());
        self
    }

    pub fn config_file(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Provide the graph directly (for testing without files).
    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Provide the config directly (for testing without files).
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Session, SessionError> {
        // A directly provided graph takes precedence over a file
        let graph = match (self.graph, self.graph_path) {
            (Some(graph), _) => graph,
            (None, Some(path)) => Graph::load_from_ron(Path::new(&path))?,
            (None, None) => return Err(SessionError::MissingGraph),
        };

        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => SessionConfig::load_from_ron(Path::new(&path))?,
            (None, None) => SessionConfig::default(),
        };

        Ok(Session::new(graph, config))
    }
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// An idle session. Call [`start`](Self::start) to begin.
    pub fn new(graph: Graph, config: SessionConfig) -> Self {
        let store = VariableStore::from_template(&graph.variables);
        let settings = graph.settings.clone();
        let base_print_speed = config.print_speed;
        Self {
            graph: Arc::new(graph),
            config,
            store,
            traversal: Traversal::new(),
            scheduler: Scheduler::new(),
            reveal: TextReveal::new(),
            choices: Vec::new(),
            events: VecDeque::new(),
            running: false,
            held: false,
            awaiting: false,
            allow_escape: settings.allow_escape,
            allow_fast_advance: settings.allow_fast_advance,
            text_shadow: settings.text_shadow_on_multiple_speakers,
            auto_advance: false,
            fast_forward: false,
            base_print_speed,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Mutable store access for host code. Writes are visible to every
    /// later resolution.
    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    pub fn set_variable<T: StoreValue>(&mut self, name: &str, value: T) -> bool {
        self.store.set(name, value)
    }

    pub fn state(&self) -> SessionState {
        if !self.running {
            SessionState::Idle
        } else if self.held {
            SessionState::Holding
        } else if self.awaiting {
            SessionState::AwaitingSignal
        } else {
            SessionState::Running
        }
    }

    pub fn current_node(&self) -> Option<&NodeId> {
        self.traversal.current()
    }

    pub fn visible_text(&self) -> &str {
        self.reveal.visible()
    }

    /// Choices presented for the current dialogue node, in authored order.
    pub fn choices(&self) -> &[PresentedChoice] {
        &self.choices
    }

    pub fn is_typing(&self) -> bool {
        self.scheduler.is_pending(TaskKind::Reveal)
    }

    pub fn is_delaying(&self) -> bool {
        self.scheduler.is_pending(TaskKind::NodeDelay)
    }

    /// Whether any delay, reveal step, or auto-advance is scheduled.
    pub fn has_pending_work(&self) -> bool {
        self.scheduler.has_pending()
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn fast_forward(&self) -> bool {
        self.fast_forward
    }

    pub fn allow_escape(&self) -> bool {
        self.allow_escape
    }

    pub fn allow_fast_advance(&self) -> bool {
        self.allow_fast_advance
    }

    /// Seconds per character the next reveal step will use.
    pub fn print_speed(&self) -> f64 {
        self.base_print_speed
    }

    /// Session clock: total time consumed by `tick`.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn poll_event(&mut self) -> Option<SessionEvent> {
        self.events.pop_front()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Reset, re-seed the store from the graph's template, and enter the
    /// entry node. A graph without an entry ends immediately.
    pub fn start(&mut self) {
        self.reset(true);
        self.store.reseed(&self.graph.variables);
        debug!(entry = ?self.graph.entry, "session started");
        self.events.push_back(SessionEvent::SessionStarted);

        let entry = self.graph.entry.clone();
        self.handle(entry);
    }

    /// End the session. Ending an idle session does nothing.
    pub fn end(&mut self) {
        if !self.running {
            trace!("end requested while idle, ignoring");
            return;
        }
        self.reset(false);
        debug!("session ended");
        self.events.push_back(SessionEvent::SessionEnded);
    }

    /// Hold the session in place. Typing and pending delays stop.
    pub fn interrupt(&mut self) -> bool {
        if !self.running || self.held {
            trace!("interrupt ignored");
            return false;
        }
        self.hold();
        true
    }

    /// Release a hold and continue with the current node's successor.
    pub fn resume(&mut self) -> bool {
        if !self.held {
            trace!("resume ignored, session is not held");
            return false;
        }
        self.held = false;
        self.events.push_back(SessionEvent::Resumed);
        self.leave_node();
        let graph = Arc::clone(&self.graph);
        let step = self.traversal.advance(&graph, &self.store);
        self.apply(step);
        self.cue(Cue::ResumeMusic);
        true
    }

    /// Escape ends the session when the graph allows it.
    pub fn escape(&mut self) -> bool {
        if !self.allow_escape || !self.accepts_player_input() {
            trace!("escape ignored");
            return false;
        }
        self.end();
        true
    }

    // ------------------------------------------------------------------
    // Player input
    // ------------------------------------------------------------------

    pub fn handle_input(&mut self, input: Input) -> bool {
        match input {
            Input::AdvanceRequested => self.advance(),
            Input::ChoiceSelected(index) => self.select(index),
            Input::SkipRequested => self.skip(),
            Input::InterruptRequested => self.interrupt(),
            Input::ResumeRequested => self.resume(),
            Input::ExternalContinue => self.external_continue(),
            Input::EscapeRequested => self.escape(),
        }
    }

    /// A click on the dialogue box. Skips typing, cuts a pre-node delay, or
    /// advances a finished click-to-advance node, in that order of priority.
    pub fn advance(&mut self) -> bool {
        if !self.accepts_player_input() {
            trace!("advance ignored");
            return false;
        }
        let graph = Arc::clone(&self.graph);
        let Some(Node::Dialogue(node)) = self.traversal.current_node(&graph) else {
            return false;
        };
        if !node.choices.is_empty() {
            trace!(node = %node.id, "advance ignored, node has choices");
            return false;
        }

        let typing = self.is_typing();
        let delaying = self.is_delaying();
        if typing && self.allow_fast_advance && !self.fast_forward {
            self.finish_reveal();
            true
        } else if delaying && self.allow_fast_advance {
            self.setup_dialogue();
            true
        } else if node.settings.advance_on_click && !typing && !delaying {
            self.go_next();
            true
        } else {
            false
        }
    }

    /// Take a presented choice. Hidden and disabled choices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if !self.accepts_player_input() {
            trace!(index, "choice ignored");
            return false;
        }
        let Some(choice) = self.choices.get(index) else {
            trace!(index, "no such choice");
            return false;
        };
        if !choice.enabled || !choice.visible {
            trace!(index, "choice is not selectable");
            return false;
        }

        self.events.push_back(SessionEvent::ChoiceSelected {
            index,
            next: choice.next.clone(),
        });
        self.leave_node();
        let graph = Arc::clone(&self.graph);
        if let Some(step) = self.traversal.select(&graph, &self.store, index) {
            self.apply(step);
        }
        true
    }

    /// Reveal the rest of the current text at once.
    pub fn skip(&mut self) -> bool {
        if !self.accepts_player_input() || !self.is_typing() {
            trace!("skip ignored");
            return false;
        }
        self.finish_reveal();
        true
    }

    /// The external "continue" signal: go to the next node.
    pub fn external_continue(&mut self) -> bool {
        if !self.running || self.held {
            trace!("continue ignored");
            return false;
        }
        self.awaiting = false;
        self.go_next();
        true
    }

    /// Turning fast-forward on turns auto-advance off.
    pub fn set_fast_forward(&mut self, on: bool) {
        self.fast_forward = on;
        if on {
            self.auto_advance = false;
            self.push_fast_forward();
        }
    }

    /// Turning auto-advance on turns fast-forward off.
    pub fn set_auto_advance(&mut self, on: bool) {
        self.auto_advance = on;
        if on {
            self.fast_forward = false;
        }
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Advance the session clock by `dt`, firing every task that falls due.
    pub fn tick(&mut self, dt: Duration) {
        let until = self.scheduler.now().saturating_add(dt);
        let mut fired = 0;
        while let Some(kind) = self.scheduler.pop_due(until) {
            self.run_task(kind);
            fired += 1;
            if fired >= self.config.max_tasks_per_tick {
                warn!(fired, "task limit reached in one tick, deferring the rest");
                break;
            }
        }
        self.scheduler.settle(until);
    }

    fn run_task(&mut self, kind: TaskKind) {
        match kind {
            TaskKind::NodeDelay => self.setup_dialogue(),
            TaskKind::Reveal => self.reveal_step(),
            TaskKind::AutoAdvance => self.go_next(),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn reset(&mut self, running: bool) {
        self.scheduler.cancel_all();

        let settings = &self.graph.settings;
        self.allow_escape = settings.allow_escape;
        self.allow_fast_advance = settings.allow_fast_advance;
        self.text_shadow = settings.text_shadow_on_multiple_speakers;
        self.cue(Cue::ResetAudio);

        self.auto_advance = false;
        self.fast_forward = false;
        self.running = running;
        self.held = false;
        self.awaiting = false;
        self.base_print_speed = self.config.print_speed;

        self.traversal.reset();
        self.reveal.clear();
        self.choices.clear();
    }

    fn accepts_player_input(&self) -> bool {
        self.running && !self.held && !self.awaiting
    }

    fn cue(&mut self, cue: Cue) {
        self.events.push_back(SessionEvent::Cue(cue));
    }

    // Work scheduled for the node being left must not touch the next one.
    fn leave_node(&mut self) {
        self.scheduler.cancel_all();
        self.choices.clear();
        self.awaiting = false;
    }

    fn handle(&mut self, id: Option<NodeId>) {
        self.leave_node();
        let graph = Arc::clone(&self.graph);
        let step = self
            .traversal
            .handle(&graph, &self.store, id.as_ref().map(NodeId::as_str));
        self.apply(step);
    }

    fn go_next(&mut self) {
        self.cue(Cue::StopSounds);
        self.leave_node();
        let graph = Arc::clone(&self.graph);
        let step = self.traversal.advance(&graph, &self.store);
        self.apply(step);
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Ended => self.end(),
            Step::Dialogue(id) => self.enter_dialogue(id),
            Step::Hold(id) => {
                self.events.push_back(SessionEvent::NodeEntered(id));
                self.hold();
            }
            Step::Stalled(id) => self.events.push_back(SessionEvent::Stalled(id)),
        }
    }

    fn hold(&mut self) {
        self.held = true;
        self.scheduler.cancel_all();
        self.cue(Cue::PauseMusic);
        debug!(node = ?self.traversal.current(), "session held");
        self.events.push_back(SessionEvent::Held);
    }

    /// Clear (unless the node keeps previous text) and wait out the
    /// pre-node delay.
    fn enter_dialogue(&mut self, id: NodeId) {
        let graph = Arc::clone(&self.graph);
        let Some(node) = graph.dialogue(id.as_str()) else {
            self.end();
            return;
        };
        self.events.push_back(SessionEvent::NodeEntered(id));

        if !node.settings.keep_previous_text {
            self.reveal.clear();
            self.events.push_back(SessionEvent::TextCleared);
        }

        let delay = if self.fast_forward {
            Duration::ZERO
        } else {
            seconds(node.settings.pre_delay.resolve(&self.store))
        };
        self.scheduler.schedule(TaskKind::NodeDelay, delay);
    }

    /// Resolve the node's fields, emit its frame and cues, then start the
    /// reveal. Setup always completes before the first character shows.
    fn setup_dialogue(&mut self) {
        self.scheduler.cancel(TaskKind::NodeDelay);
        let graph = Arc::clone(&self.graph);
        let Some(Node::Dialogue(node)) = self.traversal.current_node(&graph) else {
            return;
        };
        let settings = &node.settings;
        self.awaiting = settings.await_continue;

        if let Some(message) = settings.broadcast.resolve_active(&self.store) {
            self.cue(Cue::Broadcast(message));
        }
        if let Some(image) = settings.background.resolve_active(&self.store) {
            let transition = settings.background_transition.resolve(&self.store);
            self.cue(Cue::Background { image, transition });
        }

        let frame = self.frame(node);
        let styled = frame.text.clone();
        self.choices = frame.choices.clone();
        self.events.push_back(SessionEvent::DialogueShown(frame));

        if let Some(tracks) = settings.music_queue.resolve_active(&self.store) {
            let looping = settings.music_loop.resolve(&self.store);
            let shuffle = settings.music_shuffle.resolve(&self.store);
            self.cue(Cue::MusicQueue {
                tracks,
                looping,
                shuffle,
            });
        }
        if let Some(sounds) = settings.sounds.resolve_active(&self.store) {
            self.cue(Cue::PlaySounds(sounds));
        }

        self.reveal.begin(&styled);
        self.reveal_step();
    }

    fn frame(&self, node: &DialogueNode) -> DialogueFrame {
        let store = &self.store;
        let settings = &node.settings;

        let speakers: Vec<String> = node
            .speakers
            .iter()
            .filter_map(|speaker| {
                let name = speaker.name.resolve(store);
                if name.is_empty() || !speaker.talking.resolve(store) {
                    return None;
                }
                if speaker.hide_name.resolve(store) {
                    Some("???".to_string())
                } else {
                    Some(name)
                }
            })
            .collect();
        let text_shadow = speakers.len() > 1 && self.text_shadow;
        let text = styled_text(&node.text, settings, store);
        let shadow_text = text_shadow.then(|| strip_color_tags(&text));

        DialogueFrame {
            node: node.id.clone(),
            speakers,
            text,
            keep_previous_text: settings.keep_previous_text,
            choices: present_choices(node, store),
            layout: TextLayout {
                align: settings.text_align.resolve_active(store),
                wrap: settings.wrap_text.resolve_active(store),
            },
            box_style: BoxStyle {
                transition: settings
                    .box_transition
                    .resolve_active(store)
                    .unwrap_or(self.graph.settings.box_transition),
                box_color: settings.box_color.resolve_active(store),
                box_image: settings.box_image.resolve_active(store),
                name_plate_color: settings.name_plate_color.resolve_active(store),
                name_plate_image: settings.name_plate_image.resolve_active(store),
            },
            text_shadow,
            shadow_text,
        }
    }

    fn reveal_step(&mut self) {
        match self.reveal.step() {
            RevealStep::Revealed(_) => {
                self.events
                    .push_back(SessionEvent::TextRevealed(self.reveal.visible().to_string()));
                let interval = self.reveal_interval();
                self.scheduler.schedule(TaskKind::Reveal, interval);
            }
            RevealStep::Finished => self.complete_text(),
        }
    }

    // Read once per step so a store write changes speed mid-reveal. An
    // active node speed also becomes the base for later nodes.
    fn reveal_interval(&mut self) -> Duration {
        let graph = Arc::clone(&self.graph);
        if let Some(Node::Dialogue(node)) = self.traversal.current_node(&graph) {
            if let Some(speed) = node.settings.print_speed.resolve_active(&self.store) {
                self.base_print_speed = speed;
            }
        }
        if self.fast_forward {
            self.config.fast_forward_interval()
        } else {
            seconds(self.base_print_speed)
        }
    }

    fn finish_reveal(&mut self) {
        self.scheduler.cancel(TaskKind::Reveal);
        self.reveal.skip();
        self.complete_text();
    }

    /// Report completion, then decide how (and whether) to move on.
    fn complete_text(&mut self) {
        self.scheduler.cancel(TaskKind::Reveal);
        let graph = Arc::clone(&self.graph);
        let Some(Node::Dialogue(node)) = self.traversal.current_node(&graph) else {
            return;
        };
        self.events.push_back(SessionEvent::TextCompleted {
            node: node.id.clone(),
            text: self.reveal.visible().to_string(),
        });

        if self.awaiting || !node.choices.is_empty() {
            return;
        }

        if self.auto_advance {
            let next = node.next.as_ref().map(NodeId::as_str);
            let keeps_text = find_next_dialogue(&graph, &self.store, next)
                .is_some_and(|n| n.settings.keep_previous_text);
            if keeps_text {
                self.go_next();
            } else {
                self.scheduler
                    .schedule(TaskKind::AutoAdvance, self.config.auto_advance_interval());
            }
        } else if !node.settings.advance_on_click || self.fast_forward {
            self.go_next();
        }
    }

    // Fast-forward acts as a held-down click: cut a pending delay, or move
    // past a finished click-to-advance node.
    fn push_fast_forward(&mut self) {
        if !self.accepts_player_input() {
            return;
        }
        let graph = Arc::clone(&self.graph);
        let Some(Node::Dialogue(node)) = self.traversal.current_node(&graph) else {
            return;
        };
        if !node.choices.is_empty() {
            return;
        }
        if self.is_delaying() {
            if self.allow_fast_advance {
                self.setup_dialogue();
            }
        } else if !self.is_typing()
            && node.settings.advance_on_click
            && !self.scheduler.is_pending(TaskKind::AutoAdvance)
        {
            self.go_next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::{Choice, InterruptNode};
    use crate::schema::resolved::Resolved;
    use crate::schema::settings::DialogueSettings;

    const MS: Duration = Duration::from_millis(1);

    fn say(id: &str, text: &str, next: Option<&str>) -> Node {
        Node::Dialogue(DialogueNode {
            id: id.into(),
            next: next.map(NodeId::from),
            text: text.to_string(),
            ..Default::default()
        })
    }

    fn session(entry: &str, nodes: Vec<Node>) -> Session {
        Session::new(Graph::from_nodes(Some(entry), nodes), SessionConfig::default())
    }

    #[test]
    fn builder_without_graph_fails() {
        assert!(matches!(
            Session::builder().build(),
            Err(SessionError::MissingGraph)
        ));
    }

    #[test]
    fn start_enters_entry_after_delay() {
        let mut s = session("A", vec![say("A", "Hi", None)]);
        s.start();
        assert_eq!(s.state(), SessionState::Running);
        assert!(s.is_delaying());
        assert_eq!(s.visible_text(), "");

        s.tick(Duration::ZERO);
        assert_eq!(s.visible_text(), "H");
        assert!(s.is_typing());
    }

    #[test]
    fn empty_entry_ends_immediately() {
        let mut s = Session::new(
            Graph::from_nodes(None, vec![say("A", "Hi", None)]),
            SessionConfig::default(),
        );
        s.start();
        assert_eq!(s.state(), SessionState::Idle);
        let events = s.drain_events();
        assert!(events.contains(&SessionEvent::SessionStarted));
        assert_eq!(events.last(), Some(&SessionEvent::SessionEnded));
    }

    #[test]
    fn reveal_then_auto_continue() {
        let mut s = session("A", vec![say("A", "Hi", Some("B")), say("B", "Yo", None)]);
        s.start();
        s.tick(Duration::ZERO);
        s.tick(MS * 25);
        assert_eq!(s.visible_text(), "Hi");
        // Completion comes one interval after the last character.
        s.tick(MS * 25);
        assert_eq!(s.current_node().map(NodeId::as_str), Some("B"));
    }

    #[test]
    fn click_node_waits_for_advance() {
        let mut click = DialogueNode {
            id: "A".into(),
            next: Some("B".into()),
            text: "Hi".into(),
            ..Default::default()
        };
        click.settings.advance_on_click = true;
        let mut s = session("A", vec![Node::Dialogue(click), say("B", "Yo", None)]);
        s.start();
        s.tick(Duration::from_secs(1));
        assert_eq!(s.current_node().map(NodeId::as_str), Some("A"));
        assert!(!s.is_typing());

        assert!(s.advance());
        assert_eq!(s.current_node().map(NodeId::as_str), Some("B"));
    }

    #[test]
    fn click_skips_typing_then_cuts_delay() {
        let mut delayed = DialogueNode {
            id: "A".into(),
            text: "Hello".into(),
            ..Default::default()
        };
        delayed.settings.pre_delay = Resolved::literal(2.0);
        delayed.settings.advance_on_click = true;
        let mut s = session("A", vec![Node::Dialogue(delayed)]);
        s.start();
        assert!(s.is_delaying());

        assert!(s.advance());
        assert!(!s.is_delaying());
        assert!(s.is_typing());

        assert!(s.advance());
        assert_eq!(s.visible_text(), "Hello");
        assert!(!s.is_typing());
    }

    #[test]
    fn interrupt_and_resume() {
        let mut s = session(
            "I",
            vec![
                Node::Interrupt(InterruptNode {
                    id: "I".into(),
                    next: Some("A".into()),
                }),
                say("A", "after", None),
            ],
        );
        s.start();
        assert_eq!(s.state(), SessionState::Holding);
        assert!(!s.advance());
        assert!(s.resume());
        assert_eq!(s.current_node().map(NodeId::as_str), Some("A"));
        let events = s.drain_events();
        assert!(events.contains(&SessionEvent::Cue(Cue::PauseMusic)));
        assert_eq!(events.last(), Some(&SessionEvent::Cue(Cue::ResumeMusic)));
    }

    #[test]
    fn await_continue_blocks_clicks() {
        let mut waiting = DialogueNode {
            id: "A".into(),
            next: Some("B".into()),
            text: "Wait".into(),
            ..Default::default()
        };
        waiting.settings.await_continue = true;
        let mut s = session("A", vec![Node::Dialogue(waiting), say("B", "Go", None)]);
        s.start();
        s.tick(Duration::from_secs(1));
        assert_eq!(s.state(), SessionState::AwaitingSignal);
        assert!(!s.advance());
        assert!(s.handle_input(Input::ExternalContinue));
        assert_eq!(s.current_node().map(NodeId::as_str), Some("B"));
    }

    #[test]
    fn fast_forward_and_auto_advance_exclude_each_other() {
        let mut s = session("A", vec![say("A", "x", None)]);
        s.set_auto_advance(true);
        s.set_fast_forward(true);
        assert!(s.fast_forward() && !s.auto_advance());
        s.set_auto_advance(true);
        assert!(!s.fast_forward() && s.auto_advance());
    }

    #[test]
    fn active_print_speed_becomes_base() {
        let node = DialogueNode {
            id: "A".into(),
            text: "abc".into(),
            settings: DialogueSettings {
                print_speed: Resolved::literal(0.1),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut s = session("A", vec![Node::Dialogue(node)]);
        s.start();
        s.tick(Duration::ZERO);
        assert_eq!(s.print_speed(), 0.1);
        s.tick(MS * 50);
        assert_eq!(s.visible_text(), "a");
        s.tick(MS * 50);
        assert_eq!(s.visible_text(), "ab");
    }

    #[test]
    fn disabled_choice_cannot_be_selected() {
        use crate::schema::condition::Condition;

        let never = Condition::bool(Resolved::literal(true), true, Resolved::literal(false));
        let node = DialogueNode {
            id: "Q".into(),
            text: "?".into(),
            choices: vec![
                Choice::new("No", Some("A"))
                    .with_conditions(vec![never])
                    .show_if_unmet(true),
                Choice::new("Yes", Some("A")),
            ],
            ..Default::default()
        };
        let mut s = session("Q", vec![Node::Dialogue(node), say("A", "a", None)]);
        s.start();
        s.tick(Duration::ZERO);
        assert_eq!(s.choices().len(), 2);
        assert!(!s.select(0));
        assert!(s.select(1));
        assert_eq!(s.current_node().map(NodeId::as_str), Some("A"));
    }

    #[test]
    fn escape_respects_graph_setting() {
        let mut s = session("A", vec![say("A", "x", None)]);
        s.start();
        assert!(!s.escape());
        assert_eq!(s.state(), SessionState::Running);
    }
}
