/// Graph model — the immutable node table plus its authored defaults.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use super::condition::{Condition, Operands};
use super::node::{DialogueNode, Node};
use super::resolved::Resolved;
use super::settings::DialogueSettings;
use super::value::{BoxTransition, NodeId, VariableTemplate};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonWrite(#[from] ron::Error),
}

/// Playback defaults re-applied every time a session resets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Allow the player to end the session at any time.
    pub allow_escape: bool,
    /// Allow clicks to skip the reveal or cut a pre-node delay.
    pub allow_fast_advance: bool,
    /// Ask the host for a text shadow when several speakers talk at once.
    pub text_shadow_on_multiple_speakers: bool,
    /// Box transition used when the session starts, ends, holds, or resumes.
    pub box_transition: BoxTransition,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            allow_escape: false,
            allow_fast_advance: true,
            text_shadow_on_multiple_speakers: false,
            box_transition: BoxTransition::None,
        }
    }
}

/// An authored dialogue graph, built once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub entry: Option<NodeId>,
    pub settings: GraphSettings,
    pub variables: Vec<VariableTemplate>,
    nodes: FxHashMap<NodeId, Node>,
}

// RON file shape: nodes are authored as a list and indexed on load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "Graph")]
struct RonGraph {
    #[serde(default)]
    entry: Option<NodeId>,
    #[serde(default)]
    settings: GraphSettings,
    #[serde(default)]
    variables: Vec<VariableTemplate>,
    #[serde(default)]
    nodes: Vec<Node>,
}

impl Graph {
    /// Index a list of nodes. When two nodes share an id the later one wins.
    pub fn from_nodes(entry: Option<&str>, nodes: Vec<Node>) -> Self {
        let mut map = FxHashMap::default();
        for node in nodes {
            map.insert(node.id().clone(), node);
        }
        Self {
            entry: entry.map(NodeId::from),
            settings: GraphSettings::default(),
            variables: Vec::new(),
            nodes: map,
        }
    }

    pub fn with_settings(mut self, settings: GraphSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_variables(mut self, variables: Vec<VariableTemplate>) -> Self {
        self.variables = variables;
        self
    }

    /// Load a graph from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Graph, GraphError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a graph from a RON string.
    pub fn parse_ron(input: &str) -> Result<Graph, GraphError> {
        let raw: RonGraph = ron::from_str(input)?;
        let entry = raw.entry.map(|id| id.0);
        Ok(Self::from_nodes(entry.as_deref(), raw.nodes)
            .with_settings(raw.settings)
            .with_variables(raw.variables))
    }

    /// Serialize back to the authored RON shape, nodes sorted by id.
    pub fn to_ron(&self) -> Result<String, GraphError> {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        let raw = RonGraph {
            entry: self.entry.clone(),
            settings: self.settings.clone(),
            variables: self.variables.clone(),
            nodes,
        };
        Ok(ron::ser::to_string_pretty(&raw, ron::ser::PrettyConfig::default())?)
    }

    /// Look up a node. Empty and unknown ids both yield `None`.
    pub fn node(&self, id: &str) -> Option<&Node> {
        if id.is_empty() {
            return None;
        }
        self.nodes.get(id)
    }

    pub fn dialogue(&self, id: &str) -> Option<&DialogueNode> {
        match self.node(id)? {
            Node::Dialogue(d) => Some(d),
            _ => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Report authoring problems. Runtime behavior never depends on these.
    pub fn lint(&self) -> Vec<GraphIssue> {
        let mut issues = Vec::new();

        match self.entry.as_ref().filter(|id| !id.as_str().is_empty()) {
            None => issues.push(GraphIssue::MissingEntry),
            Some(entry) if !self.contains(entry.as_str()) => {
                issues.push(GraphIssue::DanglingEntry(entry.clone()))
            }
            Some(_) => {}
        }

        let declared: FxHashSet<&str> = self.variables.iter().map(|v| v.name.as_str()).collect();

        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort();
        for id in ids {
            let node = &self.nodes[id];
            for target in node.targets() {
                if !target.as_str().is_empty() && !self.contains(target.as_str()) {
                    issues.push(GraphIssue::DanglingTarget {
                        from: id.clone(),
                        target: target.clone(),
                    });
                }
            }

            if let Node::Splitter(s) = node {
                if s.default.as_ref().map_or(true, |d| d.as_str().is_empty()) {
                    issues.push(GraphIssue::SplitterWithoutDefault(id.clone()));
                }
            }

            let mut names = Vec::new();
            bound_names(node, &mut names);
            names.sort_unstable();
            names.dedup();
            for name in names {
                if !declared.contains(name) {
                    issues.push(GraphIssue::UndeclaredVariable {
                        node: id.clone(),
                        name: name.to_string(),
                    });
                }
            }
        }

        let reachable = self.reachable();
        let mut unreachable: Vec<&NodeId> = self
            .nodes
            .keys()
            .filter(|id| !reachable.contains(id.as_str()))
            .collect();
        unreachable.sort();
        issues.extend(unreachable.into_iter().cloned().map(GraphIssue::Unreachable));

        issues
    }

    fn reachable(&self) -> FxHashSet<&str> {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();
        if let Some(entry) = self.entry.as_ref().and_then(|id| self.node(id.as_str())) {
            queue.push_back(entry);
        }
        while let Some(node) = queue.pop_front() {
            if !seen.insert(node.id().as_str()) {
                continue;
            }
            for target in node.targets() {
                if let Some(next) = self.node(target.as_str()) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }
}

/// An authoring problem found by [`Graph::lint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    MissingEntry,
    DanglingEntry(NodeId),
    DanglingTarget { from: NodeId, target: NodeId },
    /// May stall at runtime if no branch matches.
    SplitterWithoutDefault(NodeId),
    UndeclaredVariable { node: NodeId, name: String },
    Unreachable(NodeId),
}

impl GraphIssue {
    /// Errors end a session early; warnings only may.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::MissingEntry | Self::DanglingEntry(_))
    }
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntry => write!(f, "graph has no entry node"),
            Self::DanglingEntry(id) => write!(f, "entry node '{}' does not exist", id),
            Self::DanglingTarget { from, target } => {
                write!(f, "node '{}' points to missing node '{}'", from, target)
            }
            Self::SplitterWithoutDefault(id) => {
                write!(f, "splitter '{}' has no default and can stall", id)
            }
            Self::UndeclaredVariable { node, name } => {
                write!(f, "node '{}' binds undeclared variable '{}'", node, name)
            }
            Self::Unreachable(id) => write!(f, "node '{}' is unreachable from the entry", id),
        }
    }
}

fn push_bound<'a, T>(field: &'a Resolved<T>, names: &mut Vec<&'a str>) {
    if let Some(name) = field.bound.as_deref().filter(|n| !n.is_empty()) {
        names.push(name);
    }
}

fn condition_bound_names<'a>(conditions: &'a [Condition], names: &mut Vec<&'a str>) {
    for c in conditions {
        push_bound(&c.comparison, names);
        push_bound(&c.equals, names);
        match &c.operands {
            Operands::Bool(a, b) => {
                push_bound(a, names);
                push_bound(b, names);
            }
            Operands::Int(a, b) => {
                push_bound(a, names);
                push_bound(b, names);
            }
            Operands::Float(a, b) => {
                push_bound(a, names);
                push_bound(b, names);
            }
            Operands::String(a, b) => {
                push_bound(a, names);
                push_bound(b, names);
            }
        }
    }
}

fn settings_bound_names<'a>(s: &'a DialogueSettings, names: &mut Vec<&'a str>) {
    push_bound(&s.print_speed, names);
    push_bound(&s.pre_delay, names);
    push_bound(&s.broadcast, names);
    push_bound(&s.bold, names);
    push_bound(&s.italic, names);
    push_bound(&s.underline, names);
    push_bound(&s.color, names);
    push_bound(&s.font, names);
    push_bound(&s.text_align, names);
    push_bound(&s.wrap_text, names);
    push_bound(&s.music_queue, names);
    push_bound(&s.music_loop, names);
    push_bound(&s.music_shuffle, names);
    push_bound(&s.sounds, names);
    push_bound(&s.box_transition, names);
    push_bound(&s.box_color, names);
    push_bound(&s.box_image, names);
    push_bound(&s.name_plate_color, names);
    push_bound(&s.name_plate_image, names);
    push_bound(&s.background, names);
    push_bound(&s.background_transition, names);
}

fn bound_names<'a>(node: &'a Node, names: &mut Vec<&'a str>) {
    match node {
        Node::Dialogue(d) => {
            settings_bound_names(&d.settings, names);
            for speaker in &d.speakers {
                push_bound(&speaker.name, names);
                push_bound(&speaker.talking, names);
                push_bound(&speaker.hide_name, names);
            }
            for choice in &d.choices {
                push_bound(&choice.text, names);
                push_bound(&choice.show_if_unmet, names);
                condition_bound_names(&choice.conditions, names);
            }
        }
        Node::Splitter(s) => {
            for branch in &s.branches {
                condition_bound_names(&branch.conditions, names);
            }
        }
        Node::Interrupt(_) => {}
    }
}
