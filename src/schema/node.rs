use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::resolved::Resolved;
use super::settings::DialogueSettings;
use super::value::NodeId;

/// A character attached to a dialogue node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Speaker {
    pub name: Resolved<String>,
    pub talking: Resolved<bool>,
    /// Show the speaker as `???` on the name plate.
    pub hide_name: Resolved<bool>,
}

impl Speaker {
    /// A talking speaker with a fixed name.
    pub fn talking(name: &str) -> Self {
        Self {
            name: Resolved::literal(name.to_string()),
            talking: Resolved::literal(true),
            hide_name: Resolved::default(),
        }
    }
}

/// An option offered to the player at the end of a dialogue node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub text: Resolved<String>,
    pub conditions: Vec<Condition>,
    /// Keep the choice visible (but disabled) when its conditions fail.
    pub show_if_unmet: Resolved<bool>,
    pub next: Option<NodeId>,
}

impl Choice {
    pub fn new(text: &str, next: Option<&str>) -> Self {
        Self {
            text: Resolved::literal(text.to_string()),
            conditions: Vec::new(),
            show_if_unmet: Resolved::default(),
            next: next.map(NodeId::from),
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn show_if_unmet(mut self, show: bool) -> Self {
        self.show_if_unmet = Resolved::literal(show);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: NodeId,
    #[serde(default)]
    pub next: Option<NodeId>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub settings: DialogueSettings,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One guarded transition of a splitter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitterBranch {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub next: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitterNode {
    pub id: NodeId,
    /// Evaluated in order; the first branch whose conditions all hold wins.
    #[serde(default)]
    pub branches: Vec<SplitterBranch>,
    #[serde(default)]
    pub default: Option<NodeId>,
}

/// Pause marker. Traversal holds here until resumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterruptNode {
    pub id: NodeId,
    #[serde(default)]
    pub next: Option<NodeId>,
}

/// A graph node. New node kinds are added here and at every match site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Dialogue(DialogueNode),
    Splitter(SplitterNode),
    Interrupt(InterruptNode),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Dialogue(n) => &n.id,
            Self::Splitter(n) => &n.id,
            Self::Interrupt(n) => &n.id,
        }
    }

    /// The plain "go to next" target. Splitters have none.
    pub fn next(&self) -> Option<&NodeId> {
        match self {
            Self::Dialogue(n) => n.next.as_ref(),
            Self::Splitter(_) => None,
            Self::Interrupt(n) => n.next.as_ref(),
        }
    }

    /// Every id this node can transition to, in authored order.
    pub fn targets(&self) -> Vec<&NodeId> {
        match self {
            Self::Dialogue(n) => n
                .next
                .iter()
                .chain(n.choices.iter().filter_map(|c| c.next.as_ref()))
                .collect(),
            Self::Splitter(n) => n
                .branches
                .iter()
                .filter_map(|b| b.next.as_ref())
                .chain(n.default.iter())
                .collect(),
            Self::Interrupt(n) => n.next.iter().collect(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Dialogue(_) => "dialogue",
            Self::Splitter(_) => "splitter",
            Self::Interrupt(_) => "interrupt",
        }
    }
}
