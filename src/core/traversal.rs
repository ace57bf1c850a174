/// Traversal engine — node dispatch, splitter resolution, and choice gating.
///
/// The engine only tracks which node is current and decides where a
/// transition lands. Timing and presentation belong to the session.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::store::VariableStore;
use crate::schema::condition::all_hold;
use crate::schema::graph::Graph;
use crate::schema::node::{DialogueNode, Node, SplitterNode};
use crate::schema::value::NodeId;

/// Longest splitter chain followed in one transition.
pub const MAX_SPLITTER_HOPS: usize = 50;

/// Where a transition came to rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A dialogue node is now current.
    Dialogue(NodeId),
    /// An interrupt node is now current; traversal holds.
    Hold(NodeId),
    /// A splitter had no matching branch and no default (or the chain ran
    /// too long). The splitter stays current and nothing advances.
    Stalled(NodeId),
    /// The target was empty or unknown. Traversal is idle.
    Ended,
}

/// A choice as presented to the player for the current visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentedChoice {
    /// Position in the node's authored choice list.
    pub index: usize,
    pub text: String,
    /// All conditions held when the node was set up.
    pub enabled: bool,
    /// Enabled, or authored to stay visible when unmet.
    pub visible: bool,
    pub next: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Traversal {
    current: Option<NodeId>,
}

impl Traversal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    pub fn current_node<'g>(&self, graph: &'g Graph) -> Option<&'g Node> {
        graph.node(self.current.as_ref()?.as_str())
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Move to `id`, following splitters until a dialogue or interrupt node
    /// is reached. Empty and unknown ids end traversal.
    pub fn handle(&mut self, graph: &Graph, store: &VariableStore, id: Option<&str>) -> Step {
        let mut target = id.map(str::to_string);

        for _ in 0..=MAX_SPLITTER_HOPS {
            let Some(node) = target.as_deref().and_then(|t| graph.node(t)) else {
                debug!(target = ?target, "no node to handle, ending traversal");
                self.current = None;
                return Step::Ended;
            };
            self.current = Some(node.id().clone());

            match node {
                Node::Dialogue(d) => {
                    debug!(node = %d.id, "entered dialogue node");
                    return Step::Dialogue(d.id.clone());
                }
                Node::Interrupt(i) => {
                    debug!(node = %i.id, "reached interrupt node");
                    return Step::Hold(i.id.clone());
                }
                Node::Splitter(s) => match choose_branch(s, store) {
                    Branch::Goto(next) => {
                        debug!(node = %s.id, next = ?next, "splitter branch taken");
                        target = next.map(|n| n.0.clone());
                    }
                    Branch::Stall => {
                        warn!(node = %s.id, "splitter has no matching branch and no default");
                        return Step::Stalled(s.id.clone());
                    }
                },
            }
        }

        let at = self.current.clone().unwrap_or_default();
        warn!(node = %at, limit = MAX_SPLITTER_HOPS, "splitter chain too long, stalling");
        Step::Stalled(at)
    }

    /// "Go to next": handle the current node's plain successor.
    pub fn advance(&mut self, graph: &Graph, store: &VariableStore) -> Step {
        let next = self
            .current_node(graph)
            .and_then(Node::next)
            .map(|id| id.0.clone());
        self.handle(graph, store, next.as_deref())
    }

    /// Take choice `index` of the current dialogue node.
    ///
    /// Returns `None` (and changes nothing) when the current node has no
    /// such choice.
    pub fn select(&mut self, graph: &Graph, store: &VariableStore, index: usize) -> Option<Step> {
        let Some(Node::Dialogue(d)) = self.current_node(graph) else {
            trace!(index, "choice selected away from a dialogue node, ignoring");
            return None;
        };
        let Some(choice) = d.choices.get(index) else {
            trace!(node = %d.id, index, "no such choice, ignoring");
            return None;
        };
        let next = choice.next.as_ref().map(|id| id.0.clone());
        Some(self.handle(graph, store, next.as_deref()))
    }
}

enum Branch<'a> {
    Goto(Option<&'a NodeId>),
    Stall,
}

/// First branch whose conditions all hold, else the default. A matched
/// branch without a target behaves like an empty id.
fn choose_branch<'a>(splitter: &'a SplitterNode, store: &VariableStore) -> Branch<'a> {
    if let Some(branch) = splitter
        .branches
        .iter()
        .find(|b| all_hold(&b.conditions, store))
    {
        return Branch::Goto(branch.next.as_ref());
    }
    match &splitter.default {
        Some(default) => Branch::Goto(Some(default)),
        None => Branch::Stall,
    }
}

/// Evaluate every choice of `node` against the store, in authored order.
pub fn present_choices(node: &DialogueNode, store: &VariableStore) -> Vec<PresentedChoice> {
    node.choices
        .iter()
        .enumerate()
        .map(|(index, choice)| {
            let enabled = all_hold(&choice.conditions, store);
            PresentedChoice {
                index,
                text: choice.text.resolve(store),
                enabled,
                visible: enabled || choice.show_if_unmet.resolve(store),
                next: choice.next.clone(),
            }
        })
        .collect()
}

/// The dialogue node a "go to next" from `id` would reach, looking through
/// splitters without moving. A branch that leads nowhere falls through to
/// the next matching branch.
pub fn find_next_dialogue<'g>(
    graph: &'g Graph,
    store: &VariableStore,
    id: Option<&'g str>,
) -> Option<&'g DialogueNode> {
    let mut dead_ends = FxHashMap::default();
    lookahead(graph, store, id?, 0, &mut dead_ends)
}

// `dead_ends` maps a node to the shallowest depth it was searched from
// without success. Searching it again from that depth or deeper cannot
// succeed either.
fn lookahead<'g>(
    graph: &'g Graph,
    store: &VariableStore,
    id: &'g str,
    depth: usize,
    dead_ends: &mut FxHashMap<&'g str, usize>,
) -> Option<&'g DialogueNode> {
    if depth > MAX_SPLITTER_HOPS || dead_ends.get(id).is_some_and(|&d| d <= depth) {
        return None;
    }
    let found = match graph.node(id)? {
        Node::Dialogue(d) => return Some(d),
        Node::Interrupt(_) => return None,
        Node::Splitter(s) => s
            .branches
            .iter()
            .filter(|b| all_hold(&b.conditions, store))
            .filter_map(|b| b.next.as_ref())
            .chain(s.default.as_ref())
            .find_map(|next| lookahead(graph, store, next.as_str(), depth + 1, dead_ends)),
    };
    if found.is_none() {
        dead_ends.insert(id, depth);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::condition::{ComparisonOp, Condition};
    use crate::schema::node::{Choice, InterruptNode, SplitterBranch};
    use crate::schema::resolved::Resolved;
    use crate::schema::value::{Value, VariableTemplate};

    fn always() -> Condition {
        Condition::bool(Resolved::literal(true), true, Resolved::literal(true))
    }

    fn never() -> Condition {
        Condition::bool(Resolved::literal(true), true, Resolved::literal(false))
    }

    fn dialogue(id: &str, text: &str, next: Option<&str>) -> Node {
        Node::Dialogue(DialogueNode {
            id: id.into(),
            next: next.map(NodeId::from),
            text: text.to_string(),
            ..Default::default()
        })
    }

    fn splitter(id: &str, branches: Vec<(Vec<Condition>, &str)>, default: Option<&str>) -> Node {
        Node::Splitter(SplitterNode {
            id: id.into(),
            branches: branches
                .into_iter()
                .map(|(conditions, next)| SplitterBranch {
                    conditions,
                    next: Some(next.into()),
                })
                .collect(),
            default: default.map(NodeId::from),
        })
    }

    #[test]
    fn splitter_takes_first_match() {
        let graph = Graph::from_nodes(
            Some("S"),
            vec![
                splitter(
                    "S",
                    vec![(vec![never()], "B1"), (vec![always()], "B2"), (vec![always()], "B3")],
                    Some("D"),
                ),
                dialogue("B1", "one", None),
                dialogue("B2", "two", None),
                dialogue("B3", "three", None),
                dialogue("D", "default", None),
            ],
        );
        let mut t = Traversal::new();
        let step = t.handle(&graph, &VariableStore::new(), Some("S"));
        assert_eq!(step, Step::Dialogue("B2".into()));
        assert_eq!(t.current().map(NodeId::as_str), Some("B2"));
    }

    #[test]
    fn splitter_falls_back_to_default() {
        let graph = Graph::from_nodes(
            None,
            vec![
                splitter("S", vec![(vec![always(), never()], "X")], Some("D")),
                dialogue("X", "x", None),
                dialogue("D", "d", None),
            ],
        );
        let mut t = Traversal::new();
        assert_eq!(
            t.handle(&graph, &VariableStore::new(), Some("S")),
            Step::Dialogue("D".into())
        );
    }

    #[test]
    fn empty_condition_list_matches() {
        let graph = Graph::from_nodes(
            None,
            vec![
                splitter("S", vec![(vec![], "X")], None),
                dialogue("X", "x", None),
            ],
        );
        let mut t = Traversal::new();
        assert_eq!(
            t.handle(&graph, &VariableStore::new(), Some("S")),
            Step::Dialogue("X".into())
        );
    }

    #[test]
    fn unsatisfiable_splitter_stalls_in_place() {
        let graph = Graph::from_nodes(None, vec![splitter("S", vec![(vec![never()], "X")], None)]);
        let mut t = Traversal::new();
        let store = VariableStore::new();
        assert_eq!(t.handle(&graph, &store, Some("S")), Step::Stalled("S".into()));
        assert_eq!(t.current().map(NodeId::as_str), Some("S"));
        // A splitter has no plain successor, so "go to next" ends.
        assert_eq!(t.advance(&graph, &store), Step::Ended);
    }

    #[test]
    fn splitter_cycle_stalls_after_hop_limit() {
        let graph = Graph::from_nodes(
            None,
            vec![
                splitter("A", vec![], Some("B")),
                splitter("B", vec![], Some("A")),
            ],
        );
        let mut t = Traversal::new();
        assert!(matches!(
            t.handle(&graph, &VariableStore::new(), Some("A")),
            Step::Stalled(_)
        ));
    }

    #[test]
    fn unknown_and_empty_ids_end() {
        let graph = Graph::from_nodes(Some("A"), vec![dialogue("A", "hi", Some("B"))]);
        let store = VariableStore::new();
        let mut t = Traversal::new();
        t.handle(&graph, &store, Some("A"));
        assert_eq!(t.handle(&graph, &store, Some("nonexistent")), Step::Ended);
        assert!(t.current().is_none());

        t.handle(&graph, &store, Some("A"));
        assert_eq!(t.handle(&graph, &store, Some("")), Step::Ended);
        assert_eq!(t.handle(&graph, &store, None), Step::Ended);
    }

    #[test]
    fn interrupt_holds_without_consuming_next() {
        let graph = Graph::from_nodes(
            None,
            vec![
                Node::Interrupt(InterruptNode {
                    id: "I".into(),
                    next: Some("A".into()),
                }),
                dialogue("A", "after", None),
            ],
        );
        let store = VariableStore::new();
        let mut t = Traversal::new();
        assert_eq!(t.handle(&graph, &store, Some("I")), Step::Hold("I".into()));
        assert_eq!(t.advance(&graph, &store), Step::Dialogue("A".into()));
    }

    #[test]
    fn score_scenario_reaches_default() {
        let graph = Graph::from_nodes(
            Some("A"),
            vec![
                dialogue("A", "Hi", Some("B")),
                Node::Splitter(SplitterNode {
                    id: "B".into(),
                    branches: vec![SplitterBranch {
                        conditions: vec![Condition::int(
                            Resolved::bound("score", 0),
                            ComparisonOp::Greater,
                            Resolved::literal(10),
                        )],
                        next: Some("C".into()),
                    }],
                    default: Some("D".into()),
                }),
                dialogue("C", "high", None),
                dialogue("D", "low", None),
            ],
        )
        .with_variables(vec![VariableTemplate::new("score", Value::Int(5))]);
        let mut store = VariableStore::from_template(&graph.variables);
        let mut t = Traversal::new();

        assert_eq!(t.handle(&graph, &store, Some("A")), Step::Dialogue("A".into()));
        assert_eq!(t.advance(&graph, &store), Step::Dialogue("D".into()));

        store.set("score", 11_i64);
        t.handle(&graph, &store, Some("A"));
        assert_eq!(t.advance(&graph, &store), Step::Dialogue("C".into()));
    }

    #[test]
    fn choice_gating() {
        let node = DialogueNode {
            id: "Q".into(),
            choices: vec![
                Choice::new("Open", Some("A")),
                Choice::new("Hidden", Some("B")).with_conditions(vec![always(), never()]),
                Choice::new("Greyed", Some("C"))
                    .with_conditions(vec![always(), never()])
                    .show_if_unmet(true),
            ],
            ..Default::default()
        };
        let presented = present_choices(&node, &VariableStore::new());
        assert_eq!(presented.len(), 3);
        assert!(presented[0].enabled && presented[0].visible);
        assert!(!presented[1].enabled && !presented[1].visible);
        assert!(!presented[2].enabled && presented[2].visible);
        assert_eq!(presented[2].index, 2);
    }

    #[test]
    fn select_follows_choice_or_ends() {
        let graph = Graph::from_nodes(
            None,
            vec![
                Node::Dialogue(DialogueNode {
                    id: "Q".into(),
                    choices: vec![Choice::new("Go", Some("A")), Choice::new("Leave", None)],
                    ..Default::default()
                }),
                dialogue("A", "a", None),
            ],
        );
        let store = VariableStore::new();
        let mut t = Traversal::new();
        t.handle(&graph, &store, Some("Q"));
        assert_eq!(t.select(&graph, &store, 5), None);
        assert_eq!(t.select(&graph, &store, 0), Some(Step::Dialogue("A".into())));

        t.handle(&graph, &store, Some("Q"));
        assert_eq!(t.select(&graph, &store, 1), Some(Step::Ended));
    }

    #[test]
    fn lookahead_sees_through_splitters() {
        let graph = Graph::from_nodes(
            None,
            vec![
                splitter("S", vec![(vec![always()], "missing"), (vec![always()], "X")], None),
                dialogue("X", "x", None),
                Node::Interrupt(InterruptNode {
                    id: "I".into(),
                    next: Some("X".into()),
                }),
            ],
        );
        let store = VariableStore::new();
        let found = find_next_dialogue(&graph, &store, Some("S")).map(|d| d.id.as_str());
        assert_eq!(found, Some("X"));
        assert!(find_next_dialogue(&graph, &store, Some("I")).is_none());
        assert!(find_next_dialogue(&graph, &store, None).is_none());
    }

    // Every level has two live branches into the next one.
    fn double_chain(levels: usize, tail: Option<Node>) -> Graph {
        let mut nodes: Vec<Node> = (0..levels)
            .map(|i| {
                let next = format!("S{}", i + 1);
                splitter(
                    &format!("S{}", i),
                    vec![(vec![always()], next.as_str()), (vec![always()], next.as_str())],
                    None,
                )
            })
            .collect();
        nodes.extend(tail);
        Graph::from_nodes(Some("S0"), nodes)
    }

    #[test]
    fn lookahead_on_branching_chain_stays_linear() {
        let store = VariableStore::new();

        // Ends in a splitter with no way out.
        let graph = double_chain(45, Some(splitter("S45", vec![(vec![never()], "X")], None)));
        assert!(find_next_dialogue(&graph, &store, Some("S0")).is_none());

        let graph = double_chain(45, Some(dialogue("S45", "end", None)));
        let found = find_next_dialogue(&graph, &store, Some("S0")).map(|d| d.id.as_str());
        assert_eq!(found, Some("S45"));
    }

    #[test]
    fn lookahead_respects_hop_limit() {
        let store = VariableStore::new();
        let graph = double_chain(MAX_SPLITTER_HOPS + 5, Some(dialogue("S55", "far", None)));
        assert!(find_next_dialogue(&graph, &store, Some("S0")).is_none());
        let found = find_next_dialogue(&graph, &store, Some("S10")).map(|d| d.id.as_str());
        assert_eq!(found, Some("S55"));
    }
}
