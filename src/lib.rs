//! Dialogue Graph — a runtime interpreter for authored branching dialogue.
//!
//! Walks an immutable graph of dialogue, splitter, and interrupt nodes,
//! resolving every authored field against a shared typed variable store,
//! evaluating branch conditions, and revealing markup-aware text over time
//! under an explicit, cancellable task schedule.

pub mod core;
pub mod schema;
