//! Authored data: values, resolved fields, conditions, nodes, and graphs.

pub mod condition;
pub mod graph;
pub mod node;
pub mod resolved;
pub mod settings;
pub mod value;
