//! Runtime: variable store, scheduling, text reveal, traversal, and sessions.

pub mod config;
pub mod reveal;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod styling;
pub mod traversal;
