//! Recursive backtracking search.
//!
//! [`Backtracker`] explores any tree of [`Configuration`]s depth-first,
//! pruning invalid successors and stopping at dead ones. The laser safe
//! puzzle ([`SafeConfig`]) is the bundled concrete domain.

pub mod beam;
pub mod config;
pub mod pruning;
pub mod safe;
pub mod safe_config;
pub mod solver;

// Re-export main types
pub use config::Configuration;
pub use pruning::{verify, Violation};
pub use safe::{Direction, Safe, SafeError, Tile};
pub use safe_config::SafeConfig;
pub use solver::{Backtracker, SearchOutcome, SearchStats};
