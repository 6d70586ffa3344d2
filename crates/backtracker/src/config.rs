//! The capability set a search state must provide to the backtracker.
//!
//! A configuration is one node of the search tree. The engine never looks
//! inside it; everything it needs goes through [`Configuration`].

use std::fmt::Display;

/// A snapshot of a (possibly partial) solution.
///
/// Implementations must treat a configuration as immutable once built:
/// [`successors`](Configuration::successors) borrows `self` and must return
/// fresh, independent snapshots. Sharing read-only data between a node and
/// its children (e.g. behind an `Rc`) is fine; sharing anything a child could
/// mutate is not.
///
/// `Display` is used for debug tracing only.
pub trait Configuration: Sized + Display {
    /// The configuration has already proven it cannot lead to a goal.
    ///
    /// A dead configuration is neither expanded nor accepted as a goal.
    fn is_dead(&self) -> bool;

    /// This exact configuration is an accepted solution.
    fn is_goal(&self) -> bool;

    /// No constraint is violated yet. Checked on every successor before the
    /// engine recurses into it.
    fn is_valid(&self) -> bool;

    /// The immediate children, in a fixed order. May be empty.
    fn successors(&self) -> Vec<Self>;
}
