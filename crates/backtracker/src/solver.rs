//! Classic recursive backtracking solver.
//!
//! The solver walks the tree of configurations depth-first, left to right.
//! Invalid successors are pruned before any recursive call, dead
//! configurations end their branch immediately, and returning from a call is
//! the backtrack: nothing is ever undone because nothing is ever mutated.

use std::time::{Duration, Instant};

use log::debug;

use crate::config::Configuration;

/// Counters collected during a single search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Configurations the solver entered (including the root)
    pub examined: usize,
    /// Successors skipped because they were invalid
    pub pruned: usize,
    /// Configurations that reported themselves dead
    pub dead_ends: usize,
    /// Goal configurations reached
    pub goals: usize,
    /// Deepest recursion level reached (root is 0)
    pub max_depth: usize,
    /// Wall time spent searching
    pub elapsed: Duration,
}

/// Result of a search together with its statistics
#[derive(Debug, Clone)]
pub struct SearchOutcome<T> {
    /// `None` when the search found nothing (or the root was dead)
    pub solution: Option<T>,
    pub stats: SearchStats,
}

impl<T> SearchOutcome<T> {
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }
}

/// Depth-first backtracking search over any [`Configuration`].
#[derive(Debug, Clone, Default)]
pub struct Backtracker {
    debug: bool,
}

impl Backtracker {
    /// Create a solver. With `debug` set every examined configuration and
    /// every successor verdict is logged at debug level.
    pub fn new(debug: bool) -> Self {
        if debug {
            debug!("Backtracker debugging enabled...");
        }
        Self { debug }
    }

    /// Find the first goal reachable from `config`.
    pub fn solve<C: Configuration>(&self, config: C) -> Option<C> {
        self.search(config).solution
    }

    /// Collect every goal reachable from `config` through valid successors,
    /// in discovery order.
    ///
    /// Returns `None` only when `config` itself is dead. A live root whose
    /// subtree holds no goal yields `Some` of an empty vector.
    pub fn solve_with_path<C: Configuration>(&self, config: C) -> Option<Vec<C>> {
        self.search_all(config).solution
    }

    /// Find the first goal and the chain of configurations leading to it,
    /// starting with `config` and ending with the goal.
    pub fn solve_with_route<C: Configuration>(&self, config: C) -> Option<Vec<C>> {
        self.search_route(config).solution
    }

    /// Same as [`solve`](Self::solve), with statistics.
    pub fn search<C: Configuration>(&self, config: C) -> SearchOutcome<C> {
        let start_time = Instant::now();
        let mut stats = SearchStats::default();

        let solution = self.first_goal(config, 0, &mut stats);

        self.finish("solve", solution.is_some(), start_time, &mut stats);
        SearchOutcome { solution, stats }
    }

    /// Same as [`solve_with_path`](Self::solve_with_path), with statistics.
    pub fn search_all<C: Configuration>(&self, config: C) -> SearchOutcome<Vec<C>> {
        let start_time = Instant::now();
        let mut stats = SearchStats::default();

        let mut goals = Vec::new();
        let solution = if self.all_goals(config, 0, &mut goals, &mut stats) {
            Some(goals)
        } else {
            None
        };

        self.finish("solve_with_path", solution.is_some(), start_time, &mut stats);
        SearchOutcome { solution, stats }
    }

    /// Same as [`solve_with_route`](Self::solve_with_route), with statistics.
    pub fn search_route<C: Configuration>(&self, config: C) -> SearchOutcome<Vec<C>> {
        let start_time = Instant::now();
        let mut stats = SearchStats::default();

        // The route is built goal-first while unwinding.
        let solution = self.route_to_goal(config, 0, &mut stats).map(|mut route| {
            route.reverse();
            route
        });

        self.finish("solve_with_route", solution.is_some(), start_time, &mut stats);
        SearchOutcome { solution, stats }
    }

    fn first_goal<C: Configuration>(
        &self,
        config: C,
        depth: usize,
        stats: &mut SearchStats,
    ) -> Option<C> {
        if !self.enter(&config, depth, stats) {
            return None;
        }
        if config.is_goal() {
            self.hit_goal(&config, stats);
            return Some(config);
        }

        for child in config.successors() {
            if self.admit(&child, stats) {
                if let Some(solution) = self.first_goal(child, depth + 1, stats) {
                    return Some(solution);
                }
            }
        }
        // implicit backtracking happens here
        None
    }

    /// Returns `false` when `config` is dead, so the root can report absence.
    fn all_goals<C: Configuration>(
        &self,
        config: C,
        depth: usize,
        goals: &mut Vec<C>,
        stats: &mut SearchStats,
    ) -> bool {
        if !self.enter(&config, depth, stats) {
            return false;
        }
        if config.is_goal() {
            self.hit_goal(&config, stats);
            goals.push(config);
            return true;
        }

        for child in config.successors() {
            if self.admit(&child, stats) {
                self.all_goals(child, depth + 1, goals, stats);
            }
        }
        true
    }

    fn route_to_goal<C: Configuration>(
        &self,
        config: C,
        depth: usize,
        stats: &mut SearchStats,
    ) -> Option<Vec<C>> {
        if !self.enter(&config, depth, stats) {
            return None;
        }
        if config.is_goal() {
            self.hit_goal(&config, stats);
            return Some(vec![config]);
        }

        for child in config.successors() {
            if self.admit(&child, stats) {
                if let Some(mut route) = self.route_to_goal(child, depth + 1, stats) {
                    route.push(config);
                    return Some(route);
                }
            }
        }
        None
    }

    /// Bookkeeping on entry; `false` if the configuration is dead.
    fn enter<C: Configuration>(&self, config: &C, depth: usize, stats: &mut SearchStats) -> bool {
        stats.examined += 1;
        stats.max_depth = stats.max_depth.max(depth);
        self.trace("Current config", config);

        if config.is_dead() {
            stats.dead_ends += 1;
            self.trace("\tDead config", config);
            return false;
        }
        true
    }

    /// The pruning step: only valid successors are recursed into.
    fn admit<C: Configuration>(&self, child: &C, stats: &mut SearchStats) -> bool {
        if child.is_valid() {
            self.trace("\tValid successor", child);
            true
        } else {
            stats.pruned += 1;
            self.trace("\tInvalid successor", child);
            false
        }
    }

    fn hit_goal<C: Configuration>(&self, config: &C, stats: &mut SearchStats) {
        stats.goals += 1;
        self.trace("\tGoal config", config);
    }

    fn finish(&self, mode: &str, solved: bool, start_time: Instant, stats: &mut SearchStats) {
        stats.elapsed = start_time.elapsed();
        debug!(
            "{}: solved={} examined={} pruned={} dead={} goals={} depth={} in {:?}",
            mode,
            solved,
            stats.examined,
            stats.pruned,
            stats.dead_ends,
            stats.goals,
            stats.max_depth,
            stats.elapsed
        );
    }

    fn trace<C: Configuration>(&self, msg: &str, config: &C) {
        if self.debug {
            debug!("{}:\n{}", msg, config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fmt;
    use std::rc::Rc;

    type Expansions = Rc<RefCell<Vec<&'static str>>>;

    /// Hand-built search tree node that records every expansion.
    #[derive(Clone)]
    struct Node {
        name: &'static str,
        valid: bool,
        goal: bool,
        dead: bool,
        children: Vec<Node>,
        expanded: Expansions,
    }

    impl fmt::Display for Node {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.name)
        }
    }

    impl Configuration for Node {
        fn is_dead(&self) -> bool {
            self.dead
        }

        fn is_goal(&self) -> bool {
            self.goal
        }

        fn is_valid(&self) -> bool {
            self.valid
        }

        fn successors(&self) -> Vec<Self> {
            self.expanded.borrow_mut().push(self.name);
            self.children.clone()
        }
    }

    struct Tree {
        expanded: Expansions,
    }

    impl Tree {
        fn new() -> Self {
            Self {
                expanded: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn node(&self, name: &'static str, children: Vec<Node>) -> Node {
            Node {
                name,
                valid: true,
                goal: false,
                dead: false,
                children,
                expanded: Rc::clone(&self.expanded),
            }
        }

        fn goal(&self, name: &'static str) -> Node {
            Node {
                goal: true,
                ..self.node(name, vec![])
            }
        }

        fn invalid(&self, name: &'static str, children: Vec<Node>) -> Node {
            Node {
                valid: false,
                ..self.node(name, children)
            }
        }

        fn dead(&self, name: &'static str, children: Vec<Node>) -> Node {
            Node {
                dead: true,
                ..self.node(name, children)
            }
        }

        fn expanded(&self) -> Vec<&'static str> {
            self.expanded.borrow().clone()
        }
    }

    fn names(nodes: &[Node]) -> Vec<&'static str> {
        nodes.iter().map(|n| n.name).collect()
    }

    #[test]
    fn test_invalid_sibling_never_expanded() {
        let t = Tree::new();
        let root = t.node(
            "root",
            vec![
                t.node("x", vec![t.goal("y")]),
                t.invalid("z", vec![t.goal("z-goal")]),
            ],
        );

        let solution = Backtracker::new(false).solve(root);

        assert_eq!(solution.map(|n| n.name), Some("y"));
        assert!(!t.expanded().contains(&"z"));
    }

    #[test]
    fn test_pruning_skips_invalid_half() {
        let t = Tree::new();
        let root = t.node(
            "root",
            vec![
                t.node("a", vec![]),
                t.invalid("b", vec![t.goal("b-goal")]),
                t.node("c", vec![]),
                t.invalid("d", vec![t.goal("d-goal")]),
            ],
        );

        let outcome = Backtracker::new(false).search(root);

        assert!(outcome.solution.is_none());
        assert_eq!(t.expanded(), vec!["root", "a", "c"]);
        assert_eq!(outcome.stats.pruned, 2);
        assert_eq!(outcome.stats.examined, 3);
    }

    #[test]
    fn test_dead_goal_is_no_solution() {
        let t = Tree::new();
        let mut root = t.dead("root", vec![t.goal("child")]);
        root.goal = true;

        let outcome = Backtracker::new(true).search(root);

        assert!(outcome.solution.is_none());
        assert_eq!(outcome.stats.dead_ends, 1);
        assert!(t.expanded().is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let t = Tree::new();
        let root = t.node(
            "root",
            vec![
                t.node("a", vec![t.goal("a-goal")]),
                t.node("b", vec![t.goal("b-goal")]),
            ],
        );

        let solution = Backtracker::new(false).solve(root);

        assert_eq!(solution.map(|n| n.name), Some("a-goal"));
        assert!(!t.expanded().contains(&"b"));
    }

    #[test]
    fn test_backtracks_out_of_dead_end() {
        let t = Tree::new();
        let root = t.node(
            "root",
            vec![
                t.node("a", vec![t.node("a1", vec![]), t.dead("a2", vec![t.goal("hidden")])]),
                t.node("b", vec![t.goal("b-goal")]),
            ],
        );

        let outcome = Backtracker::new(false).search(root);

        assert_eq!(outcome.solution.map(|n| n.name), Some("b-goal"));
        assert_eq!(t.expanded(), vec!["root", "a", "a1", "b"]);
        assert_eq!(outcome.stats.max_depth, 2);
    }

    #[test]
    fn test_no_goal_anywhere() {
        let t = Tree::new();
        let root = t.node(
            "root",
            vec![t.node("a", vec![t.node("a1", vec![])]), t.node("b", vec![])],
        );

        assert!(Backtracker::new(false).solve(root).is_none());
    }

    #[test]
    fn test_leaf_goal_root() {
        let t = Tree::new();
        let solution = Backtracker::new(false).solve(t.goal("root"));

        assert_eq!(solution.map(|n| n.name), Some("root"));
        assert!(t.expanded().is_empty());
    }

    #[test]
    fn test_path_collects_goals_in_order() {
        let t = Tree::new();
        let root = t.node(
            "root",
            vec![
                t.node("a", vec![t.goal("a-goal")]),
                t.invalid("x", vec![t.goal("x-goal")]),
                t.node("b", vec![t.dead("b1", vec![]), t.goal("b-goal")]),
            ],
        );

        let goals = Backtracker::new(false).solve_with_path(root);

        assert_eq!(goals.as_deref().map(names), Some(vec!["a-goal", "b-goal"]));
    }

    #[test]
    fn test_path_absent_vs_empty() {
        let t = Tree::new();
        let engine = Backtracker::new(false);

        let dead = t.dead("root", vec![t.goal("g")]);
        assert!(engine.solve_with_path(dead).is_none());

        let barren = t.node("root", vec![t.node("a", vec![])]);
        assert_eq!(engine.solve_with_path(barren).map(|g| g.len()), Some(0));
    }

    #[test]
    fn test_path_does_not_expand_goals() {
        let t = Tree::new();
        let mut root = t.goal("root");
        root.children = vec![t.goal("below")];

        let outcome = Backtracker::new(false).search_all(root);

        assert_eq!(outcome.solution.as_deref().map(names), Some(vec!["root"]));
        assert_eq!(outcome.stats.goals, 1);
        assert!(t.expanded().is_empty());
    }

    #[test]
    fn test_route_runs_root_to_goal() {
        let t = Tree::new();
        let root = t.node(
            "root",
            vec![
                t.node("a", vec![t.node("a1", vec![])]),
                t.node("b", vec![t.invalid("b1", vec![]), t.node("b2", vec![t.goal("g")])]),
            ],
        );

        let route = Backtracker::new(false).solve_with_route(root);

        assert_eq!(route.as_deref().map(names), Some(vec!["root", "b", "b2", "g"]));
    }

    #[test]
    fn test_route_none_without_goal() {
        let t = Tree::new();
        let root = t.node("root", vec![t.dead("a", vec![t.goal("g")])]);

        let outcome = Backtracker::new(false).search_route(root);

        assert!(!outcome.is_solved());
        assert_eq!(outcome.stats.dead_ends, 1);
    }

    #[test]
    fn test_debug_does_not_change_result() {
        let build = |t: &Tree| {
            t.node(
                "root",
                vec![t.invalid("a", vec![]), t.node("b", vec![t.goal("g")])],
            )
        };
        let quiet = Tree::new();
        let loud = Tree::new();

        let q = Backtracker::new(false).search(build(&quiet));
        let l = Backtracker::new(true).search(build(&loud));

        assert_eq!(q.solution.map(|n| n.name), l.solution.map(|n| n.name));
        assert_eq!(quiet.expanded(), loud.expanded());
        assert_eq!(q.stats.examined, l.stats.examined);
    }
}
