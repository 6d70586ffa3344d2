//! Safe rules used to prune the search.
//!
//! These rules split into three groups: what a partial placement must never
//! violate (validity), what makes a partial placement hopeless (deadness),
//! and the full check of a finished safe.

use thiserror::Error;

use crate::beam::{any_conflict, illuminate};
use crate::safe::Safe;

/// Why a laser placement is not a solution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("laser at ({row}, {col}) sits in another laser's beam")]
    LaserInBeam { row: usize, col: usize },
    #[error("pillar at ({row}, {col}) has {found} adjacent lasers, needs {needed}")]
    PillarCount {
        row: usize,
        col: usize,
        needed: usize,
        found: usize,
    },
    #[error("cell ({row}, {col}) is not covered by any beam")]
    Uncovered { row: usize, col: usize },
}

/// Lasers orthogonally adjacent to `pillar`
pub fn adjacent_lasers(safe: &Safe, lasers: &[bool], pillar: usize) -> usize {
    safe.neighbors(pillar).iter().filter(|&&n| lasers[n]).count()
}

/// Neighbours of `pillar` that could hold a laser at all
pub fn open_neighbors(safe: &Safe, pillar: usize) -> usize {
    safe.neighbors(pillar)
        .iter()
        .filter(|&&n| !safe.tile(n).is_pillar())
        .count()
}

/// A numbered pillar demands more lasers than it has room for.
pub fn is_rip(safe: &Safe) -> bool {
    safe.numbered_pillars()
        .any(|(pillar, needed)| open_neighbors(safe, pillar) < needed)
}

/// Cells that must hold a laser: every open neighbour of a pillar whose
/// demand equals its open neighbour count. Sorted, without duplicates.
pub fn forced_lasers(safe: &Safe) -> Vec<usize> {
    let mut forced: Vec<usize> = safe
        .numbered_pillars()
        .filter(|&(pillar, needed)| needed > 0 && open_neighbors(safe, pillar) == needed)
        .flat_map(|(pillar, _)| safe.neighbors(pillar))
        .filter(|&n| !safe.tile(n).is_pillar())
        .collect();
    forced.sort_unstable();
    forced.dedup();
    forced
}

/// Some pillar already has more adjacent lasers than it demands.
pub fn pillar_overloaded(safe: &Safe, lasers: &[bool]) -> bool {
    safe.numbered_pillars()
        .any(|(pillar, needed)| adjacent_lasers(safe, lasers, pillar) > needed)
}

/// Some pillar can no longer reach its demand, even if every neighbour still
/// `undecided` received a laser.
pub fn pillar_starved(safe: &Safe, lasers: &[bool], undecided: impl Fn(usize) -> bool) -> bool {
    safe.numbered_pillars().any(|(pillar, needed)| {
        let reachable = safe
            .neighbors(pillar)
            .iter()
            .filter(|&&n| lasers[n] || undecided(n))
            .count();
        reachable < needed
    })
}

/// Validity of a partial placement: no laser conflicts, no overloaded pillar.
pub fn is_consistent(safe: &Safe, lasers: &[bool]) -> bool {
    !pillar_overloaded(safe, lasers) && !any_conflict(safe, lasers)
}

/// Check a finished placement, reporting the first violation in row-major
/// order: conflicts, then pillar counts, then coverage.
pub fn verify(safe: &Safe, lasers: &[bool]) -> Result<(), Violation> {
    let beams = illuminate(safe, lasers);

    if let Some(&cell) = beams.conflicts.iter().min() {
        let (row, col) = safe.position(cell);
        return Err(Violation::LaserInBeam { row, col });
    }

    for (pillar, needed) in safe.numbered_pillars() {
        let found = adjacent_lasers(safe, lasers, pillar);
        if found != needed {
            let (row, col) = safe.position(pillar);
            return Err(Violation::PillarCount {
                row,
                col,
                needed,
                found,
            });
        }
    }

    let uncovered = (0..safe.len()).find(|&i| !safe.tile(i).is_pillar() && !beams.is_covered(i));
    if let Some(cell) = uncovered {
        let (row, col) = safe.position(cell);
        return Err(Violation::Uncovered { row, col });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safe(text: &str) -> Safe {
        Safe::from_text(text).unwrap()
    }

    #[test]
    fn test_rip_when_pillar_boxed_in() {
        assert!(is_rip(&safe("1 1\n1\n")));
        assert!(is_rip(&safe("1 3\nX 2 .\n")));
        assert!(!is_rip(&safe("1 3\n. 2 .\n")));
    }

    #[test]
    fn test_forced_lasers() {
        let s = safe("3 3\n. . .\n. 4 .\n. . .\n");
        assert_eq!(forced_lasers(&s), vec![1, 3, 5, 7]);

        let s = safe("2 3\n1 X .\n. . .\n");
        assert_eq!(forced_lasers(&s), vec![3]);

        assert!(forced_lasers(&safe("1 3\n. 0 .\n")).is_empty());
    }

    #[test]
    fn test_overload_and_starvation() {
        let s = safe("1 3\nL 0 .\n");
        assert!(pillar_overloaded(&s, &s.lasers()));
        assert!(!is_consistent(&s, &s.lasers()));

        let s = safe("1 3\n. 2 .\n");
        let none = vec![false; 3];
        assert!(!pillar_starved(&s, &none, |_| true));
        assert!(pillar_starved(&s, &none, |i| i == 0));
    }

    #[test]
    fn test_verify_solved_safe() {
        let s = safe("3 3\n. L .\nL 2 .\n. . L\n");
        assert_eq!(verify(&s, &s.lasers()), Ok(()));
    }

    #[test]
    fn test_verify_reports_first_problem() {
        let s = safe("1 3\nL . L\n");
        assert_eq!(
            verify(&s, &s.lasers()),
            Err(Violation::LaserInBeam { row: 0, col: 0 })
        );

        let s = safe("1 3\nL 2 .\n");
        assert_eq!(
            verify(&s, &s.lasers()),
            Err(Violation::PillarCount {
                row: 0,
                col: 1,
                needed: 2,
                found: 1
            })
        );

        let s = safe("2 2\nL X\nX .\n");
        assert_eq!(
            verify(&s, &s.lasers()),
            Err(Violation::Uncovered { row: 1, col: 1 })
        );
    }
}
