//! Beam tracing.
//!
//! Lasers fire in all four directions. A beam stops at a pillar or at the
//! edge of the safe and passes straight through other lasers, which is what
//! makes two lasers in line with each other a conflict.

use smallvec::SmallVec;

use crate::safe::{Direction, Safe};

/// Cells walked by one beam, starting next to the laser
pub struct BeamPath<'a> {
    safe: &'a Safe,
    at: Option<usize>,
    direction: Direction,
}

impl<'a> BeamPath<'a> {
    pub fn new(safe: &'a Safe, origin: usize, direction: Direction) -> Self {
        Self {
            safe,
            at: Some(origin),
            direction,
        }
    }
}

impl Iterator for BeamPath<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let next = self.safe.step(self.at?, self.direction);
        self.at = next.filter(|&i| !self.safe.tile(i).is_pillar());
        self.at
    }
}

/// Coverage of a laser placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeamMap {
    /// Cells holding a laser or lit by a beam
    pub covered: Vec<bool>,
    /// Lasers sitting in another laser's beam
    pub conflicts: SmallVec<[usize; 4]>,
}

impl BeamMap {
    pub fn is_covered(&self, index: usize) -> bool {
        self.covered[index]
    }

    pub fn has_conflict(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Light every laser in `lasers` (one flag per cell) on `safe`.
pub fn illuminate(safe: &Safe, lasers: &[bool]) -> BeamMap {
    let mut covered = lasers.to_vec();
    let mut conflicts = SmallVec::new();

    for origin in (0..safe.len()).filter(|&i| lasers[i]) {
        for direction in Direction::ALL {
            for cell in BeamPath::new(safe, origin, direction) {
                covered[cell] = true;
                if lasers[cell] && !conflicts.contains(&cell) {
                    conflicts.push(cell);
                }
            }
        }
    }

    BeamMap { covered, conflicts }
}

/// Whether any laser can see another one. Cheaper than a full [`illuminate`].
pub fn any_conflict(safe: &Safe, lasers: &[bool]) -> bool {
    (0..safe.len()).filter(|&i| lasers[i]).any(|origin| {
        // Right and Down suffice: a conflict is symmetric.
        [Direction::Right, Direction::Down]
            .into_iter()
            .any(|d| BeamPath::new(safe, origin, d).any(|cell| lasers[cell]))
    })
}
