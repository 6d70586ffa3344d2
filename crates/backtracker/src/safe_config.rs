//! Search configuration for the laser safe puzzle.
//!
//! The layout (grid, forced lasers, decision order) never changes during a
//! search, so every configuration shares it through an `Rc`. The only
//! per-node state is the laser placement and how many cells have been
//! decided; successors get their own copy of both.

use std::fmt;
use std::rc::Rc;

use crate::beam::illuminate;
use crate::config::Configuration;
use crate::pruning::{forced_lasers, is_consistent, is_rip, pillar_starved, verify, Violation};
use crate::safe::{Safe, Tile};

/// Read-only data shared by every configuration of one search
#[derive(Debug)]
struct Layout {
    /// The safe with forced lasers already placed
    safe: Safe,
    /// Cells still to decide, row-major
    open: Vec<usize>,
    /// Position of each cell in `open`
    rank: Vec<Option<usize>>,
    /// Some pillar can never be satisfied
    rip: bool,
}

/// One node of the safe search tree
#[derive(Debug, Clone)]
pub struct SafeConfig {
    layout: Rc<Layout>,
    lasers: Vec<bool>,
    /// Number of `open` cells already decided
    cursor: usize,
}

impl SafeConfig {
    /// Build the initial configuration, placing every laser the numbered
    /// pillars force.
    pub fn new(mut safe: Safe) -> Self {
        let rip = is_rip(&safe);
        if !rip {
            for cell in forced_lasers(&safe) {
                safe.set(cell, Tile::Laser);
            }
        }

        let open: Vec<usize> = (0..safe.len())
            .filter(|&i| safe.tile(i) == Tile::Empty)
            .collect();
        let mut rank = vec![None; safe.len()];
        for (r, &cell) in open.iter().enumerate() {
            rank[cell] = Some(r);
        }
        let lasers = safe.lasers();

        Self {
            layout: Rc::new(Layout {
                safe,
                open,
                rank,
                rip,
            }),
            lasers,
            cursor: 0,
        }
    }

    pub fn safe(&self) -> &Safe {
        &self.layout.safe
    }

    pub fn lasers(&self) -> &[bool] {
        &self.lasers
    }

    pub fn laser_count(&self) -> usize {
        self.lasers.iter().filter(|&&l| l).count()
    }

    /// Cells not decided yet
    pub fn remaining(&self) -> usize {
        self.layout.open.len() - self.cursor
    }

    fn is_undecided(&self, cell: usize) -> bool {
        self.layout.rank[cell].is_some_and(|r| r >= self.cursor)
    }

    /// Full check of the current placement
    pub fn verify(&self) -> Result<(), Violation> {
        verify(&self.layout.safe, &self.lasers)
    }

    /// The grid rows with lasers and beams drawn in
    pub fn render_rows(&self) -> Vec<String> {
        let mut safe = self.layout.safe.clone();
        for cell in (0..safe.len()).filter(|&i| self.lasers[i]) {
            safe.set(cell, Tile::Laser);
        }
        let beams = illuminate(&safe, &self.lasers);
        safe.render_rows(&beams.covered)
    }

    fn decide(&self, laser: bool) -> Self {
        let cell = self.layout.open[self.cursor];
        let mut lasers = self.lasers.clone();
        lasers[cell] = laser;
        Self {
            layout: Rc::clone(&self.layout),
            lasers,
            cursor: self.cursor + 1,
        }
    }
}

impl Configuration for SafeConfig {
    fn is_dead(&self) -> bool {
        self.layout.rip
            || pillar_starved(&self.layout.safe, &self.lasers, |cell| self.is_undecided(cell))
    }

    fn is_goal(&self) -> bool {
        self.verify().is_ok()
    }

    fn is_valid(&self) -> bool {
        is_consistent(&self.layout.safe, &self.lasers)
    }

    /// Decide the next open cell: laser first, then left empty.
    fn successors(&self) -> Vec<Self> {
        if self.remaining() == 0 {
            return Vec::new();
        }
        vec![self.decide(true), self.decide(false)]
    }
}

impl fmt::Display for SafeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render_rows() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
