//! # Flood Fill
//!
//! Connected-region search and recolouring over a [`VoxelGrid`].
//!
//! Starting from a seed voxel, the fill visits every voxel reachable through
//! 6-connected neighbours that hold the seed's original color and rewrites
//! each one with a caller-supplied color function.
//!
//! ## Invariants
//!
//! - The comparison color is read from the seed once, before any write.
//!   Freshly painted voxels are therefore never mistaken for (or hidden from)
//!   the region, whatever colors the color function produces.
//! - Every coordinate is marked visited when it is *queued*, not when it is
//!   processed, so the frontier never holds duplicates and each voxel is
//!   written at most once.
//! - The whole fill is a single undo batch, opened before the first write and
//!   committed after the last.
//!
//! Processing order is unspecified; the worklist is a stack.

use std::collections::HashSet;

use bitvec::prelude::BitVec;
use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::core::Result;
use crate::editor_state::voxels::{
    color::Color,
    grid::{RefreshHint, VoxelGrid},
    neighbors::neighbors6,
};

/// Grids up to this many cells get a dense visited bitmap; larger ones fall
/// back to a hash set so sparse models in huge bounds stay cheap.
const BITMAP_LIMIT: usize = 1 << 24;

enum Visited {
    Bitmap(BitVec),
    Sparse(HashSet<Point3<i32>>),
}

/// Per-call search bookkeeping: the frontier awaiting examination and the
/// set of every coordinate ever queued. Dropped when the fill returns.
struct VisitSet {
    visited: Visited,
    frontier: Vec<Point3<i32>>,
}

impl VisitSet {
    fn for_grid(grid: &VoxelGrid) -> Self {
        let visited = match grid.volume() {
            Some(volume) if volume <= BITMAP_LIMIT => Visited::Bitmap(BitVec::repeat(false, volume)),
            _ => Visited::Sparse(HashSet::new()),
        };
        VisitSet {
            visited,
            frontier: Vec::new(),
        }
    }

    /// Queues `coord` unless it was queued before or lies outside the grid.
    /// Returns `true` if queued.
    fn visit(&mut self, grid: &VoxelGrid, coord: Point3<i32>) -> bool {
        let fresh = match &mut self.visited {
            Visited::Bitmap(bits) => match grid.index_of(coord) {
                Some(index) if !bits[index] => {
                    bits.set(index, true);
                    true
                }
                _ => false,
            },
            Visited::Sparse(seen) => grid.contains(coord) && seen.insert(coord),
        };
        if fresh {
            self.frontier.push(coord);
        }
        fresh
    }

    fn next(&mut self) -> Option<Point3<i32>> {
        self.frontier.pop()
    }

    fn remaining(&self) -> usize {
        self.frontier.len()
    }
}

/// Flood fill over a voxel grid.
pub struct FloodFillEngine;

impl FloodFillEngine {
    /// Recolors the 6-connected region of voxels sharing the seed's color.
    ///
    /// `color_fn(coord, base, remaining)` is called once per region voxel
    /// with the voxel's coordinate, the region's original color and the
    /// number of coordinates still waiting in the frontier, and returns the
    /// voxel's new color.
    ///
    /// Each write is recorded for undo and carries [`RefreshHint::Minor`],
    /// except the last one which carries [`RefreshHint::Full`].
    ///
    /// # Arguments
    /// * `grid` - The grid to fill, recorded into its undo history
    /// * `seed` - The voxel whose color defines the region
    /// * `color_fn` - Produces the new color of each region voxel
    ///
    /// # Returns
    /// The number of voxels processed. An empty or out-of-bounds seed is a
    /// no-op returning 0 that leaves both grid and history untouched.
    ///
    /// # Errors
    /// [`crate::core::EditError::InvalidState`] if an undo batch is already
    /// open on the grid. This is checked before any write.
    pub fn fill<F>(grid: &mut VoxelGrid, seed: Point3<i32>, mut color_fn: F) -> Result<usize>
    where
        F: FnMut(Point3<i32>, Color, usize) -> Color,
    {
        let Some(search) = grid.get(seed) else {
            return Ok(0);
        };
        grid.history_mut().begin_batch()?;

        let started = Instant::now();
        let mut visits = VisitSet::for_grid(grid);
        visits.visit(grid, seed);

        let mut count = 0;
        while let Some(coord) = visits.next() {
            for neighbor in neighbors6(coord) {
                if grid.get(neighbor) == Some(search) {
                    visits.visit(grid, neighbor);
                }
            }

            let remaining = visits.remaining();
            let color = color_fn(coord, search, remaining);
            let refresh = if remaining == 0 {
                RefreshHint::Full
            } else {
                RefreshHint::Minor
            };
            grid.set(coord, Some(color), true, refresh);
            count += 1;
        }

        let committed = grid.history_mut().commit_batch();
        debug!(
            "Filled {} voxels from {:?} ({} recorded changes) in {:?}",
            count,
            seed,
            committed,
            started.elapsed()
        );
        Ok(count)
    }

    /// The coordinates a fill from `seed` would process, without modifying
    /// anything.
    ///
    /// # Returns
    /// The region in processing order; empty if the seed is empty or out of
    /// bounds

    pub fn connected_region(grid: &VoxelGrid, seed: Point3<i32>) -> Vec<Point3<i32>> {
        let Some(search) = grid.get(seed) else {
            return Vec::new();
        };

        let mut visits = VisitSet::for_grid(grid);
        visits.visit(grid, seed);

        let mut region = Vec::new();
        while let Some(coord) = visits.next() {
            for neighbor in neighbors6(coord) {
                if grid.get(neighbor) == Some(search) {
                    visits.visit(grid, neighbor);
                }
            }
            region.push(coord);
        }
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EditError;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn filled(w: i32, h: i32, d: i32, color: Color) -> VoxelGrid {
        let mut grid = VoxelGrid::new(w, h, d);
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    grid.set(Point3::new(x, y, z), Some(color), false, RefreshHint::None);
                }
            }
        }
        grid.saved();
        grid
    }

    #[test]
    fn test_empty_seed_is_noop() {
        let mut grid = VoxelGrid::new(3, 3, 1);
        let count = FloodFillEngine::fill(&mut grid, Point3::new(1, 1, 0), |_, _, _| BLUE).unwrap();
        assert_eq!(count, 0);
        assert!(grid.is_empty());
        assert!(!grid.is_changed());
        assert!(!grid.history().can_undo());
    }

    #[test]
    fn test_out_of_bounds_seed_is_noop() {
        let mut grid = filled(2, 2, 2, RED);
        let count = FloodFillEngine::fill(&mut grid, Point3::new(5, 0, 0), |_, _, _| BLUE).unwrap();
        assert_eq!(count, 0);
        assert!(!grid.history().can_undo());
    }

    #[test]
    fn test_fills_whole_uniform_plane() {
        let mut grid = filled(3, 3, 1, RED);
        let count = FloodFillEngine::fill(&mut grid, Point3::new(1, 1, 0), |_, _, _| BLUE).unwrap();
        assert_eq!(count, 9);
        assert!(grid.iter().all(|(_, c)| c == BLUE));
        assert_eq!(grid.history().undo_count(), 1);
        assert_eq!(grid.history().last_committed().unwrap().len(), 9);
    }

    #[test]
    fn test_stops_at_different_color() {
        let mut grid = filled(3, 3, 1, RED);
        grid.set(Point3::new(2, 2, 0), Some(GREEN), false, RefreshHint::None);

        let count = FloodFillEngine::fill(&mut grid, Point3::new(0, 0, 0), |_, _, _| BLUE).unwrap();
        assert_eq!(count, 8);
        assert_eq!(grid.get(Point3::new(2, 2, 0)), Some(GREEN));
        let batch = grid.history().last_committed().unwrap();
        assert!(!batch.touches(Point3::new(2, 2, 0)));
    }

    #[test]
    fn test_diagonals_do_not_connect() {
        // Checkerboard: every red voxel is isolated from the others.
        let mut grid = VoxelGrid::new(3, 3, 3);
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    let color = if (x + y + z) % 2 == 0 { RED } else { GREEN };
                    grid.set(Point3::new(x, y, z), Some(color), false, RefreshHint::None);
                }
            }
        }
        let count = FloodFillEngine::fill(&mut grid, Point3::new(1, 1, 1), |_, _, _| BLUE).unwrap();
        assert_eq!(count, 1);
        assert_eq!(grid.get(Point3::new(1, 1, 1)), Some(BLUE));
        assert_eq!(grid.get(Point3::new(0, 0, 0)), Some(RED));
    }

    #[test]
    fn test_refill_with_search_color_terminates() {
        // Writing the search color back must not re-queue anything.
        let mut grid = filled(4, 4, 4, RED);
        let mut calls = 0;
        let count = FloodFillEngine::fill(&mut grid, Point3::new(0, 0, 0), |_, base, _| {
            calls += 1;
            base
        })
        .unwrap();
        assert_eq!(count, 64);
        assert_eq!(calls, 64);
        // Nothing actually changed, so nothing was committed.
        assert!(!grid.history().can_undo());
        assert!(!grid.is_changed());
    }

    #[test]
    fn test_each_voxel_written_once() {
        let mut grid = filled(5, 4, 3, RED);
        let mut seen = HashSet::new();
        FloodFillEngine::fill(&mut grid, Point3::new(2, 2, 1), |coord, _, _| {
            assert!(seen.insert(coord), "{:?} processed twice", coord);
            GREEN
        })
        .unwrap();
        assert_eq!(seen.len(), 60);

        let batch = grid.history().last_committed().unwrap();
        let unique: HashSet<_> = batch.iter().map(|c| c.coord).collect();
        assert_eq!(unique.len(), batch.len());
    }

    #[test]
    fn test_base_color_is_original_search_color() {
        let mut grid = filled(3, 1, 1, RED);
        FloodFillEngine::fill(&mut grid, Point3::new(0, 0, 0), |_, base, _| {
            assert_eq!(base, RED);
            GREEN
        })
        .unwrap();
    }

    #[test]
    fn test_last_write_requests_full_refresh() {
        let mut grid = filled(3, 3, 1, RED);
        let mut last_remaining = None;
        FloodFillEngine::fill(&mut grid, Point3::new(1, 1, 0), |_, _, remaining| {
            last_remaining = Some(remaining);
            BLUE
        })
        .unwrap();
        assert_eq!(last_remaining, Some(0));
        assert_eq!(grid.take_refresh(), RefreshHint::Full);
    }

    #[test]
    fn test_only_last_write_is_full_refresh() {
        let hints = Arc::new(Mutex::new(Vec::new()));
        let sink = hints.clone();
        let mut grid = filled(4, 3, 2, RED);
        grid.set_refresh_listener(Some(Box::new(move |_, hint| {
            sink.lock().unwrap().push(hint);
        })));

        let count = FloodFillEngine::fill(&mut grid, Point3::new(1, 1, 1), |_, _, _| BLUE).unwrap();

        let hints = hints.lock().unwrap();
        assert_eq!(hints.len(), count);
        let (last, rest) = hints.split_last().unwrap();
        assert_eq!(*last, RefreshHint::Full);
        assert!(rest.iter().all(|hint| *hint == RefreshHint::Minor));
    }

    #[test]
    fn test_auto_commit_splits_fill_into_steps() {
        let mut grid = filled(3, 3, 1, RED);
        grid.history_mut().set_auto_commit(Some(4));

        let count = FloodFillEngine::fill(&mut grid, Point3::new(0, 0, 0), |_, _, _| BLUE).unwrap();
        assert_eq!(count, 9);
        // 4 + 4 + 1 changes.
        assert_eq!(grid.history().undo_count(), 3);

        assert!(grid.undo());
        assert!(grid.iter().any(|(_, c)| c == BLUE));
        assert!(grid.undo());
        assert!(grid.undo());
        assert!(!grid.undo());
        assert!(grid.iter().all(|(_, c)| c == RED));
    }

    #[test]
    fn test_huge_sparse_grid_fills_without_bitmap() {
        let mut grid = VoxelGrid::new(1 << 13, 1 << 13, 1 << 13);
        assert!(grid.volume().map_or(true, |v| v > BITMAP_LIMIT));
        for x in 0..5 {
            grid.set(Point3::new(x, 7, 7), Some(RED), false, RefreshHint::None);
        }
        grid.set(Point3::new(8000, 7, 7), Some(RED), false, RefreshHint::None);

        let count = FloodFillEngine::fill(&mut grid, Point3::new(2, 7, 7), |_, _, _| BLUE).unwrap();
        assert_eq!(count, 5);
        assert_eq!(grid.get(Point3::new(8000, 7, 7)), Some(RED));
    }

    #[test]
    fn test_open_batch_is_rejected_before_writing() {
        let mut grid = filled(2, 2, 1, RED);
        grid.history_mut().begin_batch().unwrap();
        let err = FloodFillEngine::fill(&mut grid, Point3::new(0, 0, 0), |_, _, _| BLUE).unwrap_err();
        assert!(matches!(err, EditError::InvalidState(_)));
        assert!(grid.iter().all(|(_, c)| c == RED));
    }

    #[test]
    fn test_undo_restores_original_colors() {
        let mut grid = filled(3, 3, 2, RED);
        grid.set(Point3::new(1, 1, 1), Some(GREEN), false, RefreshHint::None);
        let before: Vec<_> = grid.iter().collect();

        FloodFillEngine::fill(&mut grid, Point3::new(0, 0, 0), |_, _, _| BLUE).unwrap();
        assert!(grid.undo());
        for (coord, color) in before {
            assert_eq!(grid.get(coord), Some(color));
        }

        assert!(grid.redo());
        assert_eq!(grid.get(Point3::new(0, 0, 0)), Some(BLUE));
        assert_eq!(grid.get(Point3::new(1, 1, 1)), Some(GREEN));
    }

    #[test]
    fn test_connected_region_matches_fill() {
        let mut grid = filled(4, 4, 1, RED);
        for y in 0..4 {
            grid.set(Point3::new(2, y, 0), Some(GREEN), false, RefreshHint::None);
        }
        let region = FloodFillEngine::connected_region(&grid, Point3::new(0, 0, 0));
        assert_eq!(region.len(), 8);
        assert!(region.iter().all(|p| p.x < 2));

        let count = FloodFillEngine::fill(&mut grid, Point3::new(0, 0, 0), |_, _, _| BLUE).unwrap();
        assert_eq!(count, region.len());
    }
}
