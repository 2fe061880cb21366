//! # Grid Module
//!
//! This module provides the `VoxelGrid`, a bounded, sparse 3D map from integer
//! coordinates to voxel colors, together with its animation frames and edit
//! history.
//!
//! ## Storage
//!
//! Only occupied cells are stored, in a hash map keyed by coordinate. A model
//! is usually mostly empty, so this keeps memory proportional to the number
//! of painted voxels rather than to the grid volume.
//!
//! ## Bounds
//!
//! The grid spans `0..width`, `0..height`, `0..depth`. Reads outside those
//! bounds return empty and writes outside them are dropped; neither is an
//! error, which lets neighbour scans run off the edge without special cases.
//! Undo and redo obey the same rule, so history recorded before a shrinking
//! [`VoxelGrid::resize`] never resurrects cells outside the new bounds.
//!
//! ## Frames
//!
//! A model is a sequence of animation frames sharing one set of bounds.
//! Reads and writes go to the current frame; rotations and mirrors apply to
//! every frame at once. History spans all frames, each recorded change
//! remembering the frame it landed in.
//!
//! ## Change Tracking
//!
//! - A dirty flag is raised by any write that changes a cell, and cleared by
//!   [`VoxelGrid::saved`].
//! - Writers attach a [`RefreshHint`]; the strongest hint since the last
//!   [`VoxelGrid::take_refresh`] tells the display how much to repaint. A
//!   [`RefreshListener`] additionally sees the hint of every single write.
//! - Writes made with `record_undo` are appended to the grid's [`UndoLog`].

use std::collections::HashMap;
use std::fmt;

use cgmath::Point3;
use log::{debug, info, trace};
use num_derive::FromPrimitive;

use super::color::{Color, Voxel};
use crate::core::{EditError, Result};
use crate::editor_state::history::{UndoBatch, UndoLog, VoxelChange};

/// How urgently a display should repaint after a write.
///
/// This is a hint for interactive hosts only; the grid's contents do not
/// depend on it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive)]
pub enum RefreshHint {
    /// No repaint needed
    #[default]
    None = 0,
    /// Cheap incremental repaint
    Minor = 1,
    /// Full rebuild of the display
    Full = 2,
}

impl RefreshHint {
    /// Converts an integer hint level.
    ///
    /// # Arguments
    /// * `level` - 0 for none, 1 for minor, 2 for full
    ///
    /// # Returns
    /// The matching hint; anything above 2 is treated as a full refresh
    pub fn from_level(level: u8) -> Self {
        num::FromPrimitive::from_u8(level).unwrap_or(RefreshHint::Full)
    }
}

/// One of the three grid axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Width
    X,
    /// Height
    Y,
    /// Depth
    Z,
}

/// Called with the coordinate and hint of every in-bounds write.
///
/// Lets a live display repaint while a long edit such as a fill is still
/// running.
pub type RefreshListener = Box<dyn FnMut(Point3<i32>, RefreshHint) + Send + Sync>;

type Cells = HashMap<Point3<i32>, Color>;

/// A bounded, sparse voxel grid with animation frames and undo history.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use zoxel_core::editor_state::voxels::{color::Color, grid::{RefreshHint, VoxelGrid}};
///
/// let mut grid = VoxelGrid::new(4, 4, 4);
/// let p = Point3::new(1, 2, 3);
/// grid.set(p, Some(Color::WHITE), true, RefreshHint::Full);
/// assert_eq!(grid.get(p), Some(Color::WHITE));
///
/// // Outside the bounds is always empty.
/// assert_eq!(grid.get(Point3::new(-1, 0, 0)), None);
///
/// grid.undo();
/// assert_eq!(grid.get(p), None);
/// ```
pub struct VoxelGrid {
    width: i32,
    height: i32,
    depth: i32,
    /// Occupied cells of every frame; never empty.
    frames: Vec<Cells>,
    current: usize,
    history: UndoLog,
    changed: bool,
    pending_refresh: RefreshHint,
    listener: Option<RefreshListener>,
}

impl fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("dimensions", &self.dimensions())
            .field("frames", &self.frames.len())
            .field("current", &self.current)
            .field("voxels", &self.len())
            .field("changed", &self.changed)
            .field("pending_refresh", &self.pending_refresh)
            .finish()
    }
}

impl VoxelGrid {
    /// Creates an empty, single-frame grid.
    ///
    /// # Arguments
    /// * `width`, `height`, `depth` - Grid bounds; negative values are treated as zero
    ///
    /// # Returns
    /// A grid with no voxels, no history and the dirty flag cleared
    pub fn new(width: i32, height: i32, depth: i32) -> Self {
        VoxelGrid {
            width: width.max(0),
            height: height.max(0),
            depth: depth.max(0),
            frames: vec![Cells::new()],
            current: 0,
            history: UndoLog::new(),
            changed: false,
            pending_refresh: RefreshHint::None,
            listener: None,
        }
    }

    /// The grid's `(width, height, depth)`.
    pub fn dimensions(&self) -> (i32, i32, i32) {
        (self.width, self.height, self.depth)
    }

    /// Number of cells inside the bounds, occupied or not.
    ///
    /// # Returns
    /// The cell count, or `None` if it does not fit in a `usize`
    pub fn volume(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.depth as usize)
    }

    /// Number of occupied cells in the current frame.
    pub fn len(&self) -> usize {
        self.cells().len()
    }

    /// `true` if no cell of the current frame is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells().is_empty()
    }

    /// `true` if `coord` lies inside the bounds.
    pub fn contains(&self, coord: Point3<i32>) -> bool {
        in_bounds(self.dimensions(), coord)
    }

    /// Dense row-major index of `coord`, x fastest, then y, then z.
    ///
    /// # Returns
    /// The index, or `None` outside the bounds or when the grid's
    /// [`VoxelGrid::volume`] does not fit in a `usize`. Suitable for per-call
    /// bitmaps sized to the volume.
    pub fn index_of(&self, coord: Point3<i32>) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        self.volume()?;
        let (w, h) = (self.width as usize, self.height as usize);
        Some(coord.x as usize + w * (coord.y as usize + h * coord.z as usize))
    }

    /// Contents of the cell at `coord` in the current frame.
    ///
    /// Never fails: unset and out-of-bounds cells are empty.
    pub fn get(&self, coord: Point3<i32>) -> Voxel {
        if !self.contains(coord) {
            return None;
        }
        self.cells().get(&coord).copied()
    }

    /// Writes a cell of the current frame.
    ///
    /// Writing the value a cell already holds changes nothing and records
    /// nothing, and writes outside the bounds are dropped. The refresh hint is
    /// raised for every in-bounds write regardless, so the last write of an
    /// edit can always request the final repaint.
    ///
    /// # Arguments
    /// * `coord` - The cell to write
    /// * `voxel` - New contents, `None` to erase
    /// * `record_undo` - Append the write to the undo history
    /// * `refresh` - How urgently the display should repaint
    ///
    /// # Returns
    /// `true` if the cell's contents changed
    pub fn set(
        &mut self,
        coord: Point3<i32>,
        voxel: Voxel,
        record_undo: bool,
        refresh: RefreshHint,
    ) -> bool {
        if !self.contains(coord) {
            trace!("Ignoring write outside the grid at {:?}", coord);
            return false;
        }
        self.pending_refresh = self.pending_refresh.max(refresh);
        if let Some(listener) = self.listener.as_mut() {
            listener(coord, refresh);
        }

        let frame = self.current;
        let old = store(&mut self.frames[frame], coord, voxel);
        if old == voxel {
            return false;
        }
        if record_undo {
            self.history.record(VoxelChange {
                frame,
                coord,
                old,
                new: voxel,
            });
        }
        self.changed = true;
        true
    }

    /// Installs or removes the per-write refresh listener.
    pub fn set_refresh_listener(&mut self, listener: Option<RefreshListener>) {
        self.listener = listener;
    }

    /// Iterates the occupied cells of the current frame in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, Color)> + '_ {
        self.cells().iter().map(|(coord, color)| (*coord, *color))
    }

    /// `true` if the grid was modified since the last [`VoxelGrid::saved`].
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Marks the current contents as saved.
    pub fn saved(&mut self) {
        self.changed = false;
    }

    /// Returns the strongest refresh hint raised since the last call and
    /// resets it.
    pub fn take_refresh(&mut self) -> RefreshHint {
        std::mem::take(&mut self.pending_refresh)
    }

    /// The grid's undo history.
    pub fn history(&self) -> &UndoLog {
        &self.history
    }

    /// The most recently committed batch, e.g. to inspect what an edit
    /// recorded.
    pub fn last_batch(&self) -> Option<&UndoBatch> {
        self.history.last_committed()
    }

    /// Mutable access to the undo history, e.g. to open and commit batches.
    pub fn history_mut(&mut self) -> &mut UndoLog {
        &mut self.history
    }

    /// Reverts the most recent batch.
    ///
    /// Changes that fall outside the current bounds are skipped.
    ///
    /// # Returns
    /// `false` if there was nothing to undo
    pub fn undo(&mut self) -> bool {
        let Self {
            width,
            height,
            depth,
            frames,
            history,
            ..
        } = self;
        let Some(batch) = history.undo() else {
            return false;
        };
        let mut dims = (*width, *height, *depth);
        if let Some(reshape) = batch.reshape() {
            reshape_cells(frames, &mut dims, reshape.from);
        }
        for change in batch.iter().rev() {
            replay(frames, dims, change, change.old);
        }
        (*width, *height, *depth) = dims;
        self.finish_replay();
        true
    }

    /// Re-applies the most recently undone batch.
    ///
    /// Changes that fall outside the current bounds are skipped.
    ///
    /// # Returns
    /// `false` if there was nothing to redo
    pub fn redo(&mut self) -> bool {
        let Self {
            width,
            height,
            depth,
            frames,
            history,
            ..
        } = self;
        let Some(batch) = history.redo() else {
            return false;
        };
        let mut dims = (*width, *height, *depth);
        if let Some(reshape) = batch.reshape() {
            reshape_cells(frames, &mut dims, reshape.to);
        }
        for change in batch.iter() {
            replay(frames, dims, change, change.new);
        }
        (*width, *height, *depth) = dims;
        self.finish_replay();
        true
    }

    /// Removes every voxel, every frame but an empty first one, and all
    /// history.
    pub fn clear(&mut self) {
        if self.frames.iter().any(|cells| !cells.is_empty()) || self.frames.len() > 1 {
            self.changed = true;
        }
        self.frames = vec![Cells::new()];
        self.current = 0;
        self.history.clear();
        self.pending_refresh = RefreshHint::Full;
    }

    /// Changes the bounds, discarding voxels of every frame that fall outside
    /// them.
    ///
    /// History is kept; replaying it later drops writes that land outside the
    /// new bounds.
    ///
    /// # Arguments
    /// * `width`, `height`, `depth` - New bounds; negative values are treated as zero
    pub fn resize(&mut self, width: i32, height: i32, depth: i32) {
        let mut dims = self.dimensions();
        reshape_cells(&mut self.frames, &mut dims, (width.max(0), height.max(0), depth.max(0)));
        (self.width, self.height, self.depth) = dims;
        self.changed = true;
        self.pending_refresh = RefreshHint::Full;
    }

    /// Turns the model a quarter turn about `axis`, in every frame.
    ///
    /// The bounds turn with it: rotating about Y swaps width and depth. The
    /// rotation is one undo step, bounds included. Four turns about the same
    /// axis restore the original model.
    ///
    /// # Arguments
    /// * `axis` - The axis to turn about
    ///
    /// # Errors
    /// [`EditError::InvalidState`] if an undo batch is already open
    pub fn rotate_about_axis(&mut self, axis: Axis) -> Result<()> {
        let (w, h, d) = self.dimensions();
        let dims = match axis {
            Axis::X => (w, d, h),
            Axis::Y => (d, h, w),
            Axis::Z => (h, w, d),
        };
        self.remap(dims, move |p| match axis {
            Axis::X => Point3::new(p.x, p.z, h - 1 - p.y),
            Axis::Y => Point3::new(p.z, p.y, w - 1 - p.x),
            Axis::Z => Point3::new(h - 1 - p.y, p.x, p.z),
        })?;
        info!("Rotated model about {:?}", axis);
        Ok(())
    }

    /// Mirrors the model along `axis`, in every frame, as one undo step.
    ///
    /// # Arguments
    /// * `axis` - The axis whose coordinates are flipped
    ///
    /// # Errors
    /// [`EditError::InvalidState`] if an undo batch is already open
    pub fn mirror_in_axis(&mut self, axis: Axis) -> Result<()> {
        let (w, h, d) = self.dimensions();
        self.remap((w, h, d), move |p| match axis {
            Axis::X => Point3::new(w - 1 - p.x, p.y, p.z),
            Axis::Y => Point3::new(p.x, h - 1 - p.y, p.z),
            Axis::Z => Point3::new(p.x, p.y, d - 1 - p.z),
        })?;
        info!("Mirrored model in {:?}", axis);
        Ok(())
    }

    /// Number of animation frames; always at least one.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index of the frame reads and writes go to.
    pub fn current_frame(&self) -> usize {
        self.current
    }

    /// Makes `index` the current frame.
    ///
    /// # Errors
    /// [`EditError::UnknownFrame`] if there is no such frame
    pub fn select_frame(&mut self, index: usize) -> Result<()> {
        if index >= self.frames.len() {
            return Err(EditError::UnknownFrame(index));
        }
        self.current = index;
        self.pending_refresh = RefreshHint::Full;
        Ok(())
    }

    /// Moves to the next frame, wrapping from the last to the first.
    pub fn select_next_frame(&mut self) {
        self.current = (self.current + 1) % self.frames.len();
        self.pending_refresh = RefreshHint::Full;
    }

    /// Moves to the previous frame, wrapping from the first to the last.
    pub fn select_previous_frame(&mut self) {
        let count = self.frames.len();
        self.current = (self.current + count - 1) % count;
        self.pending_refresh = RefreshHint::Full;
    }

    /// Inserts a frame and makes it current.
    ///
    /// Recorded history follows its frames to their new positions.
    ///
    /// # Arguments
    /// * `index` - Position of the new frame, from 0 to [`VoxelGrid::frame_count`]
    /// * `copy_current` - Start from a copy of the current frame instead of empty
    ///
    /// # Errors
    /// [`EditError::UnknownFrame`] if `index` is past the end
    pub fn insert_frame(&mut self, index: usize, copy_current: bool) -> Result<()> {
        if index > self.frames.len() {
            return Err(EditError::UnknownFrame(index));
        }
        let cells = if copy_current {
            self.cells().clone()
        } else {
            Cells::new()
        };
        self.frames.insert(index, cells);
        self.history
            .remap_frames(|f| Some(if f >= index { f + 1 } else { f }));
        self.current = index;
        self.changed = true;
        self.pending_refresh = RefreshHint::Full;
        debug!("Inserted frame {} of {}", index, self.frames.len());
        Ok(())
    }

    /// Deletes the current frame. The following frame becomes current, or the
    /// new last frame if the deleted one was last.
    ///
    /// History recorded in the deleted frame is dropped.
    ///
    /// # Returns
    /// `false` if this was the only frame, which is never deleted
    pub fn delete_frame(&mut self) -> bool {
        if self.frames.len() == 1 {
            return false;
        }
        let index = self.current;
        self.frames.remove(index);
        self.history.remap_frames(|f| match f {
            f if f == index => None,
            f if f > index => Some(f - 1),
            f => Some(f),
        });
        self.current = index.min(self.frames.len() - 1);
        self.changed = true;
        self.pending_refresh = RefreshHint::Full;
        debug!("Deleted frame {}, {} left", index, self.frames.len());
        true
    }

    /// Replaces the current frame's contents with a copy of frame `source`,
    /// as one undo step.
    ///
    /// # Errors
    /// [`EditError::UnknownFrame`] if there is no such frame, or
    /// [`EditError::InvalidState`] if an undo batch is already open
    pub fn copy_to_current(&mut self, source: usize) -> Result<()> {
        let Some(cells) = self.frames.get(source).cloned() else {
            return Err(EditError::UnknownFrame(source));
        };
        self.history.begin_batch()?;
        let frame = self.current;
        let changed = diff_into(&mut self.history, frame, &mut self.frames[frame], cells);
        self.history.commit_batch();
        self.changed |= changed;
        self.pending_refresh = RefreshHint::Full;
        Ok(())
    }

    fn cells(&self) -> &Cells {
        &self.frames[self.current]
    }

    /// Moves every voxel of every frame through `map` into a grid of `dims`,
    /// recording the result as one atomic batch.
    fn remap<F>(&mut self, dims: (i32, i32, i32), map: F) -> Result<()>
    where
        F: Fn(Point3<i32>) -> Point3<i32>,
    {
        let from = self.dimensions();
        self.history.begin_atomic_batch()?;

        let mut changed = false;
        for (frame, cells) in self.frames.iter_mut().enumerate() {
            let moved: Cells = cells.iter().map(|(coord, color)| (map(*coord), *color)).collect();
            changed |= diff_into(&mut self.history, frame, cells, moved);
        }
        (self.width, self.height, self.depth) = dims;
        self.history.record_reshape(from, dims);
        self.history.commit_batch();

        self.changed |= changed || from != dims;
        self.pending_refresh = RefreshHint::Full;
        Ok(())
    }

    fn finish_replay(&mut self) {
        self.changed = true;
        self.pending_refresh = RefreshHint::Full;
    }
}

fn in_bounds((w, h, d): (i32, i32, i32), coord: Point3<i32>) -> bool {
    (0..w).contains(&coord.x) && (0..h).contains(&coord.y) && (0..d).contains(&coord.z)
}

/// Writes `voxel` into the sparse map and returns the previous contents.
fn store(cells: &mut Cells, coord: Point3<i32>, voxel: Voxel) -> Voxel {
    match voxel {
        Some(color) => cells.insert(coord, color),
        None => cells.remove(&coord),
    }
}

/// Replays one side of a recorded change, skipping anything out of bounds.
fn replay(frames: &mut [Cells], dims: (i32, i32, i32), change: &VoxelChange, voxel: Voxel) {
    if !in_bounds(dims, change.coord) {
        return;
    }
    if let Some(cells) = frames.get_mut(change.frame) {
        store(cells, change.coord, voxel);
    }
}

/// Sets new bounds and drops every cell outside them.
fn reshape_cells(frames: &mut [Cells], dims: &mut (i32, i32, i32), to: (i32, i32, i32)) {
    *dims = to;
    for cells in frames {
        cells.retain(|coord, _| in_bounds(to, *coord));
    }
}

/// Replaces `cells` with `target`, recording one change per differing cell.
/// Returns `true` if anything differed.
fn diff_into(history: &mut UndoLog, frame: usize, cells: &mut Cells, target: Cells) -> bool {
    let mut changes = Vec::new();
    for (coord, old) in cells.iter() {
        let new = target.get(coord).copied();
        if new != Some(*old) {
            changes.push(VoxelChange {
                frame,
                coord: *coord,
                old: Some(*old),
                new,
            });
        }
    }
    for (coord, new) in target.iter() {
        if !cells.contains_key(coord) {
            changes.push(VoxelChange {
                frame,
                coord: *coord,
                old: None,
                new: Some(*new),
            });
        }
    }

    let changed = !changes.is_empty();
    for change in changes {
        history.record(change);
    }
    *cells = target;
    changed
}
