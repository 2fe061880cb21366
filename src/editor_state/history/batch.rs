//! Undo batches: the atomic unit of undo/redo.

use cgmath::Point3;

use crate::editor_state::voxels::color::Voxel;

/// One reversible voxel write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelChange {
    /// Animation frame the write landed in
    pub frame: usize,
    /// Grid coordinate of the write
    pub coord: Point3<i32>,
    /// Contents before the write
    pub old: Voxel,
    /// Contents after the write
    pub new: Voxel,
}

/// A change of grid bounds made as part of a batch, e.g. by a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reshape {
    /// `(width, height, depth)` before the batch
    pub from: (i32, i32, i32),
    /// `(width, height, depth)` after the batch
    pub to: (i32, i32, i32),
}

/// An ordered group of voxel writes treated as a single undo/redo step.
///
/// Undo replays the changes newest-first writing `old`, redo replays them
/// oldest-first writing `new`. A batch that also changed the grid bounds
/// carries a [`Reshape`]; the bounds are restored before the changes are
/// replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoBatch {
    changes: Vec<VoxelChange>,
    reshape: Option<Reshape>,
}

impl UndoBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a change.
    pub fn push(&mut self, change: VoxelChange) {
        self.changes.push(change);
    }

    /// Records that the batch moved the grid bounds from `from` to `to`.
    ///
    /// Repeated calls keep the first `from` and the last `to`.
    pub fn set_reshape(&mut self, from: (i32, i32, i32), to: (i32, i32, i32)) {
        let from = self.reshape.map_or(from, |r| r.from);
        self.reshape = Some(Reshape { from, to });
    }

    /// The bounds change made by this batch, if any.
    pub fn reshape(&self) -> Option<Reshape> {
        self.reshape
    }

    /// Number of recorded changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// `true` if the batch neither wrote a voxel nor changed the bounds.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.reshape.is_none()
    }

    /// The changes in recording order.
    pub fn changes(&self) -> &[VoxelChange] {
        &self.changes
    }

    /// Iterates the changes in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, VoxelChange> {
        self.changes.iter()
    }

    /// `true` if any change in the batch touched `coord`, in any frame.
    pub fn touches(&self, coord: Point3<i32>) -> bool {
        self.changes.iter().any(|change| change.coord == coord)
    }

    /// Renumbers the frames the changes refer to.
    ///
    /// `map` returns the new index of a frame, or `None` if the frame is gone,
    /// in which case its changes are dropped.
    pub fn remap_frames(&mut self, map: &impl Fn(usize) -> Option<usize>) {
        self.changes.retain_mut(|change| match map(change.frame) {
            Some(frame) => {
                change.frame = frame;
                true
            }
            None => false,
        });
    }
}

impl<'a> IntoIterator for &'a UndoBatch {
    type Item = &'a VoxelChange;
    type IntoIter = std::slice::Iter<'a, VoxelChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
