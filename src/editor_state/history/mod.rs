//! # History Module
//!
//! Linear undo/redo history for voxel edits.
//!
//! Edits are grouped into [`UndoBatch`]es. A tool opens a batch with
//! [`UndoLog::begin_batch`], every recorded write is appended to it, and
//! [`UndoLog::commit_batch`] seals it onto the undo stack. Committing discards
//! the redo stack (standard linear-history semantics).
//!
//! The log itself never touches voxels: [`UndoLog::undo`] and
//! [`UndoLog::redo`] move a batch between the stacks and hand it back so the
//! owning grid can replay it.
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use zoxel_core::editor_state::history::{UndoLog, VoxelChange};
//! use zoxel_core::editor_state::voxels::color::Color;
//!
//! let mut log = UndoLog::new();
//! log.begin_batch().unwrap();
//! log.record(VoxelChange {
//!     frame: 0,
//!     coord: Point3::new(0, 0, 0),
//!     old: None,
//!     new: Some(Color::WHITE),
//! });
//! assert_eq!(log.commit_batch(), 1);
//!
//! let batch = log.undo().unwrap();
//! assert_eq!(batch.len(), 1);
//! assert!(log.can_redo());
//! ```

use log::{debug, warn};

use crate::core::{EditError, Result};

mod batch;

pub use batch::{Reshape, UndoBatch, VoxelChange};

/// Undo/redo stacks plus the batch currently being recorded.
#[derive(Debug)]
pub struct UndoLog {
    /// The batch being recorded, if any.
    open: Option<UndoBatch>,
    /// The open batch is exempt from `auto_commit`.
    atomic: bool,
    /// Committed batches, most recent last.
    undo_stack: Vec<UndoBatch>,
    /// Undone batches, most recently undone last.
    redo_stack: Vec<UndoBatch>,
    /// While `false`, `record` drops changes and batch calls are no-ops.
    enabled: bool,
    /// Maximum number of batches kept on the undo stack.
    limit: Option<usize>,
    /// Seal the open batch once it holds this many changes.
    auto_commit: Option<usize>,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoLog {
    /// Creates an empty, enabled log with unbounded history.
    pub fn new() -> Self {
        Self {
            open: None,
            atomic: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            enabled: true,
            limit: None,
            auto_commit: None,
        }
    }

    /// Caps the number of retained undo batches; the oldest are dropped first.
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
        self.enforce_limit();
    }

    /// Sets the number of queued changes after which an open batch is sealed
    /// and a fresh one started.
    ///
    /// Large fills then become several undo steps, each of which a display
    /// can pick up incrementally. `None` keeps every batch whole.
    pub fn set_auto_commit(&mut self, threshold: Option<usize>) {
        self.auto_commit = threshold.filter(|t| *t > 0);
    }

    /// Starts collecting a new batch.
    ///
    /// While history is disabled this is a no-op that always succeeds.
    ///
    /// # Errors
    /// [`EditError::InvalidState`] if a batch is already open. Batches do not
    /// nest; a second open batch means two edits are racing on one grid.
    pub fn begin_batch(&mut self) -> Result<()> {
        self.open_new(false)
    }

    /// Starts a batch that is never split by the auto-commit threshold.
    ///
    /// Used for edits that are only consistent as a whole, such as rotations
    /// that also change the grid bounds.
    ///
    /// # Errors
    /// [`EditError::InvalidState`] if a batch is already open.
    pub fn begin_atomic_batch(&mut self) -> Result<()> {
        self.open_new(true)
    }

    fn open_new(&mut self, atomic: bool) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.open.is_some() {
            warn!("begin_batch called while a batch is already open");
            return Err(EditError::InvalidState(
                "an undo batch is already open".to_string(),
            ));
        }
        self.open = Some(UndoBatch::new());
        self.atomic = atomic;
        Ok(())
    }

    /// Appends a change to the open batch.
    ///
    /// With no open batch the change is committed on its own as a single-step
    /// batch. Pairs where `old == new` are recorded as given; filtering them
    /// is the caller's job.
    ///
    /// # Arguments
    /// * `change` - The write to record, with the cell contents before and after
    pub fn record(&mut self, change: VoxelChange) {
        if !self.enabled {
            return;
        }

        let Some(batch) = self.open.as_mut() else {
            let mut single = UndoBatch::new();
            single.push(change);
            self.push_batch(single);
            return;
        };

        batch.push(change);
        let threshold_reached =
            !self.atomic && self.auto_commit.is_some_and(|t| batch.len() >= t);
        if threshold_reached {
            if let Some(full) = self.open.as_mut().map(std::mem::take) {
                self.push_batch(full);
            }
        }
    }

    /// Notes on the open batch that it moved the grid bounds.
    ///
    /// Ignored while history is disabled or when no batch is open.
    pub fn record_reshape(&mut self, from: (i32, i32, i32), to: (i32, i32, i32)) {
        if !self.enabled || from == to {
            return;
        }
        match self.open.as_mut() {
            Some(batch) => batch.set_reshape(from, to),
            None => warn!("Bounds change recorded without an open batch, ignoring"),
        }
    }

    /// Seals the open batch onto the undo stack.
    ///
    /// Empty batches are discarded without touching either stack, and calling
    /// this with no open batch is a no-op.
    ///
    /// # Returns
    /// The number of voxel changes committed
    pub fn commit_batch(&mut self) -> usize {
        self.atomic = false;
        match self.open.take() {
            Some(batch) if !batch.is_empty() => {
                let len = batch.len();
                self.push_batch(batch);
                len
            }
            Some(_) => {
                debug!("Discarding empty undo batch");
                0
            }
            None => 0,
        }
    }

    /// Renumbers the frames every stored change refers to, after frames were
    /// inserted or deleted.
    ///
    /// # Arguments
    /// * `map` - New index for an old frame index, `None` if the frame is gone
    ///
    /// Batches left with nothing to replay are dropped from both stacks.
    pub fn remap_frames(&mut self, map: impl Fn(usize) -> Option<usize>) {
        for batch in self
            .undo_stack
            .iter_mut()
            .chain(self.redo_stack.iter_mut())
            .chain(self.open.iter_mut())
        {
            batch.remap_frames(&map);
        }
        self.undo_stack.retain(|batch| !batch.is_empty());
        self.redo_stack.retain(|batch| !batch.is_empty());
    }

    /// Moves the most recent batch to the redo stack and returns it so the
    /// caller can restore the `old` values, newest change first.
    ///
    /// Returns `None` when there is nothing to undo or a batch is still being
    /// recorded.
    pub fn undo(&mut self) -> Option<&UndoBatch> {
        if self.open.is_some() {
            warn!("undo requested while a batch is open, ignoring");
            return None;
        }
        let batch = self.undo_stack.pop()?;
        debug!("Undo batch of {} changes", batch.len());
        self.redo_stack.push(batch);
        self.redo_stack.last()
    }

    /// Moves the most recently undone batch back to the undo stack and
    /// returns it so the caller can re-apply the `new` values in order.
    pub fn redo(&mut self) -> Option<&UndoBatch> {
        if self.open.is_some() {
            warn!("redo requested while a batch is open, ignoring");
            return None;
        }
        let batch = self.redo_stack.pop()?;
        debug!("Redo batch of {} changes", batch.len());
        self.undo_stack.push(batch);
        self.undo_stack.last()
    }

    /// Suspends recording, e.g. while bulk-loading a model.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Resumes recording.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// `true` while changes are being recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `true` between `begin_batch` and `commit_batch`.
    pub fn is_batch_open(&self) -> bool {
        self.open.is_some()
    }

    /// The batch currently being recorded.
    pub fn open_batch(&self) -> Option<&UndoBatch> {
        self.open.as_ref()
    }

    /// The most recently committed batch.
    pub fn last_committed(&self) -> Option<&UndoBatch> {
        self.undo_stack.last()
    }

    /// `true` if there is at least one batch to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// `true` if there is at least one batch to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable batches.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable batches.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drops all history, including any open batch.
    pub fn clear(&mut self) {
        self.open = None;
        self.atomic = false;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_batch(&mut self, batch: UndoBatch) {
        debug!("Committed undo batch of {} changes", batch.len());
        self.redo_stack.clear();
        self.undo_stack.push(batch);
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.undo_stack.len() > limit {
                let excess = self.undo_stack.len() - limit;
                self.undo_stack.drain(0..excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor_state::voxels::color::Color;
    use cgmath::Point3;

    fn write(x: i32) -> VoxelChange {
        VoxelChange {
            frame: 0,
            coord: Point3::new(x, 0, 0),
            old: None,
            new: Some(Color::WHITE),
        }
    }

    fn committed(log: &mut UndoLog, n: i32) {
        log.begin_batch().unwrap();
        for x in 0..n {
            log.record(write(x));
        }
        log.commit_batch();
    }

    #[test]
    fn test_new_log_is_empty() {
        let log = UndoLog::new();
        assert!(!log.can_undo());
        assert!(!log.can_redo());
        assert!(log.is_enabled());
        assert!(!log.is_batch_open());
    }

    #[test]
    fn test_nested_begin_is_invalid_state() {
        let mut log = UndoLog::new();
        log.begin_batch().unwrap();
        let err = log.begin_batch().unwrap_err();
        assert!(matches!(err, EditError::InvalidState(_)));

        // The first batch is still usable.
        log.record(write(0));
        assert_eq!(log.commit_batch(), 1);
        assert!(log.begin_batch().is_ok());
    }

    #[test]
    fn test_batch_is_one_undo_step() {
        let mut log = UndoLog::new();
        committed(&mut log, 5);
        assert_eq!(log.undo_count(), 1);

        let batch = log.undo().unwrap();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.changes()[0].coord, Point3::new(0, 0, 0));
        assert!(log.undo().is_none());
        assert_eq!(log.redo_count(), 1);
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut log = UndoLog::new();
        committed(&mut log, 1);
        committed(&mut log, 2);
        log.undo();
        assert!(log.can_redo());

        committed(&mut log, 3);
        assert!(!log.can_redo());
        assert_eq!(log.undo_count(), 2);
    }

    #[test]
    fn test_empty_commit_is_discarded() {
        let mut log = UndoLog::new();
        committed(&mut log, 1);
        log.undo();

        log.begin_batch().unwrap();
        assert_eq!(log.commit_batch(), 0);
        assert_eq!(log.undo_count(), 0);
        // Redo history survives an empty commit.
        assert!(log.can_redo());
    }

    #[test]
    fn test_undo_redo_on_empty_stacks_are_noops() {
        let mut log = UndoLog::new();
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());
        assert_eq!(log.commit_batch(), 0);
    }

    #[test]
    fn test_disabled_log_drops_records() {
        let mut log = UndoLog::new();
        log.disable();
        assert!(log.begin_batch().is_ok());
        assert!(log.begin_batch().is_ok());
        log.record(write(0));
        assert_eq!(log.commit_batch(), 0);
        assert!(!log.can_undo());

        log.enable();
        committed(&mut log, 1);
        assert!(log.can_undo());
    }

    #[test]
    fn test_record_without_batch_commits_single_step() {
        let mut log = UndoLog::new();
        log.record(write(0));
        log.record(write(1));
        assert_eq!(log.undo_count(), 2);
    }

    #[test]
    fn test_auto_commit_splits_large_batches() {
        let mut log = UndoLog::new();
        log.set_auto_commit(Some(4));
        log.begin_batch().unwrap();
        for x in 0..10 {
            log.record(write(x));
        }
        assert!(log.is_batch_open());
        assert_eq!(log.undo_count(), 2);
        assert_eq!(log.commit_batch(), 2);
        assert_eq!(log.undo_count(), 3);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut log = UndoLog::new();
        log.set_limit(Some(3));
        for n in 1..=5 {
            committed(&mut log, n);
        }
        assert_eq!(log.undo_count(), 3);
        assert_eq!(log.undo().unwrap().len(), 5);
        assert_eq!(log.undo().unwrap().len(), 4);
        assert_eq!(log.undo().unwrap().len(), 3);
        assert!(log.undo().is_none());
    }

    #[test]
    fn test_undo_refused_while_batch_open() {
        let mut log = UndoLog::new();
        committed(&mut log, 1);
        log.begin_batch().unwrap();
        assert!(log.undo().is_none());
        assert_eq!(log.undo_count(), 1);
    }

    #[test]
    fn test_atomic_batch_ignores_auto_commit() {
        let mut log = UndoLog::new();
        log.set_auto_commit(Some(2));
        log.begin_atomic_batch().unwrap();
        for x in 0..5 {
            log.record(write(x));
        }
        assert_eq!(log.undo_count(), 0);
        assert_eq!(log.commit_batch(), 5);

        // The next ordinary batch is split again.
        committed(&mut log, 5);
        assert_eq!(log.undo_count(), 4);
    }

    #[test]
    fn test_reshape_alone_is_committed() {
        let mut log = UndoLog::new();
        log.begin_atomic_batch().unwrap();
        log.record_reshape((1, 2, 3), (3, 2, 1));
        assert_eq!(log.commit_batch(), 0);
        assert!(log.can_undo());

        // A no-op reshape leaves the batch empty.
        log.begin_batch().unwrap();
        log.record_reshape((2, 2, 2), (2, 2, 2));
        log.commit_batch();
        assert_eq!(log.undo_count(), 1);
    }

    #[test]
    fn test_remap_frames_drops_emptied_batches() {
        let mut log = UndoLog::new();
        log.record(VoxelChange { frame: 1, ..write(0) });
        log.record(VoxelChange { frame: 2, ..write(1) });
        log.undo();

        log.remap_frames(|f| if f == 1 { None } else { Some(f - 1) });
        assert_eq!(log.undo_count(), 0);
        let batch = log.redo().unwrap();
        assert_eq!(batch.changes()[0].frame, 1);
    }
}
