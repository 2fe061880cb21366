//! # Voxels Module
//!
//! The voxel model being edited.
//!
//! ## Architecture
//!
//! * **Color**: Packed RGBA cell contents and HSV helpers used by the painting tools
//! * **Grid**: The bounded, sparse 3D grid with its animation frames, transforms and undo history
//! * **Neighbors**: The six face directions and the 6-connected neighbourhood
//!
//! ## Data Flow
//!
//! 1. A tool reads cells through `VoxelGrid::get` (out-of-bounds reads are empty)
//! 2. It writes through `VoxelGrid::set`, asking for the write to be recorded
//! 3. Recorded writes land in the grid's open undo batch
//! 4. The host polls `VoxelGrid::take_refresh` to decide how much to repaint

pub mod color;
pub mod grid;
pub mod neighbors;

pub use color::{Color, Voxel};
pub use grid::{Axis, RefreshHint, RefreshListener, VoxelGrid};
