#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Zoxel Core
//!
//! The editing core of a voxel model editor: a bounded voxel grid with
//! batched undo, a 6-connected flood fill, and the noisy fill tool built on it.
//!
//! Rendering, file formats and the window shell are left to the host. The
//! host feeds pointer input in, reads the grid and refresh hints out, and
//! owns the current paint color and intensity.
//!
//! ## Key Modules
//!
//! * `application_state` - Host-facing glue: settings and pointer decoding
//! * `core` - Error types and the shared-ownership wrapper
//! * `editor_state` - The editing session, voxel grid, history and tools
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use zoxel_core::application_state::EditorSettings;
//! use zoxel_core::editor_state::{tools::MouseButtons, voxels::Color, EditorSession};
//!
//! zoxel_core::init_logging();
//!
//! let mut session = EditorSession::new(EditorSettings::default());
//! session.load_voxels([(Point3::new(0, 0, 0), Color::WHITE)]);
//! session.set_color(Color::rgb(255, 0, 0));
//! session.on_mouse_click(Point3::new(0, 0, 0), MouseButtons::Secondary).unwrap();
//! assert!(session.voxels.history().can_undo());
//! ```

use log::info;

pub mod application_state;
pub mod core;
pub mod editor_state;

/// Installs the stdout logger, filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs a logger.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let installed = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();

    if installed {
        info!("Logger initialized");
    }
}
