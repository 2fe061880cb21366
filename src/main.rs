//! # Zoxel Core Demo
//!
//! Headless walkthrough of an editing session: builds a small model, fills it
//! with both noise modes, then steps back and forth through the history.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- [settings.json]
//! ```

use cgmath::Point3;
use log::{error, info};

use zoxel_core::application_state::EditorSettings;
use zoxel_core::core::Result;
use zoxel_core::editor_state::{tools::MouseButtons, voxels::Color, EditorSession};

fn sample_model(size: i32) -> Vec<(Point3<i32>, Color)> {
    let stone = Color::rgb(128, 128, 128);
    let grass = Color::rgb(64, 160, 64);

    let mut voxels = Vec::new();
    for z in 0..size {
        for x in 0..size {
            voxels.push((Point3::new(x, 0, z), stone));
            voxels.push((Point3::new(x, 1, z), grass));
        }
    }
    voxels
}

fn run(settings: EditorSettings) -> Result<()> {
    let mut session = EditorSession::new(settings);
    let (w, _, d) = session.voxels.dimensions();
    session.load_voxels(sample_model(w.min(d)));
    info!("{}", session.caption());

    session.set_color(Color::rgb(200, 60, 40));
    session.on_mouse_click(Point3::new(0, 1, 0), MouseButtons::Primary)?;
    info!("Brightness fill, refresh {:?}", session.take_refresh());

    session.set_color(Color::rgb(40, 60, 200));
    session.on_mouse_click(Point3::new(0, 0, 0), MouseButtons::Secondary)?;
    info!("Chroma fill, refresh {:?}", session.take_refresh());
    info!("{}", session.caption());

    while session.undo() {}
    info!(
        "Undid everything, {} steps available to redo",
        session.voxels.history().redo_count()
    );
    while session.redo() {}
    info!(
        "Redid everything, {} steps available to undo",
        session.voxels.history().undo_count()
    );
    Ok(())
}

fn main() {
    zoxel_core::init_logging();

    let settings = match std::env::args().nth(1) {
        Some(path) => EditorSettings::load_or_default(path),
        None => EditorSettings::default(),
    };

    if let Err(e) = run(settings) {
        error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
