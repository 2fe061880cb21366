//! # Editor State Module
//!
//! The editing session: one voxel model, its history, the drawing tools and
//! the host-supplied paint parameters.
//!
//! ## Key Components
//!
//! * `EditorSession` - The state container handed to every event handler
//! * `voxels` - The voxel grid, colors and neighbourhood helpers
//! * `history` - Undo/redo batches
//! * `tools` - The tool trait, registry, flood fill and the noisy fill tool
//!
//! ## Threading
//!
//! A session is driven from one event thread and needs no locking there.
//! When it has to be shared with background or batch work, wrap it in a
//! [`SharedSession`]: every edit then runs under a single write guard, which
//! also keeps undo batches from interleaving.
//!
//! ## Example
//!
//! ```rust
//! use cgmath::Point3;
//! use zoxel_core::application_state::EditorSettings;
//! use zoxel_core::editor_state::{tools::MouseButtons, voxels::Color, EditorSession};
//!
//! let mut session = EditorSession::new(EditorSettings::default());
//! session.load_voxels([(Point3::new(0, 0, 0), Color::rgb(255, 0, 0))]);
//! session.set_color(Color::rgb(0, 0, 255));
//! session.set_intensity(0.0);
//!
//! session.on_mouse_click(Point3::new(0, 0, 0), MouseButtons::Primary).unwrap();
//! assert_eq!(session.voxels.get(Point3::new(0, 0, 0)), Some(Color::rgb(0, 0, 255)));
//!
//! session.undo();
//! assert_eq!(session.voxels.get(Point3::new(0, 0, 0)), Some(Color::rgb(255, 0, 0)));
//! ```

use std::path::{Path, PathBuf};

use cgmath::Point3;
use log::info;

use crate::application_state::input_state::{PointerEvent, ToolEvent};
use crate::application_state::settings::EditorSettings;
use crate::core::{MtResource, Result};

pub mod history;
pub mod tools;
pub mod voxels;

use tools::{MouseButtons, ToolRegistry, ToolTarget};
use voxels::{Color, RefreshHint, VoxelGrid};

/// An editing session shared across threads.
pub type SharedSession = MtResource<EditorSession>;

/// Everything one open model needs while being edited.
pub struct EditorSession {
    /// The model being edited, with its undo history
    pub voxels: VoxelGrid,
    /// The available drawing tools
    pub tools: ToolRegistry,
    /// Current paint color
    color: Color,
    /// Current tool intensity in `[0, 1]`
    intensity: f32,
    /// Preferences the session was created from, kept up to date
    settings: EditorSettings,
    /// Where the model was last saved, if anywhere
    filename: Option<PathBuf>,
}

impl EditorSession {
    /// Creates a session with an empty model sized from `settings`.
    ///
    /// # Arguments
    /// * `settings` - Model size, undo limits, paint defaults and noise seed
    ///
    /// # Returns
    /// A session with the fill tool active and an empty history
    pub fn new(settings: EditorSettings) -> Self {
        let mut voxels = VoxelGrid::new(
            settings.default_model_width,
            settings.default_model_height,
            settings.default_model_depth,
        );
        voxels.history_mut().set_limit(settings.undo_limit);
        voxels.history_mut().set_auto_commit(settings.undo_auto_commit);

        let (w, h, d) = voxels.dimensions();
        info!("Editor session created with a {}x{}x{} model", w, h, d);

        EditorSession {
            voxels,
            tools: ToolRegistry::with_defaults(&settings),
            color: settings.default_color,
            intensity: clamp_intensity(settings.fill_intensity),
            settings,
            filename: None,
        }
    }

    /// Wraps the session for use from several threads.
    pub fn into_shared(self) -> SharedSession {
        MtResource::new(self)
    }

    /// The current paint color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the paint color, e.g. after a palette pick.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// The current tool intensity.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Sets the tool intensity.
    ///
    /// # Arguments
    /// * `intensity` - Noise strength, clamped to `[0, 1]`; NaN becomes 0
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = clamp_intensity(intensity);
        self.settings.fill_intensity = self.intensity;
    }

    /// The session's settings, including changes made while editing.
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Dispatches a decoded pointer gesture to the active tool.
    ///
    /// # Arguments
    /// * `event` - The gesture, its target voxel and the button that made it
    ///
    /// # Returns
    /// `Ok(false)` if no tool is active, `Ok(true)` once the tool handled it
    ///
    /// # Errors
    /// Whatever the tool reports, e.g. [`crate::core::EditError::InvalidState`]
    /// when an undo batch is already open
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<bool> {
        let Some(tool) = self.tools.active_mut() else {
            return Ok(false);
        };
        let mut target = ToolTarget {
            voxels: &mut self.voxels,
            world: event.world,
            mouse_button: event.button,
            color: self.color,
            intensity: self.intensity,
        };
        match event.kind {
            ToolEvent::Click => tool.on_mouse_click(&mut target)?,
            ToolEvent::DragStart => tool.on_drag_start(&mut target)?,
            ToolEvent::Drag => tool.on_drag(&mut target)?,
            ToolEvent::DragEnd => tool.on_drag_end(&mut target)?,
        }
        Ok(true)
    }

    /// Sends a click on `world` to the active tool.
    pub fn on_mouse_click(&mut self, world: Point3<i32>, button: MouseButtons) -> Result<bool> {
        self.handle_pointer(PointerEvent {
            kind: ToolEvent::Click,
            world,
            button,
        })
    }

    /// Reverts the last edit. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.voxels.undo()
    }

    /// Re-applies the last undone edit. Returns `false` if there was nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        self.voxels.redo()
    }

    /// Replaces the model with `voxels`.
    ///
    /// Undo recording is suspended for the load, so the loaded model is the
    /// new bottom of the history, and the result counts as saved.
    ///
    /// # Arguments
    /// * `voxels` - Coordinates and colors of the new model
    ///
    /// # Returns
    /// The number of voxels stored; anything outside the bounds is dropped
    pub fn load_voxels<I>(&mut self, voxels: I) -> usize
    where
        I: IntoIterator<Item = (Point3<i32>, Color)>,
    {
        self.voxels.clear();
        self.voxels.history_mut().disable();
        for (coord, color) in voxels {
            self.voxels.set(coord, Some(color), false, RefreshHint::Minor);
        }
        self.voxels.history_mut().enable();
        self.voxels.saved();

        let loaded = self.voxels.len();
        info!("Loaded {} voxels", loaded);
        loaded
    }

    /// Changes the model bounds and remembers them as the default size for
    /// new models.
    ///
    /// # Arguments
    /// * `width`, `height`, `depth` - New bounds; negative values become 0
    pub fn resize(&mut self, width: i32, height: i32, depth: i32) {
        self.voxels.resize(width, height, depth);
        let (w, h, d) = self.voxels.dimensions();
        self.settings.default_model_width = w;
        self.settings.default_model_height = h;
        self.settings.default_model_depth = d;
        info!("Resized model to {}x{}x{}", w, h, d);
    }

    /// Starts a fresh, empty, unnamed model of the current size.
    pub fn new_model(&mut self) {
        self.voxels.clear();
        self.voxels.saved();
        self.filename = None;
    }

    /// Records that the model was saved to `path`.
    pub fn mark_saved(&mut self, path: impl AsRef<Path>) {
        self.filename = Some(path.as_ref().to_path_buf());
        self.voxels.saved();
    }

    /// Where the model was last saved.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// The repaint the display owes since it last asked.
    pub fn take_refresh(&mut self) -> RefreshHint {
        self.voxels.take_refresh()
    }

    /// Window title for the session, e.g. `Zoxel - [Unsaved model] *`.
    pub fn caption(&self) -> String {
        let mut caption = match &self.filename {
            Some(path) => format!("Zoxel - [{}]", path.display()),
            None => "Zoxel - [Unsaved model]".to_string(),
        };
        if self.voxels.is_changed() {
            caption.push_str(" *");
        }
        caption
    }
}

fn clamp_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn session_with_red_block(n: i32) -> EditorSession {
        let settings = EditorSettings {
            noise_seed: Some(1),
            ..EditorSettings::default()
        };
        let mut session = EditorSession::new(settings);
        let mut cells = Vec::new();
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    cells.push((Point3::new(x, y, z), RED));
                }
            }
        }
        session.load_voxels(cells);
        session
    }

    #[test]
    fn test_load_is_saved_and_not_undoable() {
        let mut session = session_with_red_block(2);
        assert_eq!(session.voxels.len(), 8);
        assert!(!session.voxels.is_changed());
        assert!(!session.undo());
        assert!(session.voxels.history().is_enabled());
    }

    #[test]
    fn test_click_fills_and_undoes() {
        let mut session = session_with_red_block(3);
        session.set_color(BLUE);
        session.set_intensity(0.0);

        assert!(session.on_mouse_click(Point3::new(1, 1, 1), MouseButtons::Primary).unwrap());
        assert!(session.voxels.iter().all(|(_, c)| c == BLUE));
        assert_eq!(session.take_refresh(), RefreshHint::Full);
        assert!(session.caption().ends_with(" *"));

        assert!(session.undo());
        assert!(session.voxels.iter().all(|(_, c)| c == RED));
        assert!(session.redo());
        assert!(session.voxels.iter().all(|(_, c)| c == BLUE));
    }

    #[test]
    fn test_click_on_empty_space_does_nothing() {
        let mut session = session_with_red_block(2);
        assert!(session.on_mouse_click(Point3::new(5, 5, 5), MouseButtons::Secondary).unwrap());
        assert!(!session.voxels.is_changed());
        assert!(!session.voxels.history().can_undo());
    }

    #[test]
    fn test_no_active_tool_ignores_events() {
        let mut session = session_with_red_block(2);
        session.tools.deactivate();
        assert!(!session.on_mouse_click(Point3::new(0, 0, 0), MouseButtons::Primary).unwrap());
        assert!(!session.voxels.is_changed());
    }

    #[test]
    fn test_drag_events_are_ignored_by_fill() {
        let mut session = session_with_red_block(2);
        let handled = session
            .handle_pointer(PointerEvent {
                kind: ToolEvent::DragStart,
                world: Point3::new(0, 0, 0),
                button: MouseButtons::Primary,
            })
            .unwrap();
        assert!(handled);
        assert!(!session.voxels.is_changed());
    }

    #[test]
    fn test_intensity_is_clamped_and_remembered() {
        let mut session = session_with_red_block(1);
        session.set_intensity(4.0);
        assert_eq!(session.intensity(), 1.0);
        assert_eq!(session.settings().fill_intensity, 1.0);
    }

    #[test]
    fn test_resize_updates_default_dimensions() {
        let mut session = session_with_red_block(4);
        session.resize(2, 3, 2);
        assert_eq!(session.voxels.dimensions(), (2, 3, 2));
        assert_eq!(session.voxels.len(), 2 * 3 * 2);
        assert_eq!(session.settings().default_model_height, 3);
    }

    #[test]
    fn test_caption_tracks_file_and_changes() {
        let mut session = session_with_red_block(1);
        assert_eq!(session.caption(), "Zoxel - [Unsaved model]");

        session.voxels.set(Point3::new(0, 0, 0), Some(BLUE), true, RefreshHint::Full);
        assert_eq!(session.caption(), "Zoxel - [Unsaved model] *");

        session.mark_saved("model.zox");
        assert_eq!(session.caption(), "Zoxel - [model.zox]");

        session.new_model();
        assert!(session.voxels.is_empty());
        assert_eq!(session.caption(), "Zoxel - [Unsaved model]");
    }

    #[test]
    fn test_shared_session_serializes_fills() {
        let mut session = EditorSession::new(EditorSettings::default());
        let mut cells = Vec::new();
        for x in 0..8 {
            // Two separate rows so each thread fills its own region.
            cells.push((Point3::new(x, 0, 0), RED));
            cells.push((Point3::new(x, 2, 0), RED));
        }
        session.load_voxels(cells);
        session.set_color(BLUE);
        session.set_intensity(0.0);
        let shared = session.into_shared();

        let handles: Vec<_> = [0, 2]
            .into_iter()
            .map(|y| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared.with_mut(|s| s.on_mouse_click(Point3::new(0, y, 0), MouseButtons::Primary))
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().unwrap());
        }

        let session = shared.get();
        assert!(session.voxels.iter().all(|(_, c)| c == BLUE));
        assert_eq!(session.voxels.history().undo_count(), 2);
    }
}
