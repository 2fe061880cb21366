//! # Tools Module
//!
//! Drawing tools and the registry the editor picks the active one from.
//!
//! ## Key Components
//!
//! * `Tool` - The capability set every drawing tool implements: click and drag
//!   handlers receiving a [`ToolTarget`]
//! * `ToolRegistry` - A static, priority-ordered set of tools populated at
//!   startup, with one optionally active tool
//! * `flood_fill` - Connected-region search and recolouring
//! * `fill_noise` - The noisy fill tool built on top of it
//!
//! ## Reloading
//!
//! Tools are plain Rust types registered at startup. Reloading means
//! rebuilding the registry (see [`ToolRegistry::rebuild`]), never swapping
//! code at runtime.

use cgmath::Point3;
use log::{info, warn};

use crate::application_state::settings::EditorSettings;
use crate::core::{EditError, Result};
use crate::editor_state::voxels::{color::Color, grid::VoxelGrid};

pub mod fill_noise;
pub mod flood_fill;

use fill_noise::FillNoiseTool;

/// The pointer buttons tools react to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButtons {
    /// Usually the left button
    Primary,
    /// Usually the right button
    Secondary,
}

/// Everything a tool needs to act on one pointer event.
pub struct ToolTarget<'a> {
    /// The model being edited
    pub voxels: &'a mut VoxelGrid,
    /// The voxel under the pointer
    pub world: Point3<i32>,
    /// The button that triggered the event
    pub mouse_button: MouseButtons,
    /// The host's current paint color
    pub color: Color,
    /// The host's current tool intensity in `[0, 1]`
    pub intensity: f32,
}

/// A drawing tool.
///
/// Every handler defaults to doing nothing, so a tool only implements the
/// events it cares about.
pub trait Tool: Send + Sync {
    /// Unique name, used for activation.
    fn name(&self) -> &str;

    /// Short help text.
    fn description(&self) -> &str {
        ""
    }

    /// Toolbar ordering; lower comes first.
    fn priority(&self) -> i32 {
        0
    }

    /// A press and release on the same voxel.
    fn on_mouse_click(&mut self, _target: &mut ToolTarget<'_>) -> Result<()> {
        Ok(())
    }

    /// The pointer moved to another voxel with a button held.
    fn on_drag_start(&mut self, _target: &mut ToolTarget<'_>) -> Result<()> {
        Ok(())
    }

    /// Each further voxel entered during a drag.
    fn on_drag(&mut self, _target: &mut ToolTarget<'_>) -> Result<()> {
        Ok(())
    }

    /// The button was released after a drag.
    fn on_drag_end(&mut self, _target: &mut ToolTarget<'_>) -> Result<()> {
        Ok(())
    }
}

/// The set of available tools, ordered by priority.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    active: Option<String>,
}

impl ToolRegistry {
    /// Creates an empty registry with no active tool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in tools, with the fill tool
    /// active.
    pub fn with_defaults(settings: &EditorSettings) -> Self {
        let mut registry = Self::new();
        registry.register_defaults(settings);
        registry
    }

    fn register_defaults(&mut self, settings: &EditorSettings) {
        let fill = match settings.noise_seed {
            Some(seed) => FillNoiseTool::with_seed(seed),
            None => FillNoiseTool::new(),
        };
        self.register(Box::new(fill), true);
    }

    /// Adds a tool, keeping the list ordered by priority. Tools with equal
    /// priority keep registration order. A tool with the same name as an
    /// existing one replaces it.
    ///
    /// # Arguments
    /// * `tool` - The tool to add
    /// * `activate` - Make the tool active right away
    pub fn register(&mut self, tool: Box<dyn Tool>, activate: bool) {
        let name = tool.name().to_string();
        if let Some(existing) = self.tools.iter().position(|t| t.name() == name) {
            info!("Replacing tool {}", name);
            self.tools.remove(existing);
        }

        let at = self
            .tools
            .iter()
            .position(|t| t.priority() > tool.priority())
            .unwrap_or(self.tools.len());
        self.tools.insert(at, tool);
        info!("Registered tool {}", name);

        if activate {
            self.active = Some(name);
        }
    }

    /// Makes the named tool active.
    ///
    /// # Arguments
    /// * `name` - The tool's [`Tool::name`]
    ///
    /// # Errors
    /// [`EditError::UnknownTool`] if no such tool is registered; the active
    /// tool is left unchanged.
    pub fn activate(&mut self, name: &str) -> Result<()> {
        if !self.tools.iter().any(|t| t.name() == name) {
            warn!("Cannot activate unknown tool {}", name);
            return Err(EditError::UnknownTool(name.to_string()));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    /// Leaves no tool active; pointer events are then ignored.
    pub fn deactivate(&mut self) {
        self.active = None;
    }

    /// Name of the active tool.
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active tool.
    pub fn active(&self) -> Option<&dyn Tool> {
        let name = self.active.as_deref()?;
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// The active tool, mutably.
    pub fn active_mut(&mut self) -> Option<&mut (dyn Tool + 'static)> {
        let name = self.active.as_deref()?;
        let tool = self.tools.iter_mut().find(|t| t.name() == name)?;
        Some(tool.as_mut())
    }

    /// Tool names in toolbar order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// `true` if no tool is registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Drops every tool and registers the built-ins again.
    ///
    /// The previously active tool stays active if a tool of that name still
    /// exists afterwards.
    pub fn rebuild(&mut self, settings: &EditorSettings) {
        let previous = self.active.take();
        self.tools.clear();
        self.register_defaults(settings);
        if let Some(name) = previous {
            if self.tools.iter().any(|t| t.name() == name) {
                self.active = Some(name);
            }
        }
        info!("Rebuilt tool registry with {} tools", self.tools.len());
    }
}
