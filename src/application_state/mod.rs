//! # Application State Management
//!
//! Host-facing plumbing around an editing session:
//! - Persisted editor settings
//! - Pointer input decoding into tool gestures
//!
//! Windowing, rendering and dialogs belong to the host application; this
//! module only covers the parts whose behaviour the session depends on.

pub mod input_manager;
pub mod input_state;
pub mod settings;

pub use input_manager::PointerInput;
pub use input_state::{PointerEvent, ToolEvent};
pub use settings::EditorSettings;
