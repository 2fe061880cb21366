//! # Input State
//!
//! The input state types shared by the pointer decoder and the editor:
//! button transitions, the tool events they decode into, and the mapping
//! from window-system buttons to tool buttons.

use cgmath::Point3;
use winit::event::MouseButton;

use crate::editor_state::tools::MouseButtons;

/// Represents the state of a button between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Button is not pressed
    #[default]
    NotPressed,
    /// Button was just pressed
    Pressed,
    /// Button was already down and is still down
    Held,
    /// Button was just released
    Released,
}

impl RawInputState {
    /// Determines if the button is down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Derives the transition from the previous and current raw states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// The gesture a tool is asked to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEvent {
    /// Press and release on the same voxel
    Click,
    /// The pointer left the pressed voxel with the button held
    DragStart,
    /// The pointer entered another voxel during a drag
    Drag,
    /// The button was released after a drag
    DragEnd,
}

/// A decoded pointer gesture, ready to dispatch to the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// What happened
    pub kind: ToolEvent,
    /// The voxel under the pointer when it happened
    pub world: Point3<i32>,
    /// The button involved
    pub button: MouseButtons,
}

/// Maps a window-system button to a tool button. Only left and right
/// buttons drive tools.
pub fn tool_button(button: MouseButton) -> Option<MouseButtons> {
    match button {
        MouseButton::Left => Some(MouseButtons::Primary),
        MouseButton::Right => Some(MouseButtons::Secondary),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert_eq!(RawInputState::from_raw_states(false, false), RawInputState::NotPressed);
        assert!(RawInputState::Held.is_active());
        assert!(!RawInputState::Released.is_active());
    }

    #[test]
    fn test_tool_buttons() {
        assert_eq!(tool_button(MouseButton::Left), Some(MouseButtons::Primary));
        assert_eq!(tool_button(MouseButton::Right), Some(MouseButtons::Secondary));
        assert_eq!(tool_button(MouseButton::Middle), None);
        assert_eq!(tool_button(MouseButton::Other(7)), None);
    }
}
