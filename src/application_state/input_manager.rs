//! # Input Manager
//!
//! Decodes raw pointer input into tool gestures.
//!
//! The host reports two things: button presses/releases, and which voxel (if
//! any) is under the pointer after each move. From those the decoder emits:
//! - `Click` when a button goes down and up over the same voxel
//! - `DragStart` when the pointer reaches a different voxel with the button held
//! - `Drag` for every further voxel entered during the drag
//! - `DragEnd` when the button is released after a drag
//!
//! Only one tool button is tracked at a time; pressing a second button
//! during a gesture is ignored.

use cgmath::Point3;
use winit::event::{ElementState, MouseButton, WindowEvent};

use super::input_state::{tool_button, PointerEvent, RawInputState, ToolEvent};
use crate::editor_state::tools::MouseButtons;

/// Tracks the state of one pointer and turns it into [`PointerEvent`]s.
#[derive(Debug, Default)]
pub struct PointerInput {
    /// The tool button currently driving a gesture
    button: Option<MouseButtons>,
    /// Transition state of that button
    button_state: RawInputState,
    /// The voxel under the pointer, if any
    hover: Option<Point3<i32>>,
    /// The voxel the button went down on
    press_voxel: Option<Point3<i32>>,
    /// The last voxel reported to a drag, while dragging
    drag_voxel: Option<Point3<i32>>,
}

impl PointerInput {
    /// Creates a decoder with no button held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a window event.
    ///
    /// # Returns
    /// The gesture the event completes, if any
    ///
    /// Losing focus abandons the current gesture without emitting anything.
    pub fn intake_input(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::MouseInput { button, state, .. } => self.intake_button(*button, *state),
            WindowEvent::Focused(false) => {
                self.reset();
                None
            }
            _ => None,
        }
    }

    /// Processes a button press or release.
    ///
    /// # Arguments
    /// * `button` - The physical button; only left and right drive tools
    /// * `state` - Whether it went down or up
    ///
    /// # Returns
    /// A click or drag end on release, `None` otherwise
    pub fn intake_button(&mut self, button: MouseButton, state: ElementState) -> Option<PointerEvent> {
        let button = tool_button(button)?;
        if self.button.is_some_and(|held| held != button) {
            return None;
        }

        let previous = self.button_state.is_active();
        self.button_state = RawInputState::from_raw_states(previous, state.is_pressed());

        match self.button_state {
            RawInputState::Pressed => {
                self.button = Some(button);
                self.press_voxel = self.hover;
                self.drag_voxel = None;
                None
            }
            RawInputState::Released => {
                let press_voxel = self.press_voxel.take();
                let drag_voxel = self.drag_voxel.take();
                self.button = None;

                if let Some(world) = drag_voxel {
                    return Some(PointerEvent {
                        kind: ToolEvent::DragEnd,
                        world,
                        button,
                    });
                }
                match (press_voxel, self.hover) {
                    (Some(pressed), Some(released)) if pressed == released => Some(PointerEvent {
                        kind: ToolEvent::Click,
                        world: released,
                        button,
                    }),
                    _ => None,
                }
            }
            RawInputState::Held | RawInputState::NotPressed => None,
        }
    }

    /// Processes a pointer move; `voxel` is whatever is under the pointer now.
    pub fn intake_hover(&mut self, voxel: Option<Point3<i32>>) -> Option<PointerEvent> {
        self.hover = voxel;
        let (Some(button), Some(world)) = (self.button, voxel) else {
            return None;
        };

        let kind = match self.drag_voxel {
            Some(last) if last == world => return None,
            Some(_) => ToolEvent::Drag,
            None if self.press_voxel == Some(world) => return None,
            None => ToolEvent::DragStart,
        };
        self.drag_voxel = Some(world);
        Some(PointerEvent { kind, world, button })
    }

    /// Forgets any gesture in progress.
    pub fn reset(&mut self) {
        self.button = None;
        self.button_state = RawInputState::NotPressed;
        self.press_voxel = None;
        self.drag_voxel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32) -> Option<Point3<i32>> {
        Some(Point3::new(x, 0, 0))
    }

    #[test]
    fn test_press_release_same_voxel_is_click() {
        let mut input = PointerInput::new();
        assert_eq!(input.intake_hover(p(1)), None);
        assert_eq!(input.intake_button(MouseButton::Left, ElementState::Pressed), None);
        let event = input.intake_button(MouseButton::Left, ElementState::Released).unwrap();
        assert_eq!(event.kind, ToolEvent::Click);
        assert_eq!(Some(event.world), p(1));
        assert_eq!(event.button, MouseButtons::Primary);
    }

    #[test]
    fn test_click_on_empty_space_is_ignored() {
        let mut input = PointerInput::new();
        input.intake_hover(None);
        input.intake_button(MouseButton::Right, ElementState::Pressed);
        assert_eq!(input.intake_button(MouseButton::Right, ElementState::Released), None);
    }

    #[test]
    fn test_drag_sequence() {
        let mut input = PointerInput::new();
        input.intake_hover(p(0));
        input.intake_button(MouseButton::Right, ElementState::Pressed);

        // Jitter inside the pressed voxel is not a drag.
        assert_eq!(input.intake_hover(p(0)), None);

        let start = input.intake_hover(p(1)).unwrap();
        assert_eq!(start.kind, ToolEvent::DragStart);
        assert_eq!(start.button, MouseButtons::Secondary);

        assert_eq!(input.intake_hover(p(1)), None);
        assert_eq!(input.intake_hover(None), None);
        assert_eq!(input.intake_hover(p(2)).unwrap().kind, ToolEvent::Drag);

        let end = input.intake_button(MouseButton::Right, ElementState::Released).unwrap();
        assert_eq!(end.kind, ToolEvent::DragEnd);
        assert_eq!(Some(end.world), p(2));
    }

    #[test]
    fn test_moving_without_button_emits_nothing() {
        let mut input = PointerInput::new();
        assert_eq!(input.intake_hover(p(0)), None);
        assert_eq!(input.intake_hover(p(1)), None);
    }

    #[test]
    fn test_second_button_is_ignored() {
        let mut input = PointerInput::new();
        input.intake_hover(p(0));
        input.intake_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(input.intake_button(MouseButton::Right, ElementState::Pressed), None);
        assert_eq!(input.intake_button(MouseButton::Right, ElementState::Released), None);

        let event = input.intake_button(MouseButton::Left, ElementState::Released).unwrap();
        assert_eq!(event.kind, ToolEvent::Click);
        assert_eq!(event.button, MouseButtons::Primary);
    }

    #[test]
    fn test_middle_button_is_not_a_tool_button() {
        let mut input = PointerInput::new();
        input.intake_hover(p(0));
        assert_eq!(input.intake_button(MouseButton::Middle, ElementState::Pressed), None);
        assert_eq!(input.intake_button(MouseButton::Middle, ElementState::Released), None);
    }

    #[test]
    fn test_reset_abandons_gesture() {
        let mut input = PointerInput::new();
        input.intake_hover(p(0));
        input.intake_button(MouseButton::Left, ElementState::Pressed);
        input.reset();
        assert_eq!(input.intake_button(MouseButton::Left, ElementState::Released), None);
    }
}
