use crate::error::LevelError;
use crate::geometry::Vec2;

use super::input::{ActionStates, EdgeStates, InputAction, KeyEdge};
use super::rendering::DrawList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
    /// Start the companion program and close this one.
    LaunchCompanion,
}

/// Input sampled once per simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    edges: EdgeStates,
    cursor_position_px: Option<Vec2>,
    left_mouse_down: bool,
    right_mouse_down: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        edges: EdgeStates,
        cursor_position_px: Option<Vec2>,
        left_mouse_down: bool,
        right_mouse_down: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            edges,
            cursor_position_px,
            left_mouse_down,
            right_mouse_down,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn pressed(&self, edge: KeyEdge) -> bool {
        self.edges.was_pressed(edge)
    }

    /// Cursor in framebuffer pixels; `None` when outside the drawable area.
    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_mouse_down(&self) -> bool {
        self.left_mouse_down
    }

    pub fn right_mouse_down(&self) -> bool {
        self.right_mouse_down
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_pressed(mut self, edge: KeyEdge) -> Self {
        self.edges.set_pressed(edge, true);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_mouse_down(mut self, left: bool, right: bool) -> Self {
        self.left_mouse_down = left;
        self.right_mouse_down = right;
        self
    }
}

pub trait Scene {
    /// Called once before the first tick. An error aborts startup.
    fn load(&mut self) -> Result<(), LevelError>;
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn render(&self, draw_list: &mut DrawList);
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_actions_edges_and_mouse() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::Jump, true)
            .with_pressed(KeyEdge::Confirm)
            .with_cursor_position_px(Some(Vec2::new(3.0, 4.0)))
            .with_mouse_down(true, false);

        assert!(snapshot.is_down(InputAction::Jump));
        assert!(!snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.pressed(KeyEdge::Confirm));
        assert!(!snapshot.pressed(KeyEdge::Back));
        assert_eq!(snapshot.cursor_position_px(), Some(Vec2::new(3.0, 4.0)));
        assert!(snapshot.left_mouse_down());
        assert!(!snapshot.right_mouse_down());
    }
}
