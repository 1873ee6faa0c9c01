/// Held keys, sampled as level state every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
}

const ACTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
        }
    }
}

/// Keys that act once per press. A held key reports a single edge until it
/// is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEdge {
    /// Escape: toggles pause during a run, quits from a menu.
    Back,
    /// Leaves a paused run for the main menu.
    MainMenu,
    Confirm,
    Restart,
    Save,
    Load,
    NextLevel,
    PreviousLevel,
    OpenEditor,
    OpenGame,
}

const EDGE_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EdgeStates {
    held: [bool; EDGE_COUNT],
    pressed: [bool; EDGE_COUNT],
}

impl EdgeStates {
    pub(crate) fn handle(&mut self, edge: KeyEdge, is_down: bool) {
        let index = edge.index();
        if is_down && !self.held[index] {
            self.pressed[index] = true;
        }
        self.held[index] = is_down;
    }

    pub(crate) fn set_pressed(&mut self, edge: KeyEdge, pressed: bool) {
        self.pressed[edge.index()] = pressed;
    }

    pub(crate) fn was_pressed(&self, edge: KeyEdge) -> bool {
        self.pressed[edge.index()]
    }

    /// Copy of the pending edges; the pending set is cleared.
    pub(crate) fn take_pressed(&mut self) -> Self {
        let taken = Self {
            held: self.held,
            pressed: self.pressed,
        };
        self.pressed = [false; EDGE_COUNT];
        taken
    }
}

impl KeyEdge {
    const fn index(self) -> usize {
        match self {
            KeyEdge::Back => 0,
            KeyEdge::Confirm => 1,
            KeyEdge::Restart => 2,
            KeyEdge::Save => 3,
            KeyEdge::Load => 4,
            KeyEdge::NextLevel => 5,
            KeyEdge::PreviousLevel => 6,
            KeyEdge::OpenEditor => 7,
            KeyEdge::OpenGame => 8,
            KeyEdge::MainMenu => 9,
        }
    }
}
