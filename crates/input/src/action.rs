use serde::{Deserialize, Serialize};

/// A high-level character action produced from key input.
///
/// The state machine consumes actions, never raw key codes, so bindings can
/// change without touching simulation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Held to run forward along the current heading.
    Run,
    /// Held to dance in place.
    Dance,
    /// One-shot jump clip.
    Jump,
    /// One-shot punch clip.
    Punch,
    /// One-shot wave clip.
    Wave,
    /// Enter the dead stance.
    Die,
    /// Rotate heading by one step to the left.
    TurnLeft,
    /// Rotate heading by one step to the right.
    TurnRight,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Run,
        Action::Dance,
        Action::Jump,
        Action::Punch,
        Action::Wave,
        Action::Die,
        Action::TurnLeft,
        Action::TurnRight,
    ];
}

/// Direction of a key edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Down,
    Up,
}

/// A key edge after binding lookup. `action` is `None` for unbound keys,
/// which still count as "a key was pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEdge {
    pub action: Option<Action>,
    pub phase: Phase,
}

impl ActionEdge {
    pub fn down(action: Action) -> Self {
        Self {
            action: Some(action),
            phase: Phase::Down,
        }
    }

    pub fn up(action: Action) -> Self {
        Self {
            action: Some(action),
            phase: Phase::Up,
        }
    }

    /// Key-down of a key with no binding.
    pub fn unbound_down() -> Self {
        Self {
            action: None,
            phase: Phase::Down,
        }
    }

    pub fn is_down(&self) -> bool {
        self.phase == Phase::Down
    }
}
