use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::{Action, ActionEdge, Phase};
use crate::queue::KeyEdge;

/// Stable, layout-independent key identifier such as `"KeyW"` or `"Space"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub String);

impl KeyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key code → action table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputBindings {
    map: BTreeMap<KeyCode, Action>,
}

impl Default for InputBindings {
    fn default() -> Self {
        [
            ("KeyW", Action::Run),
            ("KeyQ", Action::Dance),
            ("Space", Action::Jump),
            ("KeyF", Action::Punch),
            ("KeyR", Action::Wave),
            ("KeyK", Action::Die),
            ("KeyA", Action::TurnLeft),
            ("KeyD", Action::TurnRight),
        ]
        .into_iter()
        .collect()
    }
}

impl FromIterator<(&'static str, Action)> for InputBindings {
    fn from_iter<I: IntoIterator<Item = (&'static str, Action)>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(code, action)| (KeyCode::from(code), action))
                .collect(),
        }
    }
}

impl InputBindings {
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Bind `key` to `action`, returning the previous binding.
    pub fn bind(&mut self, key: impl Into<KeyCode>, action: Action) -> Option<Action> {
        self.map.insert(key.into(), action)
    }

    pub fn action_for(&self, key: &KeyCode) -> Option<Action> {
        self.map.get(key).copied()
    }

    /// First key bound to `action`, in key order.
    pub fn key_for(&self, action: Action) -> Option<&KeyCode> {
        self.map
            .iter()
            .find_map(|(key, bound)| (*bound == action).then_some(key))
    }

    /// Translate a raw key edge into an action edge.
    pub fn resolve(&self, edge: &KeyEdge) -> ActionEdge {
        ActionEdge {
            action: self.action_for(&edge.key),
            phase: if edge.pressed { Phase::Down } else { Phase::Up },
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyCode, Action)> {
        self.map.iter().map(|(k, a)| (k, *a))
    }
}
