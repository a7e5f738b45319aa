use std::collections::VecDeque;

use crate::bindings::KeyCode;

/// Default number of edges buffered between frames.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// A discrete key transition delivered by the host. Auto-repeat arrives as
/// repeated `pressed = true` edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEdge {
    pub key: KeyCode,
    pub pressed: bool,
}

impl KeyEdge {
    pub fn down(key: impl Into<KeyCode>) -> Self {
        Self {
            key: key.into(),
            pressed: true,
        }
    }

    pub fn up(key: impl Into<KeyCode>) -> Self {
        Self {
            key: key.into(),
            pressed: false,
        }
    }
}

/// Bounded FIFO of key edges latched between frames and drained once per
/// frame.
///
/// When full, the oldest key-down edge is dropped. Key-up edges are only
/// dropped when the queue holds nothing else, so a held action is not left
/// stuck on.
#[derive(Debug, Clone)]
pub struct InputQueue {
    edges: VecDeque<KeyEdge>,
    capacity: usize,
    dropped: u64,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            edges: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, edge: KeyEdge) {
        if self.edges.len() < self.capacity {
            self.edges.push_back(edge);
            return;
        }
        self.dropped += 1;
        let lost = match self.edges.iter().position(|e| e.pressed) {
            Some(index) => self.edges.remove(index),
            None if edge.pressed => {
                tracing::warn!(key = %edge.key, "input queue full of releases; dropping new press");
                return;
            }
            None => self.edges.pop_front(),
        };
        if let Some(lost) = lost {
            tracing::warn!(key = %lost.key, pressed = lost.pressed, "input queue full; dropping edge");
        }
        self.edges.push_back(edge);
    }

    /// Take every queued edge in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = KeyEdge> + '_ {
        self.edges.drain(..)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges lost to overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order() {
        let mut q = InputQueue::new();
        q.push(KeyEdge::down("KeyW"));
        q.push(KeyEdge::down("KeyA"));
        q.push(KeyEdge::up("KeyW"));
        let keys: Vec<(String, bool)> = q.drain().map(|e| (e.key.0, e.pressed)).collect();
        assert_eq!(
            keys,
            vec![
                ("KeyW".to_string(), true),
                ("KeyA".to_string(), true),
                ("KeyW".to_string(), false)
            ]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut q = InputQueue::with_capacity(2);
        q.push(KeyEdge::down("KeyA"));
        q.push(KeyEdge::down("KeyB"));
        q.push(KeyEdge::down("KeyC"));
        assert_eq!(q.len(), 2);
        assert_eq!(q.dropped(), 1);
        let first = q.drain().next().unwrap();
        assert_eq!(first.key, KeyCode::from("KeyB"));
    }

    #[test]
    fn overflow_keeps_releases() {
        let mut q = InputQueue::with_capacity(3);
        q.push(KeyEdge::up("KeyW"));
        q.push(KeyEdge::down("KeyA"));
        q.push(KeyEdge::up("KeyQ"));
        q.push(KeyEdge::down("KeyD"));
        let kept: Vec<KeyEdge> = q.drain().collect();
        assert_eq!(
            kept,
            vec![KeyEdge::up("KeyW"), KeyEdge::up("KeyQ"), KeyEdge::down("KeyD")]
        );
        assert_eq!(q.dropped(), 1);
    }

    #[test]
    fn full_of_releases_drops_the_new_press() {
        let mut q = InputQueue::with_capacity(2);
        q.push(KeyEdge::up("KeyW"));
        q.push(KeyEdge::up("KeyQ"));
        q.push(KeyEdge::down("KeyF"));
        assert_eq!(q.dropped(), 1);
        let kept: Vec<KeyEdge> = q.drain().collect();
        assert_eq!(kept, vec![KeyEdge::up("KeyW"), KeyEdge::up("KeyQ")]);

        q.push(KeyEdge::up("KeyW"));
        q.push(KeyEdge::up("KeyQ"));
        q.push(KeyEdge::up("KeyD"));
        let kept: Vec<KeyEdge> = q.drain().collect();
        assert_eq!(kept, vec![KeyEdge::up("KeyQ"), KeyEdge::up("KeyD")]);
        assert_eq!(q.dropped(), 2);
    }
}
