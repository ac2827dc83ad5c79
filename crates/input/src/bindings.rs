use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::directional::{Direction, DirectionalInput};

/// Maps host key codes to directions and tracks which bound keys are held.
///
/// Several keys may drive one direction (arrows and WASD); a direction stays
/// held while any of its keys is down.
#[derive(Debug, Clone)]
pub struct KeyBindings<K> {
    map: HashMap<K, Direction>,
    held: HashSet<K>,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> KeyBindings<K> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            held: HashSet::new(),
        }
    }

    pub fn bind(mut self, key: K, direction: Direction) -> Self {
        self.map.insert(key, direction);
        self
    }

    /// Record a key transition. Returns false for unbound keys.
    pub fn handle_key(&mut self, key: K, pressed: bool) -> bool {
        if !self.map.contains_key(&key) {
            return false;
        }
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
        tracing::trace!(?key, pressed, "direction key");
        true
    }

    /// Forget all held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn input(&self) -> DirectionalInput {
        let mut input = DirectionalInput::new();
        for key in &self.held {
            if let Some(direction) = self.map.get(key) {
                input.set(*direction, true);
            }
        }
        input
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> Default for KeyBindings<K> {
    fn default() -> Self {
        Self::new()
    }
}
