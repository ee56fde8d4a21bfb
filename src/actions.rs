use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Reseed,
    MoreInstances,
    FewerInstances,
    WidenArea,
    NarrowArea,
}

#[derive(Default, Resource)]
pub struct ActionState {
    pressed: HashMap<PlayerAction, bool>,
    triggered: HashSet<PlayerAction>,
}

impl ActionState {
    pub fn set(&mut self, action: PlayerAction, is_pressed: bool) {
        self.pressed.insert(action, is_pressed);
    }

    pub fn pressed(&self, action: PlayerAction) -> bool {
        *self.pressed.get(&action).unwrap_or(&false)
    }

    /// Edge-triggered actions for this frame only.
    pub fn trigger(&mut self, action: PlayerAction, just_pressed: bool) {
        if just_pressed {
            self.triggered.insert(action);
        } else {
            self.triggered.remove(&action);
        }
    }

    pub fn triggered(&self, action: PlayerAction) -> bool {
        self.triggered.contains(&action)
    }
}
