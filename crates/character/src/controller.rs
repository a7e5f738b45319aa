use glam::Vec3;
use serde::{Deserialize, Serialize};
use shapestage_collision::CollisionWorld;
use shapestage_input::ActionEdge;

use crate::locomotion::{DEFAULT_SPEED, Locomotion};
use crate::mixer::{AnimationMixer, ClipNames};
use crate::state::{
    CharacterState, ClipRole, DEFAULT_TURN_STEP, RevivalPolicy, Rules, Stance, clip_finished,
    transition,
};

/// Character tunables as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Path of the animated model; loaded by the host.
    pub model: Option<String>,
    pub speed: f32,
    pub radius: f32,
    pub turn_step: f32,
    pub start: Vec3,
    pub revival: RevivalPolicy,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            model: None,
            speed: DEFAULT_SPEED,
            radius: 1.0,
            turn_step: DEFAULT_TURN_STEP,
            start: Vec3::ZERO,
            revival: RevivalPolicy::default(),
        }
    }
}

/// Owns the character's state, its mixer, and the motion rules.
#[derive(Debug, Clone)]
pub struct Character {
    state: CharacterState,
    rules: Rules,
    clips: ClipNames,
    mixer: AnimationMixer,
    locomotion: Locomotion,
}

impl Character {
    pub fn new(config: &CharacterConfig, clips: ClipNames) -> Self {
        Self {
            state: CharacterState::at(config.start),
            rules: Rules {
                turn_step: config.turn_step,
                revival: config.revival,
            },
            clips,
            mixer: AnimationMixer::new(),
            locomotion: Locomotion::new(config.speed),
        }
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    /// Install the clips of a freshly loaded model.
    pub fn load_clips<I, S>(&mut self, clips: I)
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        self.mixer.load_clips(clips);
        for role in [
            ClipRole::Run,
            ClipRole::Dance,
            ClipRole::Jump,
            ClipRole::Punch,
            ClipRole::Wave,
            ClipRole::Death,
        ] {
            let name = self.clips.name(role);
            if !self.mixer.has_clip(name) {
                tracing::warn!(?role, clip = name, "model has no clip for role");
            }
        }
    }

    /// Feed one input edge through the state machine.
    pub fn handle(&mut self, edge: ActionEdge) {
        let before = self.state.stance;
        let t = transition(&self.state, edge, &self.rules);
        self.mixer.apply(&t.commands, &self.clips);
        self.state = t.state;
        if before != self.state.stance {
            tracing::debug!(from = ?before, to = ?self.state.stance, "stance changed");
        }
    }

    /// Move, then advance animation. Returns the new position.
    pub fn update(&mut self, dt: f32, collisions: &CollisionWorld) -> Vec3 {
        self.state.position = self.locomotion.step(dt, &self.state, collisions);

        let ended = self.mixer.advance(dt);
        let death = self.clips.name(ClipRole::Death);
        // A missing death clip counts as already finished.
        let death_done = ended.iter().any(|n| n == death) || !self.mixer.has_clip(death);
        if self.state.stance == Stance::Dead && death_done {
            let t = clip_finished(&self.state, ClipRole::Death, &self.rules);
            self.mixer.apply(&t.commands, &self.clips);
            self.state = t.state;
        }
        self.state.position
    }
}
