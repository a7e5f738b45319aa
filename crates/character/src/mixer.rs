use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::{ClipCommand, ClipRole};

/// What a clip does when it reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Wrap to the start.
    Loop,
    /// Stop and rewind.
    Once,
    /// Stop on the last frame.
    OnceHold,
}

/// Clip names inside the character model, per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipNames {
    pub run: String,
    pub dance: String,
    pub jump: String,
    pub punch: String,
    pub wave: String,
    pub death: String,
}

impl Default for ClipNames {
    fn default() -> Self {
        Self {
            run: "Running".into(),
            dance: "Dance".into(),
            jump: "Jump".into(),
            punch: "Punch".into(),
            wave: "Wave".into(),
            death: "Death".into(),
        }
    }
}

impl ClipNames {
    pub fn name(&self, role: ClipRole) -> &str {
        match role {
            ClipRole::Run => &self.run,
            ClipRole::Dance => &self.dance,
            ClipRole::Jump => &self.jump,
            ClipRole::Punch => &self.punch,
            ClipRole::Wave => &self.wave,
            ClipRole::Death => &self.death,
        }
    }
}

#[derive(Debug, Clone)]
struct ClipAction {
    duration: f32,
    time: f32,
    mode: LoopMode,
    playing: bool,
    finished: bool,
}

impl ClipAction {
    fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            time: 0.0,
            mode: LoopMode::Loop,
            playing: false,
            finished: false,
        }
    }
}

/// Plays named clips of one model. Several clips may run at once; a clip
/// that is not loaded is ignored.
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    clips: BTreeMap<String, ClipAction>,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register clips by name and duration in seconds. Existing clips with
    /// the same name are replaced and stopped.
    pub fn load_clips<I, S>(&mut self, clips: I)
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        for (name, duration) in clips {
            self.clips.insert(name.into(), ClipAction::new(duration));
        }
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    /// Restart `name` from its first frame. Returns false if the clip is
    /// unknown.
    pub fn play(&mut self, name: &str, mode: LoopMode) -> bool {
        let Some(clip) = self.clips.get_mut(name) else {
            tracing::debug!(clip = name, "play ignored: clip not loaded");
            return false;
        };
        clip.mode = mode;
        clip.time = 0.0;
        clip.playing = true;
        clip.finished = false;
        true
    }

    pub fn stop(&mut self, name: &str) -> bool {
        let Some(clip) = self.clips.get_mut(name) else {
            return false;
        };
        clip.playing = false;
        clip.finished = false;
        clip.time = 0.0;
        true
    }

    /// Apply reducer commands, mapping roles through `names`.
    pub fn apply(&mut self, commands: &[ClipCommand], names: &ClipNames) {
        for command in commands {
            match *command {
                ClipCommand::Play { role, mode } => {
                    self.play(names.name(role), mode);
                }
                ClipCommand::Stop { role } => {
                    self.stop(names.name(role));
                }
            }
        }
    }

    /// Advance every playing clip. Returns the clips that reached their end
    /// during this step.
    pub fn advance(&mut self, dt: f32) -> Vec<String> {
        let mut ended = Vec::new();
        if dt <= 0.0 {
            return ended;
        }
        for (name, clip) in &mut self.clips {
            if !clip.playing {
                continue;
            }
            clip.time += dt;
            match clip.mode {
                LoopMode::Loop => {
                    if clip.duration > 0.0 {
                        clip.time %= clip.duration;
                    } else {
                        clip.time = 0.0;
                    }
                }
                LoopMode::Once | LoopMode::OnceHold => {
                    if clip.time >= clip.duration {
                        clip.playing = false;
                        clip.finished = true;
                        clip.time = if clip.mode == LoopMode::OnceHold {
                            clip.duration
                        } else {
                            0.0
                        };
                        ended.push(name.clone());
                    }
                }
            }
        }
        ended
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.clips.get(name).is_some_and(|c| c.playing)
    }

    /// True once a non-looping clip has run to its end and not been
    /// restarted or stopped since.
    pub fn is_finished(&self, name: &str) -> bool {
        self.clips.get(name).is_some_and(|c| c.finished)
    }

    /// Playback position in seconds.
    pub fn time(&self, name: &str) -> Option<f32> {
        self.clips.get(name).map(|c| c.time)
    }

    pub fn playing(&self) -> impl Iterator<Item = &str> {
        self.clips
            .iter()
            .filter(|(_, c)| c.playing)
            .map(|(n, _)| n.as_str())
    }
}
