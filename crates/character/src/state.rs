use glam::Vec3;
use serde::{Deserialize, Serialize};
use shapestage_input::{Action, ActionEdge, Phase};

use crate::mixer::LoopMode;

/// Heading change per turn key-down, in radians.
pub const DEFAULT_TURN_STEP: f32 = 0.1;

/// Durable behavioral mode. Exactly one is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    #[default]
    Idle,
    Running,
    Dancing,
    Dead,
}

/// How the character leaves `Dead`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevivalPolicy {
    /// Any key-down revives, then that key is handled normally in the same step.
    #[default]
    AnyKey,
    /// Input is ignored while dead; the character returns to idle once the
    /// death clip has finished.
    ClipFinished,
}

/// Named animation slots the state machine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipRole {
    Run,
    Dance,
    Jump,
    Punch,
    Wave,
    Death,
}

/// Request emitted by a transition for the animation mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipCommand {
    /// Restart the clip from its first frame.
    Play { role: ClipRole, mode: LoopMode },
    Stop { role: ClipRole },
}

/// Character state snapshot: stance, heading (radians about +Y) and position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    pub stance: Stance,
    pub heading: f32,
    pub position: Vec3,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl CharacterState {
    pub fn at(position: Vec3) -> Self {
        Self {
            stance: Stance::Idle,
            heading: 0.0,
            position,
        }
    }

    /// Unit forward vector on the ground plane.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.heading.sin(), 0.0, self.heading.cos())
    }
}

/// Tunables for the reducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub turn_step: f32,
    pub revival: RevivalPolicy,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            turn_step: DEFAULT_TURN_STEP,
            revival: RevivalPolicy::default(),
        }
    }
}

/// Result of feeding one edge through the reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: CharacterState,
    pub commands: Vec<ClipCommand>,
}

/// Apply one input edge to `state`.
///
/// Pure: the caller applies the returned clip commands to its mixer.
pub fn transition(state: &CharacterState, edge: ActionEdge, rules: &Rules) -> Transition {
    let mut next = *state;
    let mut commands = Vec::new();

    if edge.phase == Phase::Down && next.stance == Stance::Dead {
        match rules.revival {
            RevivalPolicy::AnyKey => {
                commands.push(ClipCommand::Stop {
                    role: ClipRole::Death,
                });
                next.stance = Stance::Idle;
            }
            RevivalPolicy::ClipFinished => {
                return Transition {
                    state: next,
                    commands,
                };
            }
        }
    }

    let Some(action) = edge.action else {
        return Transition {
            state: next,
            commands,
        };
    };

    match (action, edge.phase) {
        (Action::Run, Phase::Down) => {
            if !matches!(next.stance, Stance::Running | Stance::Dead) {
                leave_durable(&mut next, &mut commands);
                commands.push(ClipCommand::Play {
                    role: ClipRole::Run,
                    mode: LoopMode::Loop,
                });
                next.stance = Stance::Running;
            }
        }
        (Action::Run, Phase::Up) => {
            if next.stance == Stance::Running {
                commands.push(ClipCommand::Stop {
                    role: ClipRole::Run,
                });
                next.stance = Stance::Idle;
            }
        }
        (Action::Dance, Phase::Down) => {
            if !matches!(next.stance, Stance::Dancing | Stance::Dead) {
                leave_durable(&mut next, &mut commands);
                commands.push(ClipCommand::Play {
                    role: ClipRole::Dance,
                    mode: LoopMode::Loop,
                });
                next.stance = Stance::Dancing;
            }
        }
        (Action::Dance, Phase::Up) => {
            if next.stance == Stance::Dancing {
                commands.push(ClipCommand::Stop {
                    role: ClipRole::Dance,
                });
                next.stance = Stance::Idle;
            }
        }
        (Action::Jump, Phase::Down) => commands.push(one_shot(ClipRole::Jump)),
        (Action::Punch, Phase::Down) => commands.push(one_shot(ClipRole::Punch)),
        (Action::Wave, Phase::Down) => commands.push(one_shot(ClipRole::Wave)),
        (Action::Die, Phase::Down) => {
            if next.stance != Stance::Dead {
                leave_durable(&mut next, &mut commands);
                commands.push(ClipCommand::Play {
                    role: ClipRole::Death,
                    mode: LoopMode::OnceHold,
                });
                next.stance = Stance::Dead;
            }
        }
        (Action::TurnLeft, Phase::Down) => next.heading += rules.turn_step,
        (Action::TurnRight, Phase::Down) => next.heading -= rules.turn_step,
        _ => {}
    }

    Transition {
        state: next,
        commands,
    }
}

/// Notify the reducer that a non-looping clip reached its end.
pub fn clip_finished(state: &CharacterState, role: ClipRole, rules: &Rules) -> Transition {
    let mut next = *state;
    let mut commands = Vec::new();
    if role == ClipRole::Death
        && next.stance == Stance::Dead
        && rules.revival == RevivalPolicy::ClipFinished
    {
        commands.push(ClipCommand::Stop {
            role: ClipRole::Death,
        });
        next.stance = Stance::Idle;
    }
    Transition {
        state: next,
        commands,
    }
}

fn one_shot(role: ClipRole) -> ClipCommand {
    ClipCommand::Play {
        role,
        mode: LoopMode::Once,
    }
}

/// Stop the looping clip of the current stance and fall back to idle.
fn leave_durable(state: &mut CharacterState, commands: &mut Vec<ClipCommand>) {
    let role = match state.stance {
        Stance::Running => ClipRole::Run,
        Stance::Dancing => ClipRole::Dance,
        Stance::Idle | Stance::Dead => return,
    };
    commands.push(ClipCommand::Stop { role });
    state.stance = Stance::Idle;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: &CharacterState, edges: &[ActionEdge], rules: &Rules) -> (CharacterState, Vec<ClipCommand>) {
        let mut s = *state;
        let mut all = Vec::new();
        for edge in edges {
            let t = transition(&s, *edge, rules);
            s = t.state;
            all.extend(t.commands);
        }
        (s, all)
    }

    fn play(role: ClipRole, mode: LoopMode) -> ClipCommand {
        ClipCommand::Play { role, mode }
    }

    fn stop(role: ClipRole) -> ClipCommand {
        ClipCommand::Stop { role }
    }

    #[test]
    fn run_press_and_release() {
        let rules = Rules::default();
        let (s, cmds) = run(
            &CharacterState::default(),
            &[ActionEdge::down(Action::Run)],
            &rules,
        );
        assert_eq!(s.stance, Stance::Running);
        assert_eq!(cmds, vec![play(ClipRole::Run, LoopMode::Loop)]);

        let (s, cmds) = run(&s, &[ActionEdge::up(Action::Run)], &rules);
        assert_eq!(s.stance, Stance::Idle);
        assert_eq!(cmds, vec![stop(ClipRole::Run)]);
    }

    #[test]
    fn repeated_run_press_is_guarded() {
        let rules = Rules::default();
        let (s, cmds) = run(
            &CharacterState::default(),
            &[ActionEdge::down(Action::Run), ActionEdge::down(Action::Run)],
            &rules,
        );
        assert_eq!(s.stance, Stance::Running);
        assert_eq!(cmds.len(), 1);
    }

    #[test]
    fn dance_replaces_run() {
        let rules = Rules::default();
        let (s, cmds) = run(
            &CharacterState::default(),
            &[ActionEdge::down(Action::Run), ActionEdge::down(Action::Dance)],
            &rules,
        );
        assert_eq!(s.stance, Stance::Dancing);
        assert_eq!(
            cmds,
            vec![
                play(ClipRole::Run, LoopMode::Loop),
                stop(ClipRole::Run),
                play(ClipRole::Dance, LoopMode::Loop),
            ]
        );

        // Releasing run while dancing leaves the dance alone.
        let (s, cmds) = run(&s, &[ActionEdge::up(Action::Run)], &rules);
        assert_eq!(s.stance, Stance::Dancing);
        assert!(cmds.is_empty());
    }

    #[test]
    fn overlays_do_not_change_stance() {
        let rules = Rules::default();
        let running = CharacterState {
            stance: Stance::Running,
            ..CharacterState::default()
        };
        for (action, role) in [
            (Action::Jump, ClipRole::Jump),
            (Action::Punch, ClipRole::Punch),
            (Action::Wave, ClipRole::Wave),
        ] {
            let t = transition(&running, ActionEdge::down(action), &rules);
            assert_eq!(t.state.stance, Stance::Running);
            assert_eq!(t.commands, vec![play(role, LoopMode::Once)]);
        }
    }

    #[test]
    fn die_holds_final_pose_and_stops_durable_clip() {
        let rules = Rules::default();
        let (s, cmds) = run(
            &CharacterState::default(),
            &[ActionEdge::down(Action::Run), ActionEdge::down(Action::Die)],
            &rules,
        );
        assert_eq!(s.stance, Stance::Dead);
        assert_eq!(
            &cmds[1..],
            &[stop(ClipRole::Run), play(ClipRole::Death, LoopMode::OnceHold)]
        );
    }

    #[test]
    fn any_key_revives_then_applies_its_own_effect() {
        let rules = Rules::default();
        let dead = CharacterState {
            stance: Stance::Dead,
            ..CharacterState::default()
        };

        let t = transition(&dead, ActionEdge::down(Action::Run), &rules);
        assert_eq!(t.state.stance, Stance::Running);
        assert_eq!(
            t.commands,
            vec![stop(ClipRole::Death), play(ClipRole::Run, LoopMode::Loop)]
        );

        let t = transition(&dead, ActionEdge::down(Action::TurnLeft), &rules);
        assert_eq!(t.state.stance, Stance::Idle);
        assert!((t.state.heading - 0.1).abs() < 1e-6);

        let t = transition(&dead, ActionEdge::unbound_down(), &rules);
        assert_eq!(t.state.stance, Stance::Idle);
        assert_eq!(t.commands, vec![stop(ClipRole::Death)]);
    }

    #[test]
    fn key_up_does_not_revive() {
        let rules = Rules::default();
        let dead = CharacterState {
            stance: Stance::Dead,
            ..CharacterState::default()
        };
        let t = transition(&dead, ActionEdge::up(Action::Run), &rules);
        assert_eq!(t.state.stance, Stance::Dead);
        assert!(t.commands.is_empty());
    }

    #[test]
    fn clip_finished_policy_ignores_input_until_death_ends() {
        let rules = Rules {
            revival: RevivalPolicy::ClipFinished,
            ..Rules::default()
        };
        let dead = CharacterState {
            stance: Stance::Dead,
            ..CharacterState::default()
        };
        let t = transition(&dead, ActionEdge::down(Action::Run), &rules);
        assert_eq!(t.state, dead);
        assert!(t.commands.is_empty());

        let t = clip_finished(&dead, ClipRole::Death, &rules);
        assert_eq!(t.state.stance, Stance::Idle);
        assert_eq!(t.commands, vec![stop(ClipRole::Death)]);

        // Under the any-key policy a finished death clip keeps the pose.
        let t = clip_finished(&dead, ClipRole::Death, &Rules::default());
        assert_eq!(t.state.stance, Stance::Dead);
    }

    #[test]
    fn turning_is_discrete_per_press() {
        let rules = Rules::default();
        let (s, _) = run(
            &CharacterState::default(),
            &[
                ActionEdge::down(Action::TurnLeft),
                ActionEdge::down(Action::TurnLeft),
                ActionEdge::down(Action::TurnLeft),
                ActionEdge::down(Action::TurnRight),
                ActionEdge::up(Action::TurnRight),
            ],
            &rules,
        );
        assert!((s.heading - 0.2).abs() < 1e-6);
    }

    #[test]
    fn forward_follows_heading() {
        let s = CharacterState {
            heading: std::f32::consts::FRAC_PI_2,
            ..CharacterState::default()
        };
        assert!((s.forward() - Vec3::X).length() < 1e-6);
        assert!((CharacterState::default().forward() - Vec3::Z).length() < 1e-6);
    }
}
