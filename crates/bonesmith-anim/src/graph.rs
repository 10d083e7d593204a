//! Animation state machine definition
//!
//! An [`AnimationGraph`] owns its motions, states and transitions and hands
//! out small copyable handles for them. Graphs only grow, so a handle minted
//! by a graph stays valid for that graph's lifetime.

use crate::error::{AnimError, Result};
use crate::motion::Motion;
use crate::skeleton::Skeleton;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            /// Position of the item inside its graph
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

handle!(
    /// Handle to a [`Motion`] owned by an [`AnimationGraph`]
    MotionId
);
handle!(
    /// Handle to an [`AnimationState`]
    StateId
);
handle!(
    /// Handle to an [`AnimationTransition`]
    TransitionId
);

/// Condition that starts a transition
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", content = "value", rename_all = "snake_case")
)]
pub enum TransitionTrigger {
    /// Fires whenever the named trigger is set
    Trigger,
    /// Fires when the named bool is set to this value
    Bool(bool),
    /// Fires when the named float is set above this value
    GreaterThan(f32),
    /// Fires when the named float is set below this value
    LessThan(f32),
    /// Fires when the named float is set to this value
    Equals(f32),
    /// Fires so that the blend ends exactly when the source clip ends
    AnimationComplete,
}

impl TransitionTrigger {
    /// Whether a float parameter satisfies this threshold trigger
    pub fn accepts_float(self, value: f32) -> bool {
        match self {
            Self::GreaterThan(threshold) => value > threshold,
            Self::LessThan(threshold) => value < threshold,
            Self::Equals(threshold) => (value - threshold).abs() <= f32::EPSILON,
            _ => false,
        }
    }

    /// Short name used in listings
    pub fn kind_name(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Bool(_) => "bool",
            Self::GreaterThan(_) => "greater_than",
            Self::LessThan(_) => "less_than",
            Self::Equals(_) => "equals",
            Self::AnimationComplete => "animation_complete",
        }
    }
}

/// Directed edge between two states
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTransition {
    /// Parameter name that drives this transition
    pub name: String,
    /// Source state
    pub from: StateId,
    /// Destination state
    pub to: StateId,
    /// Cross-fade duration; zero is a hard cut
    pub blend_seconds: f32,
    /// Firing condition
    pub trigger: TransitionTrigger,
    /// Start the destination clip at zero instead of the source's phase
    pub start_from_beginning: bool,
}

/// A named node playing one motion
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    name: String,
    motion: MotionId,
    transitions: Vec<TransitionId>,
}

impl AnimationState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn motion(&self) -> MotionId {
        self.motion
    }

    /// Outgoing transitions in the order they were added
    pub fn transitions(&self) -> &[TransitionId] {
        &self.transitions
    }
}

/// Arena of motions, states and transitions
#[derive(Debug, Clone, Default)]
pub struct AnimationGraph {
    motions: Vec<Motion>,
    states: Vec<AnimationState>,
    transitions: Vec<AnimationTransition>,
    entry_state: Option<StateId>,
}

impl AnimationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_motion(&mut self, motion: Motion) -> MotionId {
        self.motions.push(motion);
        MotionId(self.motions.len() - 1)
    }

    /// Add a state; the first state added becomes the entry state
    pub fn add_state(&mut self, name: impl Into<String>, motion: MotionId) -> Result<StateId> {
        self.check_motion(motion)?;
        self.states.push(AnimationState {
            name: name.into(),
            motion,
            transitions: Vec::new(),
        });
        let id = StateId(self.states.len() - 1);
        self.entry_state.get_or_insert(id);
        Ok(id)
    }

    /// Add a transition and attach it to its source state
    pub fn add_transition(&mut self, transition: AnimationTransition) -> Result<TransitionId> {
        self.check_state(transition.from)?;
        self.check_state(transition.to)?;
        if !transition.blend_seconds.is_finite() || transition.blend_seconds < 0.0 {
            return Err(AnimError::InvalidLength(transition.blend_seconds));
        }

        let from = transition.from;
        self.transitions.push(transition);
        let id = TransitionId(self.transitions.len() - 1);
        self.states[from.0].transitions.push(id);
        Ok(id)
    }

    pub fn set_entry_state(&mut self, state: StateId) -> Result<()> {
        self.check_state(state)?;
        self.entry_state = Some(state);
        Ok(())
    }

    pub fn entry_state(&self) -> Option<StateId> {
        self.entry_state
    }

    /// # Panics
    ///
    /// Panics if `id` was not minted by this graph.
    pub fn motion(&self, id: MotionId) -> &Motion {
        &self.motions[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` was not minted by this graph.
    pub fn state(&self, id: StateId) -> &AnimationState {
        &self.states[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` was not minted by this graph.
    pub fn transition(&self, id: TransitionId) -> &AnimationTransition {
        &self.transitions[id.0]
    }

    /// Motion played by a state
    pub fn state_motion(&self, id: StateId) -> &Motion {
        self.motion(self.state(id).motion)
    }

    pub fn state_by_name(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|s| s.name == name).map(StateId)
    }

    pub fn motion_by_name(&self, name: &str) -> Option<MotionId> {
        self.motions
            .iter()
            .position(|m| m.name() == name)
            .map(MotionId)
    }

    /// Outgoing transitions of a state with their handles
    pub fn transitions_from(
        &self,
        state: StateId,
    ) -> impl Iterator<Item = (TransitionId, &AnimationTransition)> + '_ {
        self.state(state)
            .transitions
            .iter()
            .map(|&id| (id, self.transition(id)))
    }

    pub fn motions(&self) -> impl Iterator<Item = (MotionId, &Motion)> {
        self.motions.iter().enumerate().map(|(i, m)| (MotionId(i), m))
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &AnimationState)> {
        self.states.iter().enumerate().map(|(i, s)| (StateId(i), s))
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &AnimationTransition)> {
        self.transitions
            .iter()
            .enumerate()
            .map(|(i, t)| (TransitionId(i), t))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Check every motion against a skeleton before driving it
    pub fn check_skeleton(&self, skeleton: &Skeleton) -> Result<()> {
        for motion in &self.motions {
            motion.check_skeleton(skeleton)?;
            if motion.curve_count() < skeleton.joint_count() {
                log::warn!(
                    "Motion '{}' animates {} of {} joints; the rest keep their bind pose",
                    motion.name(),
                    motion.curve_count(),
                    skeleton.joint_count()
                );
            }
        }
        Ok(())
    }

    pub(crate) fn check_state(&self, id: StateId) -> Result<()> {
        if id.0 < self.states.len() {
            Ok(())
        } else {
            Err(AnimError::InvalidHandle {
                kind: "state",
                index: id.0,
            })
        }
    }

    pub(crate) fn check_transition(&self, id: TransitionId) -> Result<()> {
        if id.0 < self.transitions.len() {
            Ok(())
        } else {
            Err(AnimError::InvalidHandle {
                kind: "transition",
                index: id.0,
            })
        }
    }

    fn check_motion(&self, id: MotionId) -> Result<()> {
        if id.0 < self.motions.len() {
            Ok(())
        } else {
            Err(AnimError::InvalidHandle {
                kind: "motion",
                index: id.0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(name: &str) -> Motion {
        Motion::new(name, Vec::new(), 1.0, 0.0).unwrap()
    }

    #[test]
    fn test_first_state_is_entry() {
        let mut graph = AnimationGraph::new();
        let idle = graph.add_motion(motion("idle"));
        let walk = graph.add_motion(motion("walk"));
        let a = graph.add_state("idle", idle).unwrap();
        let b = graph.add_state("walk", walk).unwrap();

        assert_eq!(graph.entry_state(), Some(a));
        graph.set_entry_state(b).unwrap();
        assert_eq!(graph.entry_state(), Some(b));
        assert_eq!(graph.state_by_name("walk"), Some(b));
        assert_eq!(graph.motion_by_name("idle"), Some(idle));
        assert_eq!(graph.state_motion(b).name(), "walk");
    }

    #[test]
    fn test_transitions_attach_to_source() {
        let mut graph = AnimationGraph::new();
        let m = graph.add_motion(motion("idle"));
        let a = graph.add_state("a", m).unwrap();
        let b = graph.add_state("b", m).unwrap();
        let t = graph
            .add_transition(AnimationTransition {
                name: "go".into(),
                from: a,
                to: b,
                blend_seconds: 0.25,
                trigger: TransitionTrigger::Trigger,
                start_from_beginning: true,
            })
            .unwrap();

        assert_eq!(graph.state(a).transitions(), &[t]);
        assert!(graph.state(b).transitions().is_empty());
        let (id, edge) = graph.transitions_from(a).next().unwrap();
        assert_eq!(id, t);
        assert_eq!(edge.to, b);
    }

    #[test]
    fn test_foreign_handles_rejected() {
        let mut graph = AnimationGraph::new();
        assert!(matches!(
            graph.add_state("a", MotionId(3)),
            Err(AnimError::InvalidHandle { kind: "motion", index: 3 })
        ));
        assert!(graph.set_entry_state(StateId(0)).is_err());
    }

    #[test]
    fn test_negative_blend_rejected() {
        let mut graph = AnimationGraph::new();
        let m = graph.add_motion(motion("idle"));
        let a = graph.add_state("a", m).unwrap();
        let result = graph.add_transition(AnimationTransition {
            name: "go".into(),
            from: a,
            to: a,
            blend_seconds: -1.0,
            trigger: TransitionTrigger::Trigger,
            start_from_beginning: false,
        });
        assert!(matches!(result, Err(AnimError::InvalidLength(_))));
    }

    #[test]
    fn test_threshold_triggers() {
        assert!(TransitionTrigger::GreaterThan(0.5).accepts_float(0.6));
        assert!(!TransitionTrigger::GreaterThan(0.5).accepts_float(0.5));
        assert!(TransitionTrigger::LessThan(0.5).accepts_float(0.4));
        assert!(TransitionTrigger::Equals(2.0).accepts_float(2.0));
        assert!(!TransitionTrigger::Equals(2.0).accepts_float(2.001));
        assert!(!TransitionTrigger::Trigger.accepts_float(1.0));
    }
}
