//! Drives a skeleton through an [`AnimationGraph`]

use glam::Mat4;
use std::sync::Arc;

use crate::error::{AnimError, Result};
use crate::graph::{AnimationGraph, StateId, TransitionId, TransitionTrigger};
use crate::pose::{BlendPose, CellwiseBlend};
use crate::skeleton::Skeleton;

/// A transition that is currently cross-fading
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveTransition {
    id: TransitionId,
    /// Seconds since the transition started
    elapsed: f32,
    /// Normalized time of the destination clip
    destination_time: f32,
}

/// Plays an animation graph on one skeleton.
///
/// The animator holds the current state, a normalized-time cursor into its
/// clip and at most one in-flight transition. While a transition is running
/// the parameter setters are ignored. Many animators can share one graph.
#[derive(Debug, Clone)]
pub struct Animator<B: BlendPose = CellwiseBlend> {
    graph: Arc<AnimationGraph>,
    blend: B,
    current_state: StateId,
    /// Normalized time of the current (or, while blending, source) clip
    normalized_time: f32,
    /// Whether the cursor wrapped during the last tick
    did_reset: bool,
    transition: Option<ActiveTransition>,
    paused: bool,
    /// Scratch pose of the source clip, also the blended result
    source_pose: Vec<Mat4>,
    /// Scratch pose of the destination clip
    destination_pose: Vec<Mat4>,
}

impl Animator<CellwiseBlend> {
    /// Create an animator in the graph's entry state with cellwise blending
    pub fn new(graph: Arc<AnimationGraph>, skeleton: &Skeleton) -> Result<Self> {
        Self::with_blend(graph, skeleton, CellwiseBlend)
    }
}

impl<B: BlendPose> Animator<B> {
    /// Create an animator with a custom blend strategy.
    ///
    /// Every motion of the graph is checked against `skeleton` up front.
    pub fn with_blend(graph: Arc<AnimationGraph>, skeleton: &Skeleton, blend: B) -> Result<Self> {
        let current_state = graph
            .entry_state()
            .ok_or_else(|| AnimError::UnknownState("graph has no entry state".to_string()))?;
        graph.check_skeleton(skeleton)?;

        Ok(Self {
            graph,
            blend,
            current_state,
            normalized_time: 0.0,
            did_reset: false,
            transition: None,
            paused: false,
            source_pose: Vec::with_capacity(skeleton.joint_count()),
            destination_pose: Vec::with_capacity(skeleton.joint_count()),
        })
    }

    pub fn graph(&self) -> &Arc<AnimationGraph> {
        &self.graph
    }

    pub fn blend_strategy(&self) -> &B {
        &self.blend
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    pub fn current_state_name(&self) -> &str {
        self.graph.state(self.current_state).name()
    }

    /// Normalized time of the current clip, in `[0, 1)` while looping
    pub fn normalized_time(&self) -> f32 {
        self.normalized_time
    }

    /// Normalized time of the destination clip while a transition runs
    pub fn destination_normalized_time(&self) -> Option<f32> {
        self.transition.map(|t| t.destination_time)
    }

    /// Whether the clip wrapped around during the last tick
    pub fn did_reset(&self) -> bool {
        self.did_reset
    }

    pub fn active_transition(&self) -> Option<TransitionId> {
        self.transition.map(|t| t.id)
    }

    pub fn is_blending(&self) -> bool {
        self.transition.is_some()
    }

    /// Share of the destination pose in the running transition
    pub fn transition_progress(&self) -> Option<f32> {
        self.transition.map(|t| self.destination_weight(&t))
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// A paused animator keeps re-applying its current pose without
    /// advancing time
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Fire the transition named `name` if it is a plain trigger.
    ///
    /// Returns whether a transition started.
    pub fn set_trigger(&mut self, name: &str) -> bool {
        self.fire(name, |trigger| trigger == TransitionTrigger::Trigger)
    }

    /// Fire the transition named `name` if it waits for this bool value
    pub fn set_bool(&mut self, name: &str, value: bool) -> bool {
        self.fire(name, |trigger| trigger == TransitionTrigger::Bool(value))
    }

    /// Fire the transition named `name` if `value` passes its threshold
    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        self.fire(name, |trigger| trigger.accepts_float(value))
    }

    fn fire(&mut self, name: &str, accepts: impl Fn(TransitionTrigger) -> bool) -> bool {
        if self.transition.is_some() {
            log::trace!("Ignoring '{name}': a transition is already running");
            return false;
        }

        let found = self
            .graph
            .transitions_from(self.current_state)
            .find(|(_, t)| t.name == name && accepts(t.trigger))
            .map(|(id, _)| id);

        match found {
            Some(id) => {
                self.begin_transition(id);
                true
            }
            None => {
                log::trace!(
                    "No transition '{name}' matches from state '{}'",
                    self.current_state_name()
                );
                false
            }
        }
    }

    /// Start a transition regardless of its trigger.
    ///
    /// The transition must leave the current state and no other transition
    /// may be blending.
    pub fn set_transition(&mut self, id: TransitionId) -> Result<()> {
        self.graph.check_transition(id)?;
        let transition = self.graph.transition(id);
        if let Some(active) = self.transition {
            return Err(AnimError::TransitionInProgress {
                requested: transition.name.clone(),
                running: self.graph.transition(active.id).name.clone(),
            });
        }
        if transition.from != self.current_state {
            return Err(AnimError::TransitionNotFromState {
                transition: transition.name.clone(),
                state: self.current_state_name().to_string(),
            });
        }
        self.begin_transition(id);
        Ok(())
    }

    /// Jump straight to a state, dropping any running transition
    pub fn force_state(&mut self, state: StateId) -> Result<()> {
        self.graph.check_state(state)?;
        self.current_state = state;
        self.normalized_time = 0.0;
        self.did_reset = false;
        self.transition = None;
        log::info!("Forced state '{}'", self.current_state_name());
        Ok(())
    }

    fn begin_transition(&mut self, id: TransitionId) {
        let transition = self.graph.transition(id);
        let destination_time = if transition.start_from_beginning {
            0.0
        } else {
            self.normalized_time
        };
        log::info!(
            "Transition '{}' from '{}' to '{}' over {}s",
            transition.name,
            self.graph.state(transition.from).name(),
            self.graph.state(transition.to).name(),
            transition.blend_seconds
        );

        self.transition = Some(ActiveTransition {
            id,
            elapsed: 0.0,
            destination_time,
        });
    }

    /// Advance by `delta_seconds` and write the resulting pose to `skeleton`
    pub fn tick(&mut self, skeleton: &mut Skeleton, delta_seconds: f32) -> Result<()> {
        if self.paused {
            return self.apply_current_pose(skeleton);
        }

        if self.transition.is_some() && self.advance_into_transition(delta_seconds) {
            return self.apply_current_pose(skeleton);
        }

        self.advance_into_state(delta_seconds);
        self.apply_current_pose(skeleton)
    }

    /// Step the running transition. Returns `false` once it has committed,
    /// in which case the caller continues with steady-state playback.
    #[allow(clippy::float_cmp)]
    fn advance_into_transition(&mut self, delta_seconds: f32) -> bool {
        let Some(mut active) = self.transition else {
            return false;
        };
        let graph = Arc::clone(&self.graph);
        let transition = graph.transition(active.id);

        active.elapsed += delta_seconds;
        if active.elapsed >= transition.blend_seconds {
            self.current_state = transition.to;
            self.normalized_time = if transition.blend_seconds == 0.0 {
                0.0
            } else {
                active.destination_time
            };
            self.transition = None;
            log::info!("Committed transition '{}'", transition.name);
            return false;
        }

        let destination_weight = active.elapsed / transition.blend_seconds;
        let source_weight = 1.0 - destination_weight;
        let source = graph.state_motion(self.current_state);
        let destination = graph.state_motion(transition.to);

        let step = delta_seconds
            * (source_weight / source.length() + destination_weight / destination.length());
        let (source_time, wrapped) = source.playback_mode().advance(self.normalized_time, step);
        let (destination_time, _) = destination
            .playback_mode()
            .advance(active.destination_time, step);

        self.normalized_time = source_time;
        self.did_reset = wrapped;
        active.destination_time = destination_time;
        self.transition = Some(active);

        log::trace!(
            "Blending '{}' at {:.3} (src {:.3}, dst {:.3})",
            transition.name,
            destination_weight,
            source_time,
            destination_time
        );
        true
    }

    fn advance_into_state(&mut self, delta_seconds: f32) {
        let graph = Arc::clone(&self.graph);
        let motion = graph.state_motion(self.current_state);
        let length = motion.length();

        let previous = self.normalized_time;
        let (time, wrapped) = motion
            .playback_mode()
            .advance(previous, delta_seconds / length);
        self.normalized_time = time;
        self.did_reset = wrapped;

        let completion = graph
            .transitions_from(self.current_state)
            .find(|(_, t)| t.trigger == TransitionTrigger::AnimationComplete);
        if let Some((id, transition)) = completion {
            let threshold = 1.0
                - transition.blend_seconds / motion.playback_mode().cycle_length(length);
            if wrapped || (previous < threshold && time >= threshold) {
                self.begin_transition(id);
            }
        }
    }

    fn destination_weight(&self, active: &ActiveTransition) -> f32 {
        let blend_seconds = self.graph.transition(active.id).blend_seconds;
        if blend_seconds > 0.0 {
            (active.elapsed / blend_seconds).min(1.0)
        } else {
            1.0
        }
    }

    /// Evaluate the current (possibly blended) pose and apply it
    fn apply_current_pose(&mut self, skeleton: &mut Skeleton) -> Result<()> {
        let graph = Arc::clone(&self.graph);
        let source = graph.state_motion(self.current_state);
        source.write_matrices_for_skeleton(
            skeleton,
            source.playback_mode().sample_point(self.normalized_time),
            &mut self.source_pose,
        )?;

        if let Some(active) = self.transition {
            let destination = graph.state_motion(graph.transition(active.id).to);
            destination.write_matrices_for_skeleton(
                skeleton,
                destination
                    .playback_mode()
                    .sample_point(active.destination_time),
                &mut self.destination_pose,
            )?;
            let weight = self.destination_weight(&active);
            self.blend
                .blend_into(&mut self.source_pose, &self.destination_pose, weight);
        }

        skeleton.apply_pose(&self.source_pose)
    }
}
