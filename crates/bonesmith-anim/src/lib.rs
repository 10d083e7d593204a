//! Skeletal animation core: keyframe curves, joint hierarchies, clips and a
//! cross-fading animation state machine.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bonesmith_anim::{AnimationGraph, Animator, BinaryFormat, Motion, Skeleton};
//!
//! # fn main() -> bonesmith_anim::Result<()> {
//! let mut skeleton = Skeleton::load("hero.skel")?;
//! let mut graph = AnimationGraph::new();
//! let idle = graph.add_motion(Motion::load("idle.motion")?.with_name("idle"));
//! graph.add_state("idle", idle)?;
//!
//! let mut animator = Animator::new(Arc::new(graph), &skeleton)?;
//! animator.tick(&mut skeleton, 1.0 / 60.0)?;
//! let palette = skeleton.skinning_matrices();
//! # Ok(())
//! # }
//! ```

pub mod animation_curve;
pub mod animator;
pub mod common;
pub mod curve;
pub mod error;
pub mod graph;
#[cfg(feature = "serde")]
pub mod graph_def;
pub mod io_ext;
pub mod joint;
pub mod motion;
pub mod pose;
pub mod skeleton;

// Re-export common types
pub use animation_curve::{AnimationCurve, Axis, Channel, euler_rotation_degrees};
pub use animator::Animator;
pub use common::BinaryFormat;
pub use curve::{InterpolationType, KeyBracket, KeyFrame, TransformationCurve};
pub use error::{AnimError, Result};
pub use graph::{
    AnimationGraph, AnimationState, AnimationTransition, MotionId, StateId, TransitionId,
    TransitionTrigger,
};
#[cfg(feature = "serde")]
pub use graph_def::AnimationGraphDef;
pub use joint::{Joint, JointIndex, JointMeta};
pub use motion::{MOTION_FILE_VERSION, Motion, PlaybackMode};
pub use pose::{BlendPose, CellwiseBlend, DecomposedBlend};
pub use skeleton::{SKELETON_FILE_VERSION, Skeleton};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
