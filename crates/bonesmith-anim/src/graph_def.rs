//! JSON animation graph definitions
//!
//! ```json
//! {
//!   "motions": [{ "name": "idle", "path": "idle.motion" }],
//!   "states": [{ "name": "idle", "motion": "idle" }],
//!   "transitions": [],
//!   "entry": "idle"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::common::BinaryFormat;
use crate::error::{AnimError, Result};
use crate::graph::{AnimationGraph, AnimationTransition, MotionId, TransitionTrigger};
use crate::motion::{Motion, PlaybackMode};

/// A motion file referenced by the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionDef {
    pub name: String,
    /// Motion file, relative to the definition file
    pub path: PathBuf,
    #[serde(default)]
    pub playback: PlaybackMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    pub name: String,
    /// Name of a motion in [`AnimationGraphDef::motions`]
    pub motion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDef {
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub blend_seconds: f32,
    pub trigger: TransitionTrigger,
    #[serde(default)]
    pub start_from_beginning: bool,
}

/// Serialized form of an [`AnimationGraph`] that refers to motions by path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationGraphDef {
    pub motions: Vec<MotionDef>,
    pub states: Vec<StateDef>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
    /// Entry state; defaults to the first state
    #[serde(default)]
    pub entry: Option<String>,
}

impl AnimationGraphDef {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AnimError::GraphDefinition(e.to_string()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| AnimError::GraphDefinition(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading graph definition {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnimError::GraphDefinition(e.to_string()))
    }

    /// Build the graph, loading each motion through `load_motion`
    pub fn resolve<F>(&self, mut load_motion: F) -> Result<AnimationGraph>
    where
        F: FnMut(&MotionDef) -> Result<Motion>,
    {
        let mut graph = AnimationGraph::new();

        let mut motions: HashMap<&str, MotionId> = HashMap::new();
        for def in &self.motions {
            let motion = load_motion(def)?
                .with_name(def.name.as_str())
                .with_playback_mode(def.playback);
            motions.insert(def.name.as_str(), graph.add_motion(motion));
        }

        for def in &self.states {
            let motion = *motions
                .get(def.motion.as_str())
                .ok_or_else(|| AnimError::UnknownMotion(def.motion.clone()))?;
            graph.add_state(def.name.as_str(), motion)?;
        }

        let state = |name: &str| {
            graph
                .state_by_name(name)
                .ok_or_else(|| AnimError::UnknownState(name.to_string()))
        };
        let mut transitions = Vec::with_capacity(self.transitions.len());
        for def in &self.transitions {
            transitions.push(AnimationTransition {
                name: def.name.clone(),
                from: state(&def.from)?,
                to: state(&def.to)?,
                blend_seconds: def.blend_seconds,
                trigger: def.trigger,
                start_from_beginning: def.start_from_beginning,
            });
        }
        let entry = self.entry.as_deref().map(state).transpose()?;

        for transition in transitions {
            graph.add_transition(transition)?;
        }
        if let Some(entry) = entry {
            graph.set_entry_state(entry)?;
        }

        log::debug!(
            "Resolved graph: {} motions, {} states, {} transitions",
            self.motions.len(),
            self.states.len(),
            self.transitions.len()
        );
        Ok(graph)
    }

    /// Build the graph, reading motion files relative to `base_dir`
    pub fn resolve_from_dir<P: AsRef<Path>>(&self, base_dir: P) -> Result<AnimationGraph> {
        let base_dir = base_dir.as_ref();
        self.resolve(|def| Motion::load(base_dir.join(&def.path)))
    }
}
