//! Animation graph command implementations

use anyhow::{Context, Result, anyhow, bail};
use bonesmith_anim::{
    AnimationGraph, AnimationGraphDef, Animator, BlendPose, CellwiseBlend, DecomposedBlend,
    Skeleton,
};
use clap::{Subcommand, ValueEnum};
use console::style;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::skeleton::load_skeleton;
use crate::utils::{
    NodeType, TreeNode, TreeOptions, add_table_row, create_table, format_position, format_seconds,
    render_tree,
};

#[derive(Subcommand)]
pub enum GraphCommands {
    /// List the states and transitions of a graph definition
    Info {
        /// Path to the graph definition (JSON)
        file: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Play a graph on a skeleton and report state changes
    Run {
        /// Path to the graph definition (JSON)
        file: PathBuf,

        /// Skeleton to animate
        #[arg(short, long)]
        skeleton: PathBuf,

        /// Seconds to simulate
        #[arg(short, long, default_value = "2.0")]
        duration: f32,

        /// Ticks per second
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Set a parameter: NAME=VALUE[@SECONDS], VALUE is a number, true or false
        #[arg(long = "set", value_name = "NAME=VALUE[@SECONDS]")]
        set: Vec<ScheduledParam>,

        /// Fire a trigger: NAME[@SECONDS]
        #[arg(long = "trigger", value_name = "NAME[@SECONDS]")]
        trigger: Vec<ScheduledTrigger>,

        /// Pose blending used during transitions
        #[arg(long, value_enum, default_value = "cellwise")]
        blend: BlendMode,

        /// Print every tick, not only state changes
        #[arg(long)]
        trace: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlendMode {
    /// Per-cell matrix lerp
    Cellwise,
    /// Scale/rotation/translation decomposition with slerp
    Decomposed,
}

/// Value carried by a `--set` parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Float(f32),
}

/// A `--set` parameter applied at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledParam {
    pub name: String,
    pub value: ParamValue,
    pub at: f32,
}

/// A `--trigger` fired at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTrigger {
    pub name: String,
    pub at: f32,
}

/// Split an optional `@SECONDS` suffix
fn split_time(s: &str) -> Result<(&str, f32)> {
    match s.rsplit_once('@') {
        Some((head, time)) => {
            let at = time
                .parse::<f32>()
                .map_err(|_| anyhow!("Invalid time '{time}'"))?;
            if at < 0.0 {
                bail!("Time must not be negative, got {at}");
            }
            Ok((head, at))
        }
        None => Ok((s, 0.0)),
    }
}

impl FromStr for ScheduledParam {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (head, at) = split_time(s)?;
        let (name, value) = head
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected NAME=VALUE, got '{head}'"))?;
        let value = match value {
            "true" => ParamValue::Bool(true),
            "false" => ParamValue::Bool(false),
            number => ParamValue::Float(
                number
                    .parse()
                    .map_err(|_| anyhow!("Invalid value '{number}' for '{name}'"))?,
            ),
        };
        Ok(Self {
            name: name.to_string(),
            value,
            at,
        })
    }
}

impl FromStr for ScheduledTrigger {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, at) = split_time(s)?;
        if name.is_empty() {
            bail!("Trigger name must not be empty");
        }
        Ok(Self {
            name: name.to_string(),
            at,
        })
    }
}

/// Parameter change of either kind, ordered by time
enum Event {
    Set(ScheduledParam),
    Trigger(ScheduledTrigger),
}

impl Event {
    fn at(&self) -> f32 {
        match self {
            Self::Set(param) => param.at,
            Self::Trigger(trigger) => trigger.at,
        }
    }
}

pub fn execute(command: GraphCommands) -> Result<()> {
    match command {
        GraphCommands::Info { file, no_color } => execute_info(&file, no_color),
        GraphCommands::Run {
            file,
            skeleton,
            duration,
            fps,
            set,
            trigger,
            blend,
            trace,
        } => {
            let mut events: Vec<Event> = set
                .into_iter()
                .map(Event::Set)
                .chain(trigger.into_iter().map(Event::Trigger))
                .collect();
            events.sort_by(|a, b| a.at().total_cmp(&b.at()));

            let options = RunOptions {
                duration,
                fps,
                trace,
            };
            let graph = Arc::new(load_graph(&file)?);
            let mut skeleton = load_skeleton(&skeleton)?;
            match blend {
                BlendMode::Cellwise => {
                    let animator = Animator::with_blend(graph, &skeleton, CellwiseBlend)?;
                    run(animator, &mut skeleton, &events, &options)
                }
                BlendMode::Decomposed => {
                    let animator = Animator::with_blend(graph, &skeleton, DecomposedBlend)?;
                    run(animator, &mut skeleton, &events, &options)
                }
            }
        }
    }
}

fn load_graph(path: &Path) -> Result<AnimationGraph> {
    let def = AnimationGraphDef::load(path)
        .with_context(|| format!("Failed to read graph definition {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    def.resolve_from_dir(base_dir)
        .with_context(|| format!("Failed to resolve graph {}", path.display()))
}

fn execute_info(path: &Path, no_color: bool) -> Result<()> {
    let graph = load_graph(path)?;
    let entry = graph.entry_state();

    let mut root = TreeNode::new(path.display().to_string(), NodeType::Root)
        .with_metadata("states", &graph.state_count().to_string());
    for (id, state) in graph.states() {
        let motion = graph.motion(state.motion());
        let mut node = TreeNode::new(state.name(), NodeType::State)
            .with_metadata("motion", motion.name())
            .with_metadata("length", &format_seconds(motion.length()));
        if entry == Some(id) {
            node = node.with_metadata("entry", "yes");
        }
        for (_, transition) in graph.transitions_from(id) {
            node = node.add_child(
                TreeNode::new(
                    format!(
                        "{} -> {}",
                        transition.name,
                        graph.state(transition.to).name()
                    ),
                    NodeType::Transition,
                )
                .with_metadata("trigger", &format!("{:?}", transition.trigger))
                .with_metadata("blend", &format_seconds(transition.blend_seconds)),
            );
        }
        root = root.add_child(node);
    }

    let options = TreeOptions {
        no_color,
        compact: true,
        ..TreeOptions::default()
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

struct RunOptions {
    duration: f32,
    fps: u32,
    trace: bool,
}

fn run<B: BlendPose>(
    mut animator: Animator<B>,
    skeleton: &mut Skeleton,
    events: &[Event],
    options: &RunOptions,
) -> Result<()> {
    if options.fps == 0 {
        bail!("--fps must be positive");
    }
    if !options.duration.is_finite() || options.duration < 0.0 {
        bail!("--duration must be a non-negative number");
    }

    let step = 1.0 / options.fps as f32;
    let ticks = (options.duration * options.fps as f32).round() as usize;
    let mut pending = events.iter().peekable();
    let mut state = animator.current_state();
    let mut table = create_table(&["Time", "State", "Cursor", "Blend", "Root"]);

    println!(
        "{} {}",
        style(format_seconds(0.0)).dim(),
        style(format!("start in '{}'", animator.current_state_name())).bold()
    );

    for tick in 0..ticks {
        let now = tick as f32 * step;
        while let Some(event) = pending.next_if(|e| e.at() <= now) {
            let (label, started) = match event {
                Event::Set(param) => {
                    let started = match param.value {
                        ParamValue::Bool(value) => animator.set_bool(&param.name, value),
                        ParamValue::Float(value) => animator.set_float(&param.name, value),
                    };
                    (format!("set {}", param.name), started)
                }
                Event::Trigger(trigger) => (
                    format!("trigger {}", trigger.name),
                    animator.set_trigger(&trigger.name),
                ),
            };
            let outcome = if started {
                style("transition started").green()
            } else {
                style("ignored").dim()
            };
            println!("{} {label}: {outcome}", style(format_seconds(now)).dim());
        }

        animator.tick(skeleton, step)?;

        let after = now + step;
        if animator.current_state() != state {
            state = animator.current_state();
            println!(
                "{} entered '{}'",
                style(format_seconds(after)).dim(),
                style(animator.current_state_name()).yellow()
            );
        }

        if options.trace {
            let root = skeleton
                .roots()
                .next()
                .and_then(|index| skeleton.world_transform(index))
                .unwrap_or_default();
            add_table_row(
                &mut table,
                vec![
                    format_seconds(after),
                    animator.current_state_name().to_string(),
                    format!("{:.3}", animator.normalized_time()),
                    animator
                        .transition_progress()
                        .map_or_else(|| "-".to_string(), |p| format!("{p:.2}")),
                    format_position(&root),
                ],
            );
        }
    }

    if options.trace {
        table.printstd();
    }
    println!(
        "Finished in '{}' at cursor {:.3}",
        style(animator.current_state_name()).bold(),
        animator.normalized_time()
    );
    Ok(())
}
