//! Motion file command implementations

use anyhow::{Context, Result, bail};
use bonesmith_anim::{Axis, BinaryFormat, Channel, Motion};
use clap::Subcommand;
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

use super::skeleton::load_skeleton;
use crate::utils::{add_table_row, create_table, format_bytes, format_position, format_seconds};

#[derive(Subcommand)]
pub enum MotionCommands {
    /// Display information about a motion file
    Info {
        /// Path to the motion file
        file: PathBuf,

        /// Show key counts for every curve
        #[arg(short, long)]
        detailed: bool,
    },

    /// Pose a skeleton with a motion and print joint positions
    Sample {
        /// Path to the motion file
        file: PathBuf,

        /// Skeleton to pose
        #[arg(short, long)]
        skeleton: PathBuf,

        /// Normalized time in [0, 1]
        #[arg(short, long, default_value = "0.0")]
        time: f32,

        /// Only print this joint
        #[arg(short, long)]
        joint: Option<String>,
    },
}

pub fn execute(command: MotionCommands) -> Result<()> {
    match command {
        MotionCommands::Info { file, detailed } => execute_info(&file, detailed),
        MotionCommands::Sample {
            file,
            skeleton,
            time,
            joint,
        } => execute_sample(&file, &skeleton, time, joint.as_deref()),
    }
}

/// Load a motion named after its file stem
pub fn load_motion(path: &Path) -> Result<Motion> {
    let motion = Motion::load(path)
        .with_context(|| format!("Failed to load motion from {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(motion.with_name(name))
}

fn execute_info(path: &Path, detailed: bool) -> Result<()> {
    let motion = load_motion(path)?;
    let size = fs::metadata(path).map(|m| m.len()).unwrap_or_default();
    let keys: usize = motion.curves().iter().map(|c| c.key_count()).sum();

    println!("\n{}", style("Motion Information").bold().underlined());
    println!("File: {} ({})", style(path.display()).cyan(), format_bytes(size));
    println!("Length: {}", style(format_seconds(motion.length())).green());
    println!("Start time: {}", format_seconds(motion.start_time()));
    println!("Curves: {}", style(motion.curve_count()).green());
    println!("Keyframes: {}", style(keys).green());

    if detailed {
        println!("\n{}", style("Curves").bold());
        let mut table = create_table(&["Joint", "Scale", "Rotation", "Translation", "Last key"]);
        for (index, curve) in motion.curves().iter().enumerate() {
            let counts = |channel: Channel| {
                Axis::ALL
                    .iter()
                    .map(|&axis| curve.curve(channel, axis).key_count().to_string())
                    .collect::<Vec<_>>()
                    .join("/")
            };
            add_table_row(
                &mut table,
                vec![
                    index.to_string(),
                    counts(Channel::Scale),
                    counts(Channel::Rotation),
                    counts(Channel::Translation),
                    format_seconds(curve.end_time()),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

fn execute_sample(path: &Path, skeleton_path: &Path, time: f32, joint: Option<&str>) -> Result<()> {
    if !(0.0..=1.0).contains(&time) {
        bail!("Normalized time must be within [0, 1], got {time}");
    }

    let motion = load_motion(path)?;
    let mut skeleton = load_skeleton(skeleton_path)?;

    let deltas = motion
        .matrices_for_skeleton_at_normalized_time(&skeleton, time)
        .with_context(|| format!("Motion '{}' does not fit the skeleton", motion.name()))?;
    skeleton.apply_pose(&deltas)?;

    let joints: Vec<usize> = match joint {
        Some(name) => vec![
            skeleton
                .joint_index(name)
                .with_context(|| format!("No joint named '{name}'"))?,
        ],
        None => (0..skeleton.joint_count()).collect(),
    };

    println!(
        "{} at t={:.3} ({})",
        style(motion.name()).bold(),
        time,
        format_seconds(motion.absolute_time(time))
    );
    let mut table = create_table(&["#", "Joint", "World position"]);
    for index in joints {
        let world = skeleton.world_transform(index).unwrap_or_default();
        add_table_row(
            &mut table,
            vec![
                index.to_string(),
                skeleton.joint_name(index).unwrap_or_default().to_string(),
                format_position(&world),
            ],
        );
    }
    table.printstd();

    Ok(())
}
