//! Skeleton file command implementations

use anyhow::{Context, Result};
use bonesmith_anim::{BinaryFormat, Skeleton};
use clap::Subcommand;
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::{
    NodeType, TreeNode, TreeOptions, add_table_row, create_table, format_bytes, format_position,
    format_vec3, render_tree,
};

#[derive(Subcommand)]
pub enum SkeletonCommands {
    /// Display information about a skeleton file
    Info {
        /// Path to the skeleton file
        file: PathBuf,

        /// List every joint
        #[arg(short, long)]
        detailed: bool,
    },

    /// Display the joint hierarchy as a tree
    Tree {
        /// Path to the skeleton file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show compact metadata inline
        #[arg(long)]
        compact: bool,
    },
}

pub fn execute(command: SkeletonCommands) -> Result<()> {
    match command {
        SkeletonCommands::Info { file, detailed } => execute_info(&file, detailed),
        SkeletonCommands::Tree {
            file,
            depth,
            no_color,
            compact,
        } => execute_tree(&file, depth, no_color, compact),
    }
}

/// Load a skeleton with the file path in the error context
pub fn load_skeleton(path: &Path) -> Result<Skeleton> {
    Skeleton::load(path)
        .with_context(|| format!("Failed to load skeleton from {}", path.display()))
}

fn execute_info(path: &Path, detailed: bool) -> Result<()> {
    let skeleton = load_skeleton(path)?;
    let size = fs::metadata(path).map(|m| m.len()).unwrap_or_default();

    println!("\n{}", style("Skeleton Information").bold().underlined());
    println!("File: {} ({})", style(path.display()).cyan(), format_bytes(size));
    println!("Joints: {}", style(skeleton.joint_count()).green());

    let roots: Vec<&str> = skeleton
        .roots()
        .filter_map(|index| skeleton.joint_name(index))
        .collect();
    println!("Roots: {}", style(roots.join(", ")).yellow());

    let (scale, rotation, translation) = skeleton.import_transform().to_scale_rotation_translation();
    let (axis, angle) = rotation.to_axis_angle();
    println!(
        "Import transform: scale {}, rotation {:.1}° about {}, translation {}",
        format_vec3(scale),
        angle.to_degrees(),
        format_vec3(axis),
        format_vec3(translation)
    );

    if detailed {
        println!("\n{}", style("Joints").bold());
        let mut table = create_table(&["#", "Name", "Parent", "Bind position", "Children"]);
        for joint in 0..skeleton.joint_count() {
            let parent = skeleton
                .parent(joint)
                .and_then(|p| skeleton.joint_name(p))
                .unwrap_or("-");
            let world = skeleton.world_transform(joint).unwrap_or_default();
            add_table_row(
                &mut table,
                vec![
                    joint.to_string(),
                    skeleton.joint_name(joint).unwrap_or_default().to_string(),
                    parent.to_string(),
                    format_position(&world),
                    skeleton.children(joint).count().to_string(),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

fn joint_node(skeleton: &Skeleton, joint: usize) -> TreeNode {
    let children: Vec<usize> = skeleton.children(joint).collect();
    let node_type = if children.is_empty() {
        NodeType::Leaf
    } else {
        NodeType::Joint
    };
    let world = skeleton.world_transform(joint).unwrap_or_default();

    children.into_iter().fold(
        TreeNode::new(skeleton.joint_name(joint).unwrap_or_default(), node_type)
            .with_metadata("index", &joint.to_string())
            .with_metadata("position", &format_position(&world)),
        |node, child| node.add_child(joint_node(skeleton, child)),
    )
}

fn execute_tree(path: &Path, depth: Option<usize>, no_color: bool, compact: bool) -> Result<()> {
    let skeleton = load_skeleton(path)?;

    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let root = skeleton.roots().fold(
        TreeNode::new(file_name, NodeType::Root)
            .with_metadata("joints", &skeleton.joint_count().to_string()),
        |node, joint| node.add_child(joint_node(&skeleton, joint)),
    );

    let options = TreeOptions {
        max_depth: depth,
        no_color,
        show_metadata: true,
        compact,
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}
