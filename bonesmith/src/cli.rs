//! Root CLI structure for bonesmith

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bonesmith")]
#[command(about = "Command-line tools for skeletons, motions and animation graphs", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Skeleton file operations
    Skeleton {
        #[command(subcommand)]
        command: crate::commands::skeleton::SkeletonCommands,
    },

    /// Motion file operations
    Motion {
        #[command(subcommand)]
        command: crate::commands::motion::MotionCommands,
    },

    /// Animation graph operations
    Graph {
        #[command(subcommand)]
        command: crate::commands::graph::GraphCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
