//! Bonesmith CLI library
//!
//! Inspection and playback tools for skeleton, motion and animation graph files.

pub mod cli;
pub mod commands;
pub mod utils;
