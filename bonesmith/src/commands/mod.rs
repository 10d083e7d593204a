//! Command implementations for each file type

pub mod graph;
pub mod motion;
pub mod skeleton;
