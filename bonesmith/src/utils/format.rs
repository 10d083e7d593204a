//! Formatting utilities

use glam::{Mat4, Vec3};
use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a vector with three decimals per component
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Translation part of a transform
pub fn format_position(m: &Mat4) -> String {
    format_vec3(m.w_axis.truncate())
}

/// Format a duration in seconds
pub fn format_seconds(seconds: f32) -> String {
    format!("{seconds:.3}s")
}
