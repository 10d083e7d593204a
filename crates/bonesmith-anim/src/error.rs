use std::io;
use thiserror::Error;

/// Error types for skeleton, motion and animation graph processing
#[derive(Error, Debug)]
pub enum AnimError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported file version
    #[error("Unsupported {kind} version: {version} (expected {expected})")]
    UnsupportedVersion {
        kind: &'static str,
        version: i32,
        expected: i32,
    },

    /// Keyframe carries an interpolation code that is not constant, linear or cubic
    #[error("Invalid interpolation type: {0}")]
    InvalidInterpolationType(i32),

    /// A transformation curve was built without keyframes
    #[error("Transformation curve has no keyframes")]
    EmptyCurve,

    /// Keyframe times must be ascending
    #[error("Keyframe times are not ascending at key {index}")]
    UnorderedKeys { index: usize },

    /// A joint references a parent that has not been appended yet
    #[error("Joint {joint} references parent {parent}, which is not an earlier joint")]
    InvalidParent { joint: usize, parent: i32 },

    /// A count field in a file was negative
    #[error("Negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i32 },

    /// A joint name was not valid UTF-8
    #[error("Invalid string: {0}")]
    InvalidString(String),

    /// Motion animates more joints than the skeleton has
    #[error("Motion has {curves} curves but the skeleton only has {joints} joints")]
    CurveCountMismatch { curves: usize, joints: usize },

    /// Motion or state length that cannot be used for normalized time
    #[error("Invalid length: {0}")]
    InvalidLength(f32),

    /// State name lookup failed while building a graph
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// Motion name lookup failed while building a graph
    #[error("Unknown motion: {0}")]
    UnknownMotion(String),

    /// A handle does not belong to the graph it was used with
    #[error("Invalid {kind} handle: {index}")]
    InvalidHandle { kind: &'static str, index: usize },

    /// A transition was started while another one is still blending
    #[error("Transition '{requested}' cannot start while '{running}' is blending")]
    TransitionInProgress { requested: String, running: String },

    /// A transition was started from a state it does not leave
    #[error("Transition '{transition}' does not leave the current state '{state}'")]
    TransitionNotFromState { transition: String, state: String },

    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Animation graph definition could not be read or resolved
    #[cfg(feature = "serde")]
    #[error("Graph definition error: {0}")]
    GraphDefinition(String),
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
