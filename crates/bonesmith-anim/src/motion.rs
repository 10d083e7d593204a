//! Animation clips and normalized-time playback

use glam::Mat4;
use std::io::{Read, Write};

use crate::animation_curve::AnimationCurve;
use crate::common::BinaryFormat;
use crate::error::{AnimError, Result};
use crate::io_ext::{ReadExt, WriteExt};
use crate::skeleton::Skeleton;

/// Motion file version written and accepted by this crate
pub const MOTION_FILE_VERSION: i32 = 1;

/// How a normalized-time cursor behaves when it runs past the end of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlaybackMode {
    /// Stop on the last frame
    Clamp,
    /// Jump back to the first frame
    #[default]
    Looping,
    /// Play forwards then backwards; one round trip takes twice the clip length
    PingPong,
}

impl PlaybackMode {
    /// Move a cursor by `delta` (in clip lengths).
    ///
    /// Returns the new cursor and whether it wrapped (or, for `Clamp`, reached
    /// the end) during this step.
    pub fn advance(self, cursor: f32, delta: f32) -> (f32, bool) {
        match self {
            Self::Looping => {
                let next = cursor + delta;
                if (0.0..1.0).contains(&next) {
                    (next, false)
                } else {
                    (next.rem_euclid(1.0), true)
                }
            }
            Self::Clamp => {
                let next = (cursor + delta).clamp(0.0, 1.0);
                (next, next >= 1.0 && cursor < 1.0)
            }
            Self::PingPong => Self::Looping.advance(cursor, delta * 0.5),
        }
    }

    /// Seconds for the cursor to run from 0 to 1 on a clip of `length` seconds
    pub fn cycle_length(self, length: f32) -> f32 {
        match self {
            Self::Clamp | Self::Looping => length,
            Self::PingPong => length * 2.0,
        }
    }

    /// Map a cursor to the point of the clip that should be sampled
    pub fn sample_point(self, cursor: f32) -> f32 {
        match self {
            Self::Clamp | Self::Looping => cursor,
            Self::PingPong => {
                if cursor < 0.5 {
                    cursor * 2.0
                } else {
                    2.0 - cursor * 2.0
                }
            }
        }
    }
}

/// An animation clip: one [`AnimationCurve`] per joint, in skeleton order
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    name: String,
    curves: Vec<AnimationCurve>,
    total_length: f32,
    start_time: f32,
    playback_mode: PlaybackMode,
}

impl Motion {
    /// Create a clip; `total_length` must be positive and finite
    pub fn new(
        name: impl Into<String>,
        curves: Vec<AnimationCurve>,
        total_length: f32,
        start_time: f32,
    ) -> Result<Self> {
        if !total_length.is_finite() || total_length <= 0.0 {
            return Err(AnimError::InvalidLength(total_length));
        }
        if !start_time.is_finite() {
            return Err(AnimError::InvalidLength(start_time));
        }

        Ok(Self {
            name: name.into(),
            curves,
            total_length,
            start_time,
            playback_mode: PlaybackMode::default(),
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_playback_mode(mut self, mode: PlaybackMode) -> Self {
        self.playback_mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn curves(&self) -> &[AnimationCurve] {
        &self.curves
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Length of the clip in seconds
    pub fn length(&self) -> f32 {
        self.total_length
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.playback_mode
    }

    /// Curve time for a normalized position in the clip
    pub fn absolute_time(&self, normalized_time: f32) -> f32 {
        normalized_time * (self.total_length + self.start_time)
    }

    /// Check that this clip can drive `skeleton`.
    ///
    /// A clip with more curves than the skeleton has joints is rejected.
    /// Fewer curves is allowed; the extra joints keep their bind pose.
    pub fn check_skeleton(&self, skeleton: &Skeleton) -> Result<()> {
        let joints = skeleton.joint_count();
        if self.curves.len() > joints {
            return Err(AnimError::CurveCountMismatch {
                curves: self.curves.len(),
                joints,
            });
        }
        Ok(())
    }

    /// Evaluate one delta matrix per skeleton joint at a normalized time
    pub fn matrices_for_skeleton_at_normalized_time(
        &self,
        skeleton: &Skeleton,
        normalized_time: f32,
    ) -> Result<Vec<Mat4>> {
        let mut matrices = Vec::with_capacity(skeleton.joint_count());
        self.write_matrices_for_skeleton(skeleton, normalized_time, &mut matrices)?;
        Ok(matrices)
    }

    /// Like [`Motion::matrices_for_skeleton_at_normalized_time`] but reuses
    /// the caller's buffer
    pub fn write_matrices_for_skeleton(
        &self,
        skeleton: &Skeleton,
        normalized_time: f32,
        out: &mut Vec<Mat4>,
    ) -> Result<()> {
        self.check_skeleton(skeleton)?;

        let time = self.absolute_time(normalized_time);
        out.clear();
        for (index, curve) in self.curves.iter().enumerate() {
            let meta = skeleton.meta(index).copied().unwrap_or_default();
            out.push(curve.evaluate_local_transform_at(time, &meta));
        }
        out.resize(skeleton.joint_count(), Mat4::IDENTITY);

        log::trace!(
            "Evaluated '{}' at t={} ({} curves, {} joints)",
            self.name,
            time,
            self.curves.len(),
            skeleton.joint_count()
        );
        Ok(())
    }
}

impl BinaryFormat for Motion {
    fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let version = reader.read_i32_le()?;
        if version != MOTION_FILE_VERSION {
            return Err(AnimError::UnsupportedVersion {
                kind: "motion",
                version,
                expected: MOTION_FILE_VERSION,
            });
        }

        let total_length = reader.read_f32_le()?;
        let start_time = reader.read_f32_le()?;
        let curve_count = reader.read_count("curve")?;
        let curves = (0..curve_count)
            .map(|_| AnimationCurve::parse(reader))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Parsed motion: {} curves, length {}s, start {}s",
            curves.len(),
            total_length,
            start_time
        );
        Self::new(String::new(), curves, total_length, start_time)
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32_le(MOTION_FILE_VERSION)?;
        writer.write_f32_le(self.total_length)?;
        writer.write_f32_le(self.start_time)?;
        writer.write_count(self.curves.len())?;
        for curve in &self.curves {
            curve.write(writer)?;
        }
        Ok(())
    }
}
