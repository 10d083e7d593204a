//! Nine-channel animation curve for one joint

use glam::{Mat4, Vec3};
use std::io::{Read, Write};

use crate::common::BinaryFormat;
use crate::curve::TransformationCurve;
use crate::error::Result;
use crate::io_ext::{ReadExt, WriteExt};
use crate::joint::JointMeta;

/// Which transformation a group of three curves drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Scale = 0,
    Rotation = 1,
    Translation = 2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Scale, Channel::Rotation, Channel::Translation];
}

/// Component of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Scale, rotation and translation curves (x/y/z each) for one joint, plus
/// the inverse of that joint's bind local transform.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationCurve {
    curves: [[TransformationCurve; 3]; 3],
    transformation_inverse: Mat4,
}

impl AnimationCurve {
    pub fn new(
        scale: [TransformationCurve; 3],
        rotation: [TransformationCurve; 3],
        translation: [TransformationCurve; 3],
        transformation_inverse: Mat4,
    ) -> Self {
        Self {
            curves: [scale, rotation, translation],
            transformation_inverse,
        }
    }

    /// A curve that holds one pose; rotation is in degrees
    pub fn constant(
        scale: Vec3,
        rotation_degrees: Vec3,
        translation: Vec3,
        transformation_inverse: Mat4,
    ) -> Self {
        let axes = |v: Vec3| {
            [
                TransformationCurve::constant(v.x),
                TransformationCurve::constant(v.y),
                TransformationCurve::constant(v.z),
            ]
        };
        Self::new(
            axes(scale),
            axes(rotation_degrees),
            axes(translation),
            transformation_inverse,
        )
    }

    pub fn curve(&self, channel: Channel, axis: Axis) -> &TransformationCurve {
        &self.curves[channel as usize][axis as usize]
    }

    pub fn transformation_inverse(&self) -> Mat4 {
        self.transformation_inverse
    }

    /// Latest key time over all nine curves
    pub fn end_time(&self) -> f32 {
        self.curves
            .iter()
            .flatten()
            .map(TransformationCurve::end_time)
            .fold(0.0, f32::max)
    }

    /// Total number of keys over all nine curves
    pub fn key_count(&self) -> usize {
        self.curves
            .iter()
            .flatten()
            .map(TransformationCurve::key_count)
            .sum()
    }

    /// Sample one channel at `time`; rotation channels take the shortest path
    pub fn sample(&self, channel: Channel, time: f32) -> Vec3 {
        let is_rotation = channel == Channel::Rotation;
        let [x, y, z] = &self.curves[channel as usize];
        Vec3::new(
            x.value_at(time, is_rotation),
            y.value_at(time, is_rotation),
            z.value_at(time, is_rotation),
        )
    }

    /// Evaluate the joint's transform at `time` as a delta from its bind pose.
    ///
    /// The nine channels are sampled independently, recomposed through `meta`
    /// and multiplied by the inverse bind local transform, so sampling the
    /// bind pose yields identity.
    pub fn evaluate_local_transform_at(&self, time: f32, meta: &JointMeta) -> Mat4 {
        let scale = self.sample(Channel::Scale, time);
        let rotation = self.sample(Channel::Rotation, time);
        let translation = self.sample(Channel::Translation, time);

        let local = meta.calculate_final_local(
            Mat4::from_translation(translation),
            euler_rotation_degrees(rotation),
            Mat4::from_scale(scale),
        );

        local * self.transformation_inverse
    }
}

/// Euler rotation in degrees, X applied first, then the inverse of Y, then Z.
///
/// The inverted Y matches the axis convention of the importer that produced
/// the curve data.
pub fn euler_rotation_degrees(degrees: Vec3) -> Mat4 {
    Mat4::from_rotation_z(degrees.z.to_radians())
        * Mat4::from_rotation_y(-degrees.y.to_radians())
        * Mat4::from_rotation_x(degrees.x.to_radians())
}

impl BinaryFormat for AnimationCurve {
    fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let transformation_inverse = reader.read_mat4()?;
        let mut read_axes = || -> Result<[TransformationCurve; 3]> {
            Ok([
                TransformationCurve::parse(reader)?,
                TransformationCurve::parse(reader)?,
                TransformationCurve::parse(reader)?,
            ])
        };
        let scale = read_axes()?;
        let rotation = read_axes()?;
        let translation = read_axes()?;

        Ok(Self::new(scale, rotation, translation, transformation_inverse))
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_mat4(&self.transformation_inverse)?;
        for curve in self.curves.iter().flatten() {
            curve.write(writer)?;
        }
        Ok(())
    }
}
