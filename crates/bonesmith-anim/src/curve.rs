//! Keyframe curves for a single scalar animation channel

use std::io::{Read, Write};

use crate::common::BinaryFormat;
use crate::error::{AnimError, Result};
use crate::io_ext::{ReadExt, WriteExt};

/// How the segment ending at a keyframe is interpolated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InterpolationType {
    /// Hold the earlier key's value
    Constant,
    /// Straight line between the two keys
    #[default]
    Linear,
    /// Hermite spline using the stored key slopes
    Cubic,
}

impl InterpolationType {
    /// Decode the on-disk interpolation code
    pub fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Constant),
            1 => Ok(Self::Linear),
            2 => Ok(Self::Cubic),
            other => Err(AnimError::InvalidInterpolationType(other)),
        }
    }

    /// The on-disk interpolation code
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Constant => 0,
            Self::Linear => 1,
            Self::Cubic => 2,
        }
    }
}

/// A single keyframe of a [`TransformationCurve`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyFrame {
    /// Key time in seconds
    pub time: f32,
    /// Interpolation used for the segment ending at this key
    pub interpolation: InterpolationType,
    /// Channel value at this key
    pub value: f32,
    /// Incoming slope (only stored for cubic keys)
    pub left_slope: f32,
    /// Outgoing slope (only stored for cubic keys)
    pub right_slope: f32,
}

impl KeyFrame {
    pub const fn constant(time: f32, value: f32) -> Self {
        Self {
            time,
            interpolation: InterpolationType::Constant,
            value,
            left_slope: 0.0,
            right_slope: 0.0,
        }
    }

    pub const fn linear(time: f32, value: f32) -> Self {
        Self {
            time,
            interpolation: InterpolationType::Linear,
            value,
            left_slope: 0.0,
            right_slope: 0.0,
        }
    }

    pub const fn cubic(time: f32, value: f32, left_slope: f32, right_slope: f32) -> Self {
        Self {
            time,
            interpolation: InterpolationType::Cubic,
            value,
            left_slope,
            right_slope,
        }
    }
}

impl BinaryFormat for KeyFrame {
    fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let time = reader.read_f32_le()?;
        let interpolation = InterpolationType::from_raw(reader.read_i32_le()?)?;
        let value = reader.read_f32_le()?;

        let (left_slope, right_slope) = if interpolation == InterpolationType::Cubic {
            (reader.read_f32_le()?, reader.read_f32_le()?)
        } else {
            (0.0, 0.0)
        };

        Ok(Self {
            time,
            interpolation,
            value,
            left_slope,
            right_slope,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32_le(self.time)?;
        writer.write_i32_le(self.interpolation.to_raw())?;
        writer.write_f32_le(self.value)?;
        if self.interpolation == InterpolationType::Cubic {
            writer.write_f32_le(self.left_slope)?;
            writer.write_f32_le(self.right_slope)?;
        }
        Ok(())
    }
}

/// The pair of keys surrounding a sample time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBracket {
    /// Index of the earlier key
    pub lower: usize,
    /// Index of the later key
    pub upper: usize,
    /// Position between the two keys in `[0, 1)`
    pub blend: f32,
}

impl KeyBracket {
    const fn single(index: usize) -> Self {
        Self {
            lower: index,
            upper: index,
            blend: 0.0,
        }
    }
}

/// Ordered keyframes for one scalar channel.
///
/// Always holds at least one key, with key times in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationCurve {
    keys: Vec<KeyFrame>,
}

impl TransformationCurve {
    /// Build a curve, rejecting empty or out-of-order key lists
    pub fn new(keys: Vec<KeyFrame>) -> Result<Self> {
        if keys.is_empty() {
            return Err(AnimError::EmptyCurve);
        }
        if let Some(index) = keys.windows(2).position(|w| w[1].time < w[0].time) {
            return Err(AnimError::UnorderedKeys { index: index + 1 });
        }
        Ok(Self { keys })
    }

    /// A curve holding a single value forever
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![KeyFrame::constant(0.0, value)],
        }
    }

    pub fn keys(&self) -> &[KeyFrame] {
        &self.keys
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Time of the first key
    pub fn start_time(&self) -> f32 {
        self.keys[0].time
    }

    /// Time of the last key
    pub fn end_time(&self) -> f32 {
        self.keys[self.keys.len() - 1].time
    }

    /// Find the keys surrounding `time`.
    ///
    /// An exact key match is returned as both ends with blend 0. Otherwise the
    /// first key later than `time` is the upper end and its predecessor (or
    /// itself, for the first key) the lower end. A time past the last key
    /// brackets the first key with blend 0; the curve does not extrapolate.
    #[allow(clippy::float_cmp)]
    pub fn bracket(&self, time: f32) -> KeyBracket {
        for (index, key) in self.keys.iter().enumerate() {
            if key.time == time {
                return KeyBracket::single(index);
            }

            if key.time > time {
                if index == 0 {
                    return KeyBracket::single(0);
                }
                let lower = &self.keys[index - 1];
                return KeyBracket {
                    lower: index - 1,
                    upper: index,
                    blend: (time - lower.time) / (key.time - lower.time),
                };
            }
        }

        KeyBracket::single(0)
    }

    /// Sample the channel at `time`.
    ///
    /// Rotation channels (degrees) take the shortest angular path between the
    /// two bracketing keys.
    pub fn value_at(&self, time: f32, is_rotation: bool) -> f32 {
        let bracket = self.bracket(time);
        let lower = &self.keys[bracket.lower];
        let upper = &self.keys[bracket.upper];

        let upper_value = if is_rotation {
            shortest_angle_to(lower.value, upper.value)
        } else {
            upper.value
        };

        lerp_on_type(lower, upper, upper_value, bracket.blend)
    }
}

impl BinaryFormat for TransformationCurve {
    fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let count = reader.read_count("keyframe")?;
        let keys = (0..count)
            .map(|_| KeyFrame::parse(reader))
            .collect::<Result<Vec<_>>>()?;
        Self::new(keys)
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_count(self.keys.len())?;
        for key in &self.keys {
            key.write(writer)?;
        }
        Ok(())
    }
}

/// Shift `upper` by whole turns so it lies within 180 degrees of `lower`
pub fn shortest_angle_to(lower: f32, upper: f32) -> f32 {
    let turns = ((upper - lower) / 360.0).round();
    upper - turns * 360.0
}

/// Interpolate between two keys using the later key's interpolation type.
///
/// `right_value` is passed separately so callers can substitute a
/// wrap-corrected value for the later key.
pub fn lerp_on_type(left: &KeyFrame, right: &KeyFrame, right_value: f32, t: f32) -> f32 {
    let left_value = left.value;
    match right.interpolation {
        InterpolationType::Constant => left_value,
        InterpolationType::Linear => left_value + (right_value - left_value) * t,
        InterpolationType::Cubic => {
            let delta = right_value - left_value;
            let a = left.right_slope - delta;
            let b = -right.left_slope + delta;
            let u = 1.0 - t;
            u * left_value + t * right_value + t * u * (u * a + t * b)
        }
    }
}
