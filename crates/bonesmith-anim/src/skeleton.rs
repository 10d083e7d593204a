//! Joint hierarchy with bind pose and per-frame world transforms

use glam::Mat4;
use std::io::{Read, Write};

use crate::common::BinaryFormat;
use crate::error::{AnimError, Result};
use crate::io_ext::{ReadExt, WriteExt};
use crate::joint::{Joint, JointIndex, JointMeta, ROOT_PARENT_INDEX};

/// Skeleton file version written and accepted by this crate
pub const SKELETON_FILE_VERSION: i32 = 1;

/// An ordered joint hierarchy.
///
/// Joint data is stored in parallel arrays indexed by [`JointIndex`]. A
/// joint's parent always has a smaller index, so walking indices in ascending
/// order visits every parent before its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    /// Joint names
    names: Vec<String>,
    /// Parent of each joint, `None` for roots
    parents: Vec<Option<JointIndex>>,
    /// Non-propagating per-joint attachment transforms
    geometric_transforms: Vec<Mat4>,
    /// Bind pose local transforms
    local_transforms: Vec<Mat4>,
    /// World transforms from the latest update pass
    world_transforms: Vec<Mat4>,
    /// Inverse of each joint's bind pose world transform
    bind_world_inverses: Vec<Mat4>,
    /// Pivot and offset constants per joint
    metas: Vec<JointMeta>,
    /// Axis and handedness conversion applied above every root
    import_transform: Mat4,
}

impl Skeleton {
    /// Create an empty skeleton with the given import transform
    pub fn new(import_transform: Mat4) -> Self {
        Self {
            names: Vec::new(),
            parents: Vec::new(),
            geometric_transforms: Vec::new(),
            local_transforms: Vec::new(),
            world_transforms: Vec::new(),
            bind_world_inverses: Vec::new(),
            metas: Vec::new(),
            import_transform,
        }
    }

    /// Append a joint and capture its bind pose.
    ///
    /// `parent` must name a joint that was appended earlier. The joint's bind
    /// world transform is computed from the parent's current world transform,
    /// so joints should be added while the skeleton is still in bind pose.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: Option<JointIndex>,
        geometric_transform: Mat4,
        local_transform: Mat4,
        meta: JointMeta,
    ) -> Result<JointIndex> {
        let index = self.names.len();
        if let Some(parent) = parent
            && parent >= index
        {
            return Err(AnimError::InvalidParent {
                joint: index,
                parent: i32::try_from(parent).unwrap_or(i32::MAX),
            });
        }

        self.names.push(name.into());
        self.parents.push(parent);
        self.geometric_transforms.push(geometric_transform);
        self.local_transforms.push(local_transform);
        self.world_transforms.push(Mat4::IDENTITY);
        self.metas.push(meta);

        self.set_world_transform_for_joint(index, Mat4::IDENTITY);
        self.bind_world_inverses
            .push(self.world_transforms[index].inverse());

        Ok(index)
    }

    /// Recompute one joint's world transform from an animation delta.
    ///
    /// The result is `parent_world * local_delta * bind_local`, where
    /// `parent_world` is the parent's current world transform (or the import
    /// transform for a root). Parents must be updated before their children
    /// within a pass.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set_world_transform_for_joint(&mut self, index: JointIndex, local_delta: Mat4) {
        let parent_world = match self.parents[index] {
            Some(parent) => self.world_transforms[parent],
            None => self.import_transform,
        };
        self.world_transforms[index] = parent_world * local_delta * self.local_transforms[index];
    }

    /// Fold each joint's geometric transform into its world transform.
    ///
    /// Run once after all joints of a pass have been updated; the geometric
    /// transform never reaches child joints.
    pub fn apply_geometric_transforms(&mut self) {
        for (world, geometric) in self
            .world_transforms
            .iter_mut()
            .zip(&self.geometric_transforms)
        {
            *world *= *geometric;
        }
    }

    /// Run a full update pass from one delta matrix per joint
    pub fn apply_pose(&mut self, deltas: &[Mat4]) -> Result<()> {
        if deltas.len() != self.joint_count() {
            return Err(AnimError::CurveCountMismatch {
                curves: deltas.len(),
                joints: self.joint_count(),
            });
        }

        for (index, delta) in deltas.iter().enumerate() {
            self.set_world_transform_for_joint(index, *delta);
        }
        self.apply_geometric_transforms();
        Ok(())
    }

    /// Put every joint back into its bind pose
    pub fn reset_to_bind_pose(&mut self) {
        for index in 0..self.joint_count() {
            self.set_world_transform_for_joint(index, Mat4::IDENTITY);
        }
        self.apply_geometric_transforms();
    }

    pub fn joint_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn import_transform(&self) -> Mat4 {
        self.import_transform
    }

    /// Snapshot of one joint
    pub fn joint(&self, index: JointIndex) -> Option<Joint> {
        Some(Joint {
            name: self.names.get(index)?.clone(),
            parent: self.parents[index],
            geometric_transform: self.geometric_transforms[index],
            local_transform: self.local_transforms[index],
            world_transform: self.world_transforms[index],
            meta: self.metas[index],
        })
    }

    /// Snapshots of every joint in index order
    pub fn joints(&self) -> impl Iterator<Item = Joint> + '_ {
        (0..self.joint_count()).filter_map(|index| self.joint(index))
    }

    /// Index of the first joint with the given name
    pub fn joint_index(&self, name: &str) -> Option<JointIndex> {
        self.names.iter().position(|n| n == name)
    }

    pub fn joint_name(&self, index: JointIndex) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn parent(&self, index: JointIndex) -> Option<JointIndex> {
        self.parents.get(index).copied().flatten()
    }

    pub fn meta(&self, index: JointIndex) -> Option<&JointMeta> {
        self.metas.get(index)
    }

    /// Direct children of a joint, in index order
    pub fn children(&self, index: JointIndex) -> impl Iterator<Item = JointIndex> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter(move |(_, parent)| **parent == Some(index))
            .map(|(child, _)| child)
    }

    /// Joints without a parent
    pub fn roots(&self) -> impl Iterator<Item = JointIndex> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(index, _)| index)
    }

    pub fn local_transform(&self, index: JointIndex) -> Option<Mat4> {
        self.local_transforms.get(index).copied()
    }

    pub fn geometric_transform(&self, index: JointIndex) -> Option<Mat4> {
        self.geometric_transforms.get(index).copied()
    }

    pub fn world_transform(&self, index: JointIndex) -> Option<Mat4> {
        self.world_transforms.get(index).copied()
    }

    /// World transforms from the latest update pass, indexed by joint
    pub fn world_transforms(&self) -> &[Mat4] {
        &self.world_transforms
    }

    pub fn bind_world_inverse(&self, index: JointIndex) -> Option<Mat4> {
        self.bind_world_inverses.get(index).copied()
    }

    /// The palette used for skinning.
    ///
    /// Expects world transforms from a full pass ([`Self::apply_pose`] or
    /// [`Self::reset_to_bind_pose`]), so each joint's geometric transform is
    /// stripped again: `world * geometric^-1 * bind_world_inverse`. A skeleton
    /// in bind pose yields identity for every joint.
    pub fn skinning_matrices(&self) -> Vec<Mat4> {
        self.world_transforms
            .iter()
            .zip(&self.geometric_transforms)
            .zip(&self.bind_world_inverses)
            .map(|((world, geometric), inverse)| *world * geometric.inverse() * *inverse)
            .collect()
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl BinaryFormat for Skeleton {
    fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let version = reader.read_i32_le()?;
        if version != SKELETON_FILE_VERSION {
            return Err(AnimError::UnsupportedVersion {
                kind: "skeleton",
                version,
                expected: SKELETON_FILE_VERSION,
            });
        }

        let joint_count = reader.read_count("joint")?;
        let import_transform = reader.read_mat4()?;
        let mut skeleton = Self::new(import_transform);

        for index in 0..joint_count {
            let name = reader.read_cstring()?;
            let raw_parent = reader.read_i32_le()?;
            let parent = match raw_parent {
                ROOT_PARENT_INDEX => None,
                p => Some(usize::try_from(p).map_err(|_| AnimError::InvalidParent {
                    joint: index,
                    parent: p,
                })?),
            };
            let geometric_transform = reader.read_mat4()?;
            let local_transform = reader.read_mat4()?;
            let meta = JointMeta {
                rotation_offset: reader.read_vec3()?,
                rotation_pivot: reader.read_vec3()?,
                scale_offset: reader.read_vec3()?,
                scale_pivot: reader.read_vec3()?,
                pre_rotation: reader.read_mat4()?,
                post_rotation: reader.read_mat4()?,
            };

            skeleton.add_joint(name, parent, geometric_transform, local_transform, meta)?;
        }

        skeleton.apply_geometric_transforms();
        log::debug!("Parsed skeleton with {} joints", skeleton.joint_count());
        Ok(skeleton)
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32_le(SKELETON_FILE_VERSION)?;
        writer.write_count(self.joint_count())?;
        writer.write_mat4(&self.import_transform)?;

        for index in 0..self.joint_count() {
            writer.write_cstring(&self.names[index])?;
            let parent = match self.parents[index] {
                Some(parent) => i32::try_from(parent).map_err(|_| {
                    AnimError::ParseError(format!("parent index {parent} does not fit in i32"))
                })?,
                None => ROOT_PARENT_INDEX,
            };
            writer.write_i32_le(parent)?;
            writer.write_mat4(&self.geometric_transforms[index])?;
            writer.write_mat4(&self.local_transforms[index])?;

            let meta = &self.metas[index];
            writer.write_vec3(meta.rotation_offset)?;
            writer.write_vec3(meta.rotation_pivot)?;
            writer.write_vec3(meta.scale_offset)?;
            writer.write_vec3(meta.scale_pivot)?;
            writer.write_mat4(&meta.pre_rotation)?;
            writer.write_mat4(&meta.post_rotation)?;
        }

        log::debug!("Wrote skeleton with {} joints", self.joint_count());
        Ok(())
    }
}
