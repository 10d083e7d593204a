//! Per-joint data: pivot/offset metadata and value snapshots

use glam::{Mat4, Vec3};

/// Index of a joint inside its [`Skeleton`](crate::Skeleton)
pub type JointIndex = usize;

/// On-disk parent index of a root joint
pub const ROOT_PARENT_INDEX: i32 = -1;

/// Pivot, offset and pre/post rotation constants captured at import time.
///
/// They let a decomposed (translation, rotation, scale) animation sample be
/// recomposed in the same local-space convention the bind pose was authored in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointMeta {
    pub rotation_offset: Vec3,
    pub rotation_pivot: Vec3,
    pub scale_offset: Vec3,
    pub scale_pivot: Vec3,
    pub pre_rotation: Mat4,
    pub post_rotation: Mat4,
}

impl JointMeta {
    /// Metadata that adds nothing on top of plain T * R * S
    pub const IDENTITY: Self = Self {
        rotation_offset: Vec3::ZERO,
        rotation_pivot: Vec3::ZERO,
        scale_offset: Vec3::ZERO,
        scale_pivot: Vec3::ZERO,
        pre_rotation: Mat4::IDENTITY,
        post_rotation: Mat4::IDENTITY,
    };

    /// Compose a local matrix from sampled channels.
    ///
    /// Applied to a point, the order is: scale about the scale pivot, scale
    /// offset, rotation about the rotation pivot (wrapped by the pre/post
    /// rotations), rotation offset, then translation.
    pub fn calculate_final_local(&self, translation: Mat4, rotation: Mat4, scale: Mat4) -> Mat4 {
        let scale_pivot = Mat4::from_translation(self.scale_pivot);
        let scale_pivot_inverse = Mat4::from_translation(-self.scale_pivot);
        let scale_offset = Mat4::from_translation(self.scale_offset);
        let rotation_pivot = Mat4::from_translation(self.rotation_pivot);
        let rotation_pivot_inverse = Mat4::from_translation(-self.rotation_pivot);
        let rotation_offset = Mat4::from_translation(self.rotation_offset);

        translation
            * rotation_offset
            * rotation_pivot
            * self.pre_rotation
            * rotation
            * self.post_rotation
            * rotation_pivot_inverse
            * scale_offset
            * scale_pivot
            * scale
            * scale_pivot_inverse
    }
}

impl Default for JointMeta {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A value snapshot of one joint; not connected to the skeleton it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub parent: Option<JointIndex>,
    pub geometric_transform: Mat4,
    pub local_transform: Mat4,
    pub world_transform: Mat4,
    pub meta: JointMeta,
}

impl Joint {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
