//! Shared fixtures for integration tests
#![allow(dead_code)]

use bonesmith_anim::{
    AnimationCurve, JointMeta, KeyFrame, Motion, Skeleton, TransformationCurve,
    euler_rotation_degrees,
};
use glam::{Mat4, Vec3};

/// Bind pose parameters of one fixture joint
pub struct BindJoint {
    pub name: &'static str,
    pub parent: Option<usize>,
    pub translation: Vec3,
    pub rotation_degrees: Vec3,
    pub scale: Vec3,
    pub meta: JointMeta,
    pub geometric: Mat4,
}

impl BindJoint {
    pub fn local(&self) -> Mat4 {
        self.meta.calculate_final_local(
            Mat4::from_translation(self.translation),
            euler_rotation_degrees(self.rotation_degrees),
            Mat4::from_scale(self.scale),
        )
    }

    /// A curve that holds this joint in its bind pose
    pub fn bind_curve(&self) -> AnimationCurve {
        AnimationCurve::constant(
            self.scale,
            self.rotation_degrees,
            self.translation,
            self.local().inverse(),
        )
    }
}

/// Hips -> spine -> head, plus a left arm off the spine
pub fn humanoid_joints() -> Vec<BindJoint> {
    vec![
        BindJoint {
            name: "hips",
            parent: None,
            translation: Vec3::new(0.0, 1.0, 0.0),
            rotation_degrees: Vec3::ZERO,
            scale: Vec3::ONE,
            meta: JointMeta::IDENTITY,
            geometric: Mat4::IDENTITY,
        },
        BindJoint {
            name: "spine",
            parent: Some(0),
            translation: Vec3::new(0.0, 0.5, 0.0),
            rotation_degrees: Vec3::new(10.0, 0.0, 5.0),
            scale: Vec3::ONE,
            meta: JointMeta {
                rotation_pivot: Vec3::new(0.0, 0.1, 0.0),
                ..JointMeta::IDENTITY
            },
            geometric: Mat4::IDENTITY,
        },
        BindJoint {
            name: "head",
            parent: Some(1),
            translation: Vec3::new(0.0, 0.6, 0.1),
            rotation_degrees: Vec3::new(0.0, 30.0, 0.0),
            scale: Vec3::splat(1.1),
            meta: JointMeta {
                scale_pivot: Vec3::new(0.0, 0.2, 0.0),
                pre_rotation: Mat4::from_rotation_x(0.2),
                ..JointMeta::IDENTITY
            },
            geometric: Mat4::from_translation(Vec3::new(0.0, 0.05, 0.0)),
        },
        BindJoint {
            name: "arm_l",
            parent: Some(1),
            translation: Vec3::new(0.3, 0.4, 0.0),
            rotation_degrees: Vec3::new(0.0, 0.0, 90.0),
            scale: Vec3::ONE,
            meta: JointMeta {
                rotation_offset: Vec3::new(0.05, 0.0, 0.0),
                post_rotation: Mat4::from_rotation_z(-0.1),
                ..JointMeta::IDENTITY
            },
            geometric: Mat4::IDENTITY,
        },
    ]
}

pub fn build_skeleton(joints: &[BindJoint]) -> Skeleton {
    let mut skeleton = Skeleton::new(Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2));
    for joint in joints {
        skeleton
            .add_joint(
                joint.name,
                joint.parent,
                joint.geometric,
                joint.local(),
                joint.meta,
            )
            .unwrap();
    }
    skeleton
}

pub fn humanoid() -> Skeleton {
    build_skeleton(&humanoid_joints())
}

/// A clip holding every humanoid joint in bind pose
pub fn bind_motion(length: f32) -> Motion {
    let curves = humanoid_joints().iter().map(BindJoint::bind_curve).collect();
    Motion::new("bind", curves, length, 0.0).unwrap()
}

/// A one-curve clip that slides the root along x from 0 to `distance`
pub fn slide_motion(name: &str, distance: f32, length: f32) -> Motion {
    let joints = humanoid_joints();
    let hips = &joints[0];
    let x = TransformationCurve::new(vec![
        KeyFrame::linear(0.0, hips.translation.x),
        KeyFrame::linear(length, hips.translation.x + distance),
    ])
    .unwrap();
    let curve = AnimationCurve::new(
        [
            TransformationCurve::constant(1.0),
            TransformationCurve::constant(1.0),
            TransformationCurve::constant(1.0),
        ],
        [
            TransformationCurve::constant(0.0),
            TransformationCurve::constant(0.0),
            TransformationCurve::constant(0.0),
        ],
        [
            x,
            TransformationCurve::constant(hips.translation.y),
            TransformationCurve::constant(hips.translation.z),
        ],
        hips.local().inverse(),
    );
    Motion::new(name, vec![curve], length, 0.0).unwrap()
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
