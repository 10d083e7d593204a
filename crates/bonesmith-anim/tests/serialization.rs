//! Skeleton and motion files survive a write/read cycle unchanged

mod common;

use std::io::Cursor;

use bonesmith_anim::{
    AnimError, AnimationCurve, BinaryFormat, KeyFrame, MOTION_FILE_VERSION, Motion,
    SKELETON_FILE_VERSION, Skeleton, TransformationCurve,
};
use common::{bind_motion, humanoid};
use glam::{Mat4, Vec3};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn keyed_motion() -> Motion {
    let wobble = TransformationCurve::new(vec![
        KeyFrame::constant(0.0, 0.0),
        KeyFrame::linear(0.4, 45.0),
        KeyFrame::cubic(0.8, -30.0, 1.5, -2.25),
        KeyFrame::cubic(1.2, 179.5, 0.0, 0.0),
    ])
    .unwrap();
    let curve = AnimationCurve::new(
        [
            TransformationCurve::constant(1.0),
            TransformationCurve::constant(1.25),
            TransformationCurve::constant(1.0),
        ],
        [
            wobble.clone(),
            TransformationCurve::constant(0.0),
            wobble,
        ],
        [
            TransformationCurve::constant(0.1),
            TransformationCurve::new(vec![KeyFrame::linear(0.0, 0.0), KeyFrame::linear(1.2, 2.0)])
                .unwrap(),
            TransformationCurve::constant(-0.3),
        ],
        Mat4::from_translation(Vec3::new(-0.1, 0.0, 0.3)),
    );
    let mut curves = bind_motion(1.2).curves().to_vec();
    curves[1] = curve;
    Motion::new("", curves, 1.2, 0.05).unwrap()
}

#[test]
fn skeleton_roundtrip_is_exact() {
    let mut skeleton = humanoid();
    skeleton.apply_geometric_transforms();

    let bytes = skeleton.to_bytes().unwrap();
    assert_eq!(&bytes[0..4], &SKELETON_FILE_VERSION.to_le_bytes());

    let parsed = Skeleton::parse(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(parsed, skeleton);
    assert_eq!(parsed.to_bytes().unwrap(), bytes);
}

#[test]
fn motion_roundtrip_is_exact() {
    let motion = keyed_motion();
    let bytes = motion.to_bytes().unwrap();
    assert_eq!(&bytes[0..4], &MOTION_FILE_VERSION.to_le_bytes());

    let parsed = Motion::parse(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(parsed, motion);
    assert_eq!(parsed.to_bytes().unwrap(), bytes);
}

#[test]
fn files_on_disk() {
    let dir = TempDir::new().unwrap();
    let skeleton_path = dir.path().join("hero.skel");
    let motion_path = dir.path().join("wobble.motion");

    let mut skeleton = humanoid();
    skeleton.apply_geometric_transforms();
    skeleton.save(&skeleton_path).unwrap();
    keyed_motion().save(&motion_path).unwrap();

    let loaded = Skeleton::load(&skeleton_path).unwrap();
    assert_eq!(loaded.joint_count(), 4);
    assert_eq!(loaded.joint_index("head"), Some(2));
    assert_eq!(loaded, skeleton);

    let motion = Motion::load(&motion_path).unwrap();
    assert_eq!(motion, keyed_motion());
    assert_eq!(
        motion
            .matrices_for_skeleton_at_normalized_time(&loaded, 0.5)
            .unwrap(),
        keyed_motion()
            .matrices_for_skeleton_at_normalized_time(&skeleton, 0.5)
            .unwrap()
    );
}

#[test]
fn truncated_motion_is_an_io_error() {
    let bytes = keyed_motion().to_bytes().unwrap();
    let result = Motion::parse(&mut Cursor::new(&bytes[..bytes.len() - 3]));
    assert!(matches!(result, Err(AnimError::Io(_))));
}

#[test]
fn unknown_interpolation_code_is_rejected() {
    let mut bytes = Vec::new();
    bytes.extend(MOTION_FILE_VERSION.to_le_bytes());
    bytes.extend(1.0f32.to_le_bytes()); // length
    bytes.extend(0.0f32.to_le_bytes()); // start time
    bytes.extend(1i32.to_le_bytes()); // curve count
    for cell in Mat4::IDENTITY.to_cols_array() {
        bytes.extend(cell.to_le_bytes());
    }
    bytes.extend(1i32.to_le_bytes()); // key count
    bytes.extend(0.0f32.to_le_bytes()); // time
    bytes.extend(7i32.to_le_bytes()); // interpolation
    bytes.extend(0.0f32.to_le_bytes()); // value

    assert!(matches!(
        Motion::parse(&mut Cursor::new(bytes)),
        Err(AnimError::InvalidInterpolationType(7))
    ));
}

#[test]
fn empty_curve_in_file_is_rejected() {
    let mut bytes = Vec::new();
    bytes.extend(MOTION_FILE_VERSION.to_le_bytes());
    bytes.extend(1.0f32.to_le_bytes());
    bytes.extend(0.0f32.to_le_bytes());
    bytes.extend(1i32.to_le_bytes());
    for cell in Mat4::IDENTITY.to_cols_array() {
        bytes.extend(cell.to_le_bytes());
    }
    bytes.extend(0i32.to_le_bytes()); // no keys

    assert!(matches!(
        Motion::parse(&mut Cursor::new(bytes)),
        Err(AnimError::EmptyCurve)
    ));
}

#[test]
fn unsupported_motion_version() {
    let mut bytes = keyed_motion().to_bytes().unwrap();
    bytes[0..4].copy_from_slice(&9i32.to_le_bytes());
    assert!(matches!(
        Motion::parse(&mut Cursor::new(bytes)),
        Err(AnimError::UnsupportedVersion {
            kind: "motion",
            version: 9,
            ..
        })
    ));
}
