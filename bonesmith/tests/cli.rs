//! End-to-end tests for the bonesmith binary

use assert_cmd::Command;
use bonesmith_anim::{
    AnimationCurve, BinaryFormat, JointMeta, KeyFrame, Motion, Skeleton, TransformationCurve,
};
use glam::{Mat4, Vec3};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GRAPH: &str = r#"{
    "motions": [
        { "name": "idle", "path": "idle.motion" },
        { "name": "walk", "path": "walk.motion", "playback": "clamp" }
    ],
    "states": [
        { "name": "idle", "motion": "idle" },
        { "name": "walk", "motion": "walk" }
    ],
    "transitions": [
        {
            "name": "speed", "from": "idle", "to": "walk", "blend_seconds": 0.2,
            "trigger": { "kind": "greater_than", "value": 0.5 }
        }
    ]
}"#;

fn hips_local() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0))
}

fn spine_local() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0))
}

fn spine_curve() -> AnimationCurve {
    AnimationCurve::constant(
        Vec3::ONE,
        Vec3::ZERO,
        Vec3::new(0.0, 0.5, 0.0),
        spine_local().inverse(),
    )
}

/// Writes a two-joint skeleton, an idle clip, a walk clip and a graph
fn fixtures() -> TempDir {
    let dir = TempDir::new().unwrap();

    let mut skeleton = Skeleton::new(Mat4::IDENTITY);
    let hips = skeleton
        .add_joint("hips", None, Mat4::IDENTITY, hips_local(), JointMeta::IDENTITY)
        .unwrap();
    skeleton
        .add_joint(
            "spine",
            Some(hips),
            Mat4::IDENTITY,
            spine_local(),
            JointMeta::IDENTITY,
        )
        .unwrap();
    skeleton.save(dir.path().join("body.skel")).unwrap();

    let idle_hips = AnimationCurve::constant(
        Vec3::ONE,
        Vec3::ZERO,
        Vec3::new(0.0, 1.0, 0.0),
        hips_local().inverse(),
    );
    Motion::new("idle", vec![idle_hips, spine_curve()], 1.0, 0.0)
        .unwrap()
        .save(dir.path().join("idle.motion"))
        .unwrap();

    let walk_x = TransformationCurve::new(vec![
        KeyFrame::linear(0.0, 0.0),
        KeyFrame::linear(1.0, 2.0),
    ])
    .unwrap();
    let walk_hips = AnimationCurve::new(
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
            walk_x,
            TransformationCurve::constant(1.0),
            TransformationCurve::constant(0.0),
        ],
        hips_local().inverse(),
    );
    Motion::new("walk", vec![walk_hips, spine_curve()], 1.0, 0.0)
        .unwrap()
        .save(dir.path().join("walk.motion"))
        .unwrap();

    fs::write(dir.path().join("graph.json"), GRAPH).unwrap();
    dir
}

fn bonesmith(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bonesmith").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn test_skeleton_info() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args(["skeleton", "info", "body.skel", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Joints: 2"))
        .stdout(predicate::str::contains("Roots: hips"))
        .stdout(predicate::str::contains("(0.000, 1.500, 0.000)"));
}

#[test]
fn test_skeleton_tree() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args(["skeleton", "tree", "body.skel", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hips"))
        .stdout(predicate::str::contains("spine"));
}

#[test]
fn test_missing_skeleton() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args(["skeleton", "info", "nope.skel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load skeleton"));
}

#[test]
fn test_motion_info() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args(["motion", "info", "walk.motion", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Curves: 2"))
        .stdout(predicate::str::contains("Length: 1.000s"))
        .stdout(predicate::str::contains("1/1/1"));
}

#[test]
fn test_motion_sample() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args([
            "motion", "sample", "walk.motion", "--skeleton", "body.skel", "--time", "0.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("walk at t=0.500"))
        .stdout(predicate::str::contains("(1.000, 1.000, 0.000)"))
        .stdout(predicate::str::contains("(1.000, 1.500, 0.000)"));
}

#[test]
fn test_motion_sample_single_joint() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args([
            "motion", "sample", "idle.motion", "-s", "body.skel", "--joint", "spine",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(0.000, 1.500, 0.000)"))
        .stdout(predicate::str::contains("hips").not());
}

#[test]
fn test_motion_sample_rejects_time_out_of_range() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args([
            "motion", "sample", "walk.motion", "-s", "body.skel", "--time", "2",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Normalized time"));
}

#[test]
fn test_graph_info() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args(["graph", "info", "graph.json", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("idle"))
        .stdout(predicate::str::contains("speed -> walk"));
}

#[test]
fn test_graph_run_transitions() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args([
            "graph",
            "run",
            "graph.json",
            "--skeleton",
            "body.skel",
            "--duration",
            "1",
            "--set",
            "speed=0.25",
            "--set",
            "speed=1@0.5",
            "--trigger",
            "jump",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("start in 'idle'"))
        .stdout(predicate::str::contains("trigger jump: ignored"))
        .stdout(predicate::str::contains("set speed: transition started"))
        .stdout(predicate::str::contains("entered 'walk'"))
        .stdout(predicate::str::contains("Finished in 'walk'"));
}

#[test]
fn test_graph_run_trace() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args([
            "graph",
            "run",
            "graph.json",
            "-s",
            "body.skel",
            "--duration",
            "0.1",
            "--blend",
            "decomposed",
            "--trace",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(0.000, 1.000, 0.000)"))
        .stdout(predicate::str::contains("Finished in 'idle'"));
}

#[test]
fn test_graph_run_bad_parameter() {
    let dir = fixtures();
    bonesmith(dir.path())
        .args([
            "graph", "run", "graph.json", "-s", "body.skel", "--set", "speed",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));
}

#[test]
fn test_completions() {
    Command::cargo_bin("bonesmith")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bonesmith"));
}
