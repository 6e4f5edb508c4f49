use glam::Vec3;
use std::f32::consts::TAU;
use std::path::PathBuf;
use tui_galaxy::camera::CameraPose;
use tui_galaxy::galaxy::{GalaxyParameters, JitterMode};
use tui_galaxy::keyframes::{KeyframeDoc, KeyframeError, PoseEditor, PoseProp};
use tui_galaxy::scene::{Scene, SceneOptions};

const SAMPLE: &str = include_str!("../static/theatre-animations/first-section-camera.json");

fn sample_scene(keyframes: KeyframeDoc) -> Scene {
    Scene::new(SceneOptions {
        params: GalaxyParameters {
            count: 200,
            ..GalaxyParameters::default()
        },
        seed: Some(0x5EED),
        keyframes,
        ..SceneOptions::default()
    })
    .expect("default parameters are valid")
}

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("tui_galaxy_keyframes_{}", std::process::id()))
        .join(name)
}

#[test]
fn sample_file_yields_static_pose_and_sequence() {
    let doc = KeyframeDoc::parse(SAMPLE).expect("sample should parse");
    let pose = doc.static_pose(CameraPose::new(Vec3::splat(9.0), Vec3::splat(1.0)));
    assert_eq!(pose.position, Vec3::new(0.1, 0.1, 0.1));
    assert_eq!(pose.rotation, Vec3::ZERO);

    let seq = doc.sequence().expect("sample has a sequence");
    assert_eq!(seq.length, 8.0);
    assert_eq!(seq.tracks.len(), 2);
    assert!(seq.tracks.iter().any(|t| t.prop == PoseProp::PositionY));
    assert!(seq.tracks.iter().any(|t| t.prop == PoseProp::RotationY));
}

#[test]
fn sequence_samples_linearly_between_keyframes() {
    let doc = KeyframeDoc::parse(SAMPLE).expect("sample should parse");
    let seq = doc.sequence().expect("sample has a sequence");
    let base = CameraPose::new(Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO);

    let at0 = seq.sample(0.0, base);
    assert!((at0.position.y - 0.1).abs() < 1e-6);
    assert_eq!(at0.position.x, 1.0, "untracked channels keep the base value");

    let at2 = seq.sample(2.0, base);
    assert!((at2.position.y - 2.55).abs() < 1e-5);
    assert!((at2.rotation.y - TAU / 4.0).abs() < 1e-5);

    let at4 = seq.sample(4.0, base);
    assert!((at4.position.y - 5.0).abs() < 1e-6);

    let past = seq.sample(100.0, base);
    assert!((past.position.y - 0.1).abs() < 1e-6);
}

#[test]
fn disconnected_keyframes_hold_their_value() {
    let text = r#"{
      "sheetsById": { "Sheet": { "sequence": {
        "length": 4,
        "tracksByObject": { "Galaxy": {
          "trackIdByPropPath": { "[\"position\",\"x\"]": "a" },
          "trackData": { "a": { "keyframes": [
            { "position": 2, "value": 3, "connectedRight": false },
            { "position": 0, "value": 1, "connectedRight": false },
            { "position": 4, "value": 9 }
          ] } }
        } }
      } } }
    }"#;
    let doc = KeyframeDoc::parse(text).expect("valid document");
    let seq = doc.sequence().expect("one track");
    let track = &seq.tracks[0];
    assert_eq!(track.keyframes[0].position, 0.0, "keyframes are sorted");
    assert_eq!(track.sample(1.0), Some(1.0));
    assert_eq!(track.sample(3.0), Some(3.0));
    assert_eq!(track.sample(4.0), Some(9.0));
}

#[test]
fn malformed_or_unknown_tracks_are_skipped() {
    let text = r#"{
      "sheetsById": { "Sheet": { "sequence": {
        "tracksByObject": { "Galaxy": {
          "trackIdByPropPath": {
            "[\"scale\",\"x\"]": "s",
            "[\"position\",\"z\"]": "bad",
            "not json": "x"
          },
          "trackData": {
            "s": { "keyframes": [ { "position": 0, "value": 1 } ] },
            "bad": { "keyframes": "nope" }
          }
        } }
      } } }
    }"#;
    let doc = KeyframeDoc::parse(text).expect("valid document");
    assert!(doc.sequence().is_none());
}

#[test]
fn static_overrides_are_clamped_to_their_ranges() {
    let text = r#"{ "sheetsById": { "Sheet": { "staticOverrides": { "byObject": { "Galaxy": {
        "position": { "x": 50, "y": -50 },
        "rotation": { "z": 100 }
    } } } } } }"#;
    let doc = KeyframeDoc::parse(text).expect("valid document");
    let pose = doc.static_pose(CameraPose::default());
    assert_eq!(pose.position, Vec3::new(20.0, -20.0, 0.1));
    assert_eq!(pose.rotation, Vec3::new(0.0, 0.0, TAU));
}

#[test]
fn set_static_pose_preserves_unrelated_fields() {
    let mut doc = KeyframeDoc::parse(SAMPLE).expect("sample should parse");
    let pose = CameraPose::new(Vec3::new(1.5, 2.5, -3.0), Vec3::new(0.0, 0.5, 0.0));
    doc.set_static_pose(&pose);

    assert_eq!(doc.static_pose(CameraPose::default()), pose);
    assert_eq!(doc.root()["definitionVersion"], "0.4.0");
    assert!(doc.root()["revisionHistory"].is_array());
    assert!(doc.sequence().is_some(), "sequence data survives");
}

#[test]
fn set_static_pose_creates_missing_path() {
    let mut doc = KeyframeDoc::empty();
    let pose = CameraPose::new(Vec3::new(4.0, 5.0, 6.0), Vec3::ZERO);
    doc.set_static_pose(&pose);
    let y = &doc.root()["sheetsById"]["Sheet"]["staticOverrides"]["byObject"]["Galaxy"]
        ["position"]["y"];
    assert_eq!(y.as_f64(), Some(5.0));
}

#[test]
fn set_static_pose_clamps_out_of_range_values() {
    let mut doc = KeyframeDoc::empty();
    // Bottom of the scroll page leaves the rig at two full turns.
    let pose = CameraPose::new(Vec3::new(30.0, 0.0, 0.0), Vec3::new(0.0, 2.0 * TAU, 0.0));
    doc.set_static_pose(&pose);

    let written = &doc.root()["sheetsById"]["Sheet"]["staticOverrides"]["byObject"]["Galaxy"];
    assert_eq!(written["position"]["x"].as_f64(), Some(20.0));
    assert_eq!(written["rotation"]["y"].as_f64(), Some(TAU as f64));
    let read = doc.static_pose(CameraPose::default());
    assert_eq!(read.rotation.y, TAU);
    assert_eq!(read.position.x, 20.0);
}

#[test]
fn save_then_load_round_trips_through_disk() {
    let path = scratch_path("roundtrip.json");
    let mut doc = KeyframeDoc::parse(SAMPLE).expect("sample should parse");
    let pose = CameraPose::new(Vec3::new(0.5, 1.0, 2.0), Vec3::new(0.25, 0.0, 0.0));
    doc.set_static_pose(&pose);
    doc.save(&path).expect("save should succeed");

    let loaded = KeyframeDoc::load(&path).expect("load should succeed");
    assert_eq!(loaded.static_pose(CameraPose::default()), pose);
    assert_eq!(loaded.root()["definitionVersion"], "0.4.0");
    assert!(!path.with_extension("tmp").exists());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_file_loads_as_empty_document() {
    let doc = KeyframeDoc::load(&scratch_path("does-not-exist.json")).expect("missing is fine");
    assert_eq!(doc, KeyframeDoc::empty());
    assert_eq!(doc.static_pose(CameraPose::default()), CameraPose::default());
    assert!(doc.sequence().is_none());
}

#[test]
fn invalid_documents_are_rejected() {
    assert!(matches!(KeyframeDoc::parse("[1, 2]"), Err(KeyframeError::NotAnObject)));
    assert!(matches!(KeyframeDoc::parse("{ nope"), Err(KeyframeError::Json(_))));
}

#[test]
fn pose_editor_nudges_selected_channel_and_tracks_dirty_state() {
    let mut editor = PoseEditor::default();
    let pose = CameraPose::default();
    assert_eq!(editor.selected(), PoseProp::PositionX);

    let next = editor.nudge(&pose, 1.0);
    assert!((next.position.x - 0.2).abs() < 1e-6);
    assert!(editor.is_dirty());
    assert!(editor.text(&next).contains("(unsaved)"));

    editor.mark_saved();
    assert!(!editor.is_dirty());

    for _ in 0..4 {
        editor.select_next();
    }
    assert_eq!(editor.selected(), PoseProp::RotationY);
    let turned = editor.nudge(&next, -1.0);
    assert!((turned.rotation.y + TAU / 120.0).abs() < 1e-6);

    for _ in 0..2 {
        editor.select_next();
    }
    assert_eq!(editor.selected(), PoseProp::PositionX, "selection wraps");
}

#[test]
fn pose_editor_stops_at_range_limits() {
    let mut editor = PoseEditor::default();
    let pose = CameraPose::new(Vec3::new(20.0, 0.0, 0.0), Vec3::ZERO);
    let next = editor.nudge(&pose, 1.0);
    assert_eq!(next.position.x, 20.0);
    assert!(!editor.is_dirty());
}

#[test]
fn scene_starts_from_the_file_static_pose() {
    let text = r#"{ "sheetsById": { "Sheet": { "staticOverrides": { "byObject": { "Galaxy": {
        "position": { "x": 3, "y": 4, "z": 5 },
        "rotation": { "y": 0.5 }
    } } } } } }"#;
    let scene = sample_scene(KeyframeDoc::parse(text).expect("valid document"));
    assert_eq!(scene.rig().pose.position, Vec3::new(3.0, 4.0, 5.0));
    assert_eq!(scene.rig().pose.rotation, Vec3::new(0.0, 0.5, 0.0));
    assert!(!scene.has_sequence());

    let sample = sample_scene(KeyframeDoc::parse(SAMPLE).expect("sample should parse"));
    assert_eq!(sample.rig().pose.position, Vec3::new(0.1, 0.1, 0.1));
    assert_eq!(sample.rig().pose.rotation, Vec3::ZERO);
    assert!(sample.has_sequence());
}

#[test]
fn scene_playback_samples_the_sequence_and_wraps() {
    let mut scene = sample_scene(KeyframeDoc::parse(SAMPLE).expect("sample should parse"));
    assert!(!scene.is_playing());
    assert!(scene.toggle_playback());
    assert!(scene.is_playing());

    scene.tick(1.0);
    let pose = scene.rig().pose;
    assert!((pose.position.y - 1.325).abs() < 1e-5, "{pose:?}");
    assert!((pose.rotation.y - TAU / 8.0).abs() < 1e-5);
    assert_eq!(pose.position.x, 0.1, "untracked channels keep the static pose");

    // 1.0 + 7.25 = 8.25, one full length past the start.
    scene.tick(7.25);
    let pose = scene.rig().pose;
    assert!((pose.position.y - 0.40625).abs() < 1e-5, "{pose:?}");
    assert!((pose.rotation.y - TAU / 32.0).abs() < 1e-5);

    assert!(scene.toggle_playback());
    assert!(!scene.is_playing());
    scene.tick(1.0);
    assert_eq!(scene.rig().pose, pose, "stopped playback leaves the pose");
}

#[test]
fn scene_without_sequence_refuses_playback() {
    let mut scene = sample_scene(KeyframeDoc::empty());
    assert!(!scene.toggle_playback());
    assert!(!scene.is_playing());
}

#[test]
fn scene_set_pose_moves_rig_and_updates_overrides() {
    let mut scene = sample_scene(KeyframeDoc::parse(SAMPLE).expect("sample should parse"));
    let pose = CameraPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.25, 0.0));
    scene.set_pose(pose);
    assert_eq!(scene.rig().pose, pose);
    assert_eq!(scene.keyframes().static_pose(CameraPose::default()), pose);
    assert_eq!(scene.keyframes().root()["definitionVersion"], "0.4.0");
}

#[test]
fn scene_toggle_jitter_regenerates_in_the_other_mode() {
    let mut scene = sample_scene(KeyframeDoc::empty());
    assert_eq!(scene.visual().jitter(), JitterMode::Reference);
    let mode = scene.toggle_jitter().expect("valid params");
    assert_eq!(mode, JitterMode::Scaled);
    assert_eq!(scene.visual().jitter(), JitterMode::Scaled);
    assert_eq!(scene.visual().generation(), 2);
    assert_eq!(scene.toggle_jitter().expect("valid params"), JitterMode::Reference);
}
