use tui_galaxy::color::Rgb;
use tui_galaxy::galaxy::{
    branch_angle, generate, generate_with, GalaxyError, GalaxyParameters, JitterMode,
};
use tui_galaxy::raster::Raster;
use tui_galaxy::visual::GalaxyVisual;

fn reference_params(count: usize) -> GalaxyParameters {
    GalaxyParameters {
        count,
        radius: 5.0,
        branches: 3,
        spin: 0.2,
        randomness_power: 3.0,
        inside_color: Rgb::from_hex("#ff6030").expect("valid hex"),
        outside_color: Rgb::from_hex("#1b3984").expect("valid hex"),
        ..GalaxyParameters::default()
    }
}

/// Recover `t = r / radius` from a color on the inside -> outside segment,
/// using the channel with the widest span.
fn t_from_color(p: &GalaxyParameters, c: &[f32; 3]) -> f32 {
    let (a, b) = (p.inside_color.r, p.outside_color.r);
    (c[0] - a) / (b - a)
}

#[test]
fn buffers_are_index_aligned_and_sized() {
    let mut rng = fastrand::Rng::with_seed(7);
    for count in [1usize, 2, 17, 1000] {
        let buffers = generate(&reference_params(count), &mut rng).expect("valid params");
        assert_eq!(buffers.positions.len(), count);
        assert_eq!(buffers.colors.len(), count);
        assert_eq!(buffers.len(), count);
    }
}

#[test]
fn reference_scenario_stays_bounded_and_reproducible() {
    let params = reference_params(1000);
    let max_jitter = params.max_jitter(JitterMode::Reference);

    let a = generate(&params, &mut fastrand::Rng::with_seed(42)).expect("valid params");
    let b = generate(&params, &mut fastrand::Rng::with_seed(42)).expect("valid params");
    assert_eq!(a, b, "same seed must reproduce identical buffers");

    for (pos, color) in a.points() {
        let planar = (pos[0] * pos[0] + pos[2] * pos[2]).sqrt();
        assert!(
            planar <= params.radius + max_jitter * 2f32.sqrt() + 1e-4,
            "point {pos:?} outside the jittered disc"
        );
        assert!(pos[1].abs() <= max_jitter + 1e-6);
        for ch in color {
            assert!((0.0..=1.0).contains(ch), "color channel {ch} out of range");
        }
    }
}

#[test]
fn different_seeds_give_different_galaxies() {
    let params = reference_params(200);
    let a = generate(&params, &mut fastrand::Rng::with_seed(1)).expect("valid params");
    let b = generate(&params, &mut fastrand::Rng::with_seed(2)).expect("valid params");
    assert_ne!(a.positions, b.positions);
}

#[test]
fn colors_follow_linear_interpolation_law() {
    let params = reference_params(1);
    for step in 0..=10 {
        let t = step as f32 / 10.0;
        let r = t * params.radius;
        let got = params.color_at(r);
        let want = [
            params.inside_color.r * (1.0 - t) + params.outside_color.r * t,
            params.inside_color.g * (1.0 - t) + params.outside_color.g * t,
            params.inside_color.b * (1.0 - t) + params.outside_color.b * t,
        ];
        for k in 0..3 {
            assert!((got.to_array()[k] - want[k]).abs() < 1e-6, "t = {t}");
        }
    }
    assert_eq!(params.color_at(0.0), params.inside_color);
    assert_eq!(params.color_at(params.radius), params.outside_color);
}

#[test]
fn every_color_lies_on_the_gradient_and_matches_its_radius() {
    let params = reference_params(500);
    let max_jitter = params.max_jitter(JitterMode::Reference);
    let buffers = generate(&params, &mut fastrand::Rng::with_seed(99)).expect("valid params");

    for (i, (pos, color)) in buffers.points().enumerate() {
        let t = t_from_color(&params, color);
        assert!((-1e-4..=1.0 + 1e-4).contains(&t), "t = {t}");
        let expected = params.color_at(t * params.radius).to_array();
        for k in 0..3 {
            assert!((expected[k] - color[k]).abs() < 1e-4, "point {i} channel {k}");
        }

        // The ideal spiral point for that radius is within jitter reach.
        let ideal = params.spiral_position(i, t * params.radius);
        let dx = pos[0] - ideal[0];
        let dz = pos[2] - ideal[2];
        assert!(dx.abs() <= max_jitter + 1e-3 && dz.abs() <= max_jitter + 1e-3);
    }
}

#[test]
fn branch_assignment_is_round_robin_by_index() {
    let angles: Vec<f32> = (0..6).map(|i| branch_angle(i, 3)).collect();
    assert_eq!(angles[0], angles[3]);
    assert_eq!(angles[1], angles[4]);
    assert_eq!(angles[2], angles[5]);
    assert_ne!(angles[0], angles[1]);
    assert_ne!(angles[1], angles[2]);
    assert!((angles[1] - std::f32::consts::TAU / 3.0).abs() < 1e-6);
}

#[test]
fn zero_spin_points_hug_their_arm_ray() {
    let params = GalaxyParameters {
        spin: 0.0,
        branches: 4,
        randomness_power: 10.0,
        ..reference_params(400)
    };
    let buffers = generate(&params, &mut fastrand::Rng::with_seed(5)).expect("valid params");
    for (i, pos) in buffers.positions.iter().enumerate() {
        let angle = branch_angle(i, 4);
        // Perpendicular distance from the arm ray is bounded by the jitter.
        let across = -angle.sin() * pos[0] + angle.cos() * pos[2];
        assert!(across.abs() <= 2f32.sqrt() + 1e-4);
    }
}

#[test]
fn invalid_parameters_fail_before_output() {
    let mut rng = fastrand::Rng::with_seed(3);
    let cases = [
        ("count", GalaxyParameters { count: 0, ..GalaxyParameters::default() }),
        ("radius", GalaxyParameters { radius: 0.0, ..GalaxyParameters::default() }),
        ("radius", GalaxyParameters { radius: -1.0, ..GalaxyParameters::default() }),
        ("branches", GalaxyParameters { branches: 0, ..GalaxyParameters::default() }),
        ("size", GalaxyParameters { size: 0.0, ..GalaxyParameters::default() }),
        ("randomness", GalaxyParameters { randomness: -0.1, ..GalaxyParameters::default() }),
        (
            "randomness_power",
            GalaxyParameters { randomness_power: 0.5, ..GalaxyParameters::default() },
        ),
        ("spin", GalaxyParameters { spin: f32::NAN, ..GalaxyParameters::default() }),
    ];
    for (field, params) in cases {
        let err = generate(&params, &mut rng).expect_err("must be rejected");
        assert!(matches!(err, GalaxyError::InvalidParameter { .. }));
        assert_eq!(err.field(), field);
    }
}

#[test]
fn reference_jitter_ignores_randomness() {
    let low = GalaxyParameters { randomness: 0.0, ..reference_params(300) };
    let high = GalaxyParameters { randomness: 2.0, ..reference_params(300) };
    let a = generate(&low, &mut fastrand::Rng::with_seed(11)).expect("valid params");
    let b = generate(&high, &mut fastrand::Rng::with_seed(11)).expect("valid params");
    assert_eq!(a, b);
}

#[test]
fn scaled_jitter_with_zero_randomness_lands_on_the_curve() {
    let params = GalaxyParameters { randomness: 0.0, ..reference_params(300) };
    let buffers = generate_with(&params, JitterMode::Scaled, &mut fastrand::Rng::with_seed(13))
        .expect("valid params");
    for (i, (pos, color)) in buffers.points().enumerate() {
        let r = t_from_color(&params, color) * params.radius;
        let ideal = params.spiral_position(i, r);
        assert!((pos[0] - ideal[0]).abs() < 1e-3, "point {i}");
        assert!((pos[2] - ideal[2]).abs() < 1e-3, "point {i}");
        assert!(pos[1].abs() < 1e-6);
    }
}

#[test]
fn scaled_jitter_is_bounded_by_randomness_times_radius() {
    let params = GalaxyParameters { randomness: 0.3, ..reference_params(500) };
    let bound = params.max_jitter(JitterMode::Scaled);
    assert!((bound - 1.5).abs() < 1e-6);
    let buffers = generate_with(&params, JitterMode::Scaled, &mut fastrand::Rng::with_seed(17))
        .expect("valid params");
    for pos in &buffers.positions {
        assert!(pos[1].abs() <= bound + 1e-6);
    }
}

#[test]
fn visual_regenerate_swaps_buffers_and_keeps_old_on_error() {
    let mut rng = fastrand::Rng::with_seed(21);
    let mut visual = GalaxyVisual::new(reference_params(50), JitterMode::Reference, &mut rng)
        .expect("valid params");
    assert_eq!(visual.generation(), 1);
    assert_eq!(visual.buffers().len(), 50);

    let bigger = GalaxyParameters { count: 80, branches: 5, ..reference_params(80) };
    visual.regenerate(bigger, &mut rng).expect("valid params");
    assert_eq!(visual.generation(), 2);
    assert_eq!(visual.buffers().len(), 80);
    assert_eq!(visual.params().branches, 5);

    let before = visual.buffers().clone();
    let bad = GalaxyParameters { branches: 0, ..bigger };
    assert!(visual.regenerate(bad, &mut rng).is_err());
    assert_eq!(visual.generation(), 2);
    assert_eq!(visual.params().branches, 5);
    assert_eq!(visual.buffers(), &before);
}

#[test]
fn visual_material_tracks_point_size() {
    let mut rng = fastrand::Rng::with_seed(23);
    let params = GalaxyParameters { size: 0.05, ..reference_params(10) };
    let visual = GalaxyVisual::new(params, JitterMode::Reference, &mut rng).expect("valid params");
    assert_eq!(visual.cloud().material().size, 0.05);
    assert!(visual.cloud().material().size_attenuation);
}

#[test]
fn rasterized_galaxy_lights_pixels_with_galaxy_colors() {
    use tui_galaxy::camera::{CameraPose, CameraRig};

    let mut rng = fastrand::Rng::with_seed(29);
    let visual = GalaxyVisual::new(reference_params(2000), JitterMode::Reference, &mut rng)
        .expect("valid params");
    let mut rig = CameraRig::new(2.0);
    rig.set_pose(CameraPose::new(glam::Vec3::new(0.0, 8.0, 8.0), glam::Vec3::ZERO));
    rig.look_at(visual.cloud().origin());

    let mut raster = Raster::new(80, 40);
    visual.cloud().draw(&rig.view_projection(), &mut raster, 0.5);
    let pixels = raster.resolve();
    assert_eq!(pixels.len(), 80 * 40 * 4);

    let lit = pixels
        .chunks_exact(4)
        .filter(|px| px[0] > 0 || px[1] > 0 || px[2] > 0)
        .count();
    assert!(lit > 50, "only {lit} pixels lit");
    // The warm core dominates the center of the image.
    let center = (20 * 80 + 40) * 4;
    assert!(pixels[center] >= pixels[center + 2]);
}
