//! Slider bindings: snapping, clamping and field isolation through the
//! public API.

use roomview::config::ViewerConfig;
use roomview::lights::Lights;
use roomview::panel::{Axis, BindTarget, Binding, default_bindings};

fn default_lights() -> Lights {
    let config = ViewerConfig::default();
    Lights::new(&config.ambient, &config.directional, &config.point)
}

fn binding(target: BindTarget) -> Binding {
    default_bindings()
        .into_iter()
        .find(|b| b.target == target)
        .unwrap()
}

#[test]
fn directional_position_snaps_to_whole_units() {
    let b = binding(BindTarget::DirectionalPosition(Axis::Z));
    assert_eq!(b.snap(-17.3), -17.0);
    assert_eq!(b.snap(4.5).fract(), 0.0);
}

#[test]
fn point_position_keeps_centimeter_precision() {
    let b = binding(BindTarget::PointPosition(Axis::X));
    assert!((b.snap(-0.274) - -0.27).abs() < 1e-4);
}

#[test]
fn out_of_range_edits_clamp() {
    let ambient = binding(BindTarget::AmbientIntensity);
    let mut lights = default_lights();
    ambient.write(&mut lights, 99.0);
    assert_eq!(lights.ambient.intensity, 10.0);
    ambient.write(&mut lights, -1.0);
    assert_eq!(lights.ambient.intensity, 0.0);
}

#[test]
fn each_binding_edits_exactly_one_field() {
    for target in [
        BindTarget::AmbientIntensity,
        BindTarget::DirectionalIntensity,
        BindTarget::DirectionalPosition(Axis::Y),
        BindTarget::PointPosition(Axis::Z),
    ] {
        let b = binding(target);
        let mut lights = default_lights();
        let before = lights.clone();
        b.write(&mut lights, 3.0);
        assert_eq!(b.read(&lights), 3.0);

        // Every uniform slot except the edited one must be untouched.
        let edited: Vec<f32> = uniform_floats(&lights);
        let original: Vec<f32> = uniform_floats(&before);
        let changed = edited
            .iter()
            .zip(&original)
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed <= 2, "{:?} changed {} uniform slots", target, changed);
    }
}

// The directional direction is derived from its position, so a position
// edit may move up to one extra derived slot per axis; raw light fields
// are compared through the uniform layout.
fn uniform_floats(lights: &Lights) -> Vec<f32> {
    let u = lights.to_uniform();
    let mut v = Vec::new();
    v.extend(u.ambient_color);
    v.push(u.ambient_intensity);
    v.push(u.dir_intensity);
    v.extend(u.dir_color);
    v.extend(u.point_position);
    v.push(u.point_intensity);
    v.extend(u.point_color);
    v.push(u.point_range);
    v.push(u.point_decay);
    v
}
