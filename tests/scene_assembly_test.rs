//! Scene assembly through the public API: lights from config, models
//! attached as loads complete, shadow flags applied on attach.

use roomview::camera::Projection;
use roomview::config::ViewerConfig;
use roomview::lights::Lights;
use roomview::scene::{CubemapData, ImageData, Material, Mesh, Model, Node, Scene, Transform, primitives};

fn default_lights() -> Lights {
    let config = ViewerConfig::default();
    Lights::new(&config.ambient, &config.directional, &config.point)
}

fn model_with_meshes(name: &str, meshes: Vec<Mesh>) -> Model {
    let mut root = Node::new(0, "root");
    root.meshes = meshes;
    Model {
        name: name.to_string(),
        transform: Transform::new(),
        root,
        materials: vec![Material::solid("default", [1.0; 4])],
        clips: Vec::new(),
    }
}

#[test]
fn assembled_scene_counts_models_camera_and_lights() {
    let mut scene = Scene::new(default_lights());
    scene.attach(model_with_meshes("walls", vec![primitives::plane("a", 1.0)]));
    scene.attach(model_with_meshes("sofa", vec![primitives::plane("b", 1.0)]));
    assert_eq!(scene.entity_count(), 6);
}

#[test]
fn attach_enables_shadows_regardless_of_load_order() {
    for order in [["walls", "sofa"], ["sofa", "walls"]] {
        let mut scene = Scene::new(default_lights());
        for name in order {
            scene.attach(model_with_meshes(name, vec![primitives::plane(name, 2.0)]));
        }
        for model in &scene.models {
            model.visit_world(&mut |node, _| {
                for mesh in &node.meshes {
                    assert!(mesh.cast_shadow, "{} does not cast", mesh.name);
                    assert!(mesh.receive_shadow, "{} does not receive", mesh.name);
                }
            });
        }
        assert_eq!(scene.models.len(), 2);
    }
}

#[test]
fn default_config_describes_the_bundled_scene() {
    let config = ViewerConfig::default();
    let lights = Lights::new(&config.ambient, &config.directional, &config.point);

    assert_eq!(lights.count(), 3);
    assert_eq!(lights.ambient.intensity, 0.8);
    assert_eq!(lights.directional.intensity, 20.0);
    assert_eq!(lights.point.intensity, 20.0);
    // Both whites come from the same warm tint.
    assert_eq!(lights.ambient.color, lights.directional.color);

    assert_eq!(config.models.len(), 2);
    assert_eq!(config.environment.len(), 6);
    assert_eq!(config.camera.fovy_deg, 75.0);
}

#[test]
fn ready_viewer_state_matches_the_bundled_scene() {
    // 1280x720 viewport, both loads done, background set, no floor.
    let projection = Projection::new(1280, 720, cgmath::Deg(75.0), 0.1, 100.0);
    assert!((projection.aspect - 1.778).abs() < 0.001);

    let mut scene = Scene::new(default_lights());
    let face = ImageData {
        width: 1,
        height: 1,
        rgba: vec![0; 4],
    };
    scene.set_background(CubemapData {
        size: 1,
        faces: std::array::from_fn(|_| face.clone()),
    });
    scene.attach(model_with_meshes("walls", vec![primitives::plane("a", 1.0)]));
    scene.attach(model_with_meshes("sofa", vec![primitives::plane("b", 1.0)]));

    assert_eq!(scene.models.len(), 2);
    assert_eq!(scene.lights.count(), 3);
    assert!(scene.background.is_some());
    assert!(scene.models.iter().all(|m| m.name != "floor"));
}

#[test]
fn a_failed_load_leaves_the_scene_usable() {
    // Attaching only the models that loaded keeps the scene consistent;
    // counts reflect what is actually present.
    let mut scene = Scene::new(default_lights());
    scene.attach(model_with_meshes("walls", vec![primitives::plane("a", 1.0)]));
    assert_eq!(scene.entity_count(), 5);
    assert_eq!(scene.models.len(), 1);
}
