//! The CPU-side scene graph.
//!
//! Holds everything the renderer draws: loaded model hierarchies, the three
//! lights and the background cubemap. The scene is created once at startup
//! and mutated from the main thread only; model entities are attached as
//! their asynchronous loads complete, in whatever order that happens.

pub mod primitives;
pub mod transform;

use crate::assets::animation::AnimationClip;
use crate::lights::Lights;

pub use transform::Transform;

/// Decoded RGBA8 image data, not yet uploaded to the GPU.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Six decoded cubemap faces in +X, -X, +Y, -Y, +Z, -Z order.
/// All faces share the same square dimensions.
#[derive(Clone, Debug)]
pub struct CubemapData {
    pub size: u32,
    pub faces: [ImageData; 6],
}

#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub base_color_image: Option<ImageData>,
}

impl Material {
    pub fn solid(name: &str, color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            base_color: color,
            base_color_image: None,
        }
    }
}

/// Vertex layout shared between the CPU mesh data and the GPU buffers.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Index into the owning model's material list.
    pub material: usize,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// One node of a loaded glTF hierarchy.
#[derive(Clone, Debug)]
pub struct Node {
    /// The glTF node index; animation clips target nodes through it.
    pub id: usize,
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<Mesh>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: usize, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            transform: Transform::new(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set the shadow flags on every mesh in the hierarchy.
    pub fn set_shadow_flags(&mut self, cast: bool, receive: bool) {
        for mesh in &mut self.meshes {
            mesh.cast_shadow = cast;
            mesh.receive_shadow = receive;
        }
        for child in &mut self.children {
            child.set_shadow_flags(cast, receive);
        }
    }

    /// Walk the hierarchy depth-first, handing each node its world transform.
    pub fn visit_world(&self, parent: &Transform, f: &mut impl FnMut(&Node, &Transform)) {
        let world = parent * &self.transform;
        f(self, &world);
        for child in &self.children {
            child.visit_world(&world, f);
        }
    }

    pub fn find_mut(&mut self, id: usize) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
            + self
                .children
                .iter()
                .map(Node::mesh_count)
                .sum::<usize>()
    }
}

/// A loaded model entity: the node hierarchy of one glTF asset plus its
/// materials, placement and any animation clips the file carried.
#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    /// Placement of the whole hierarchy in the scene.
    pub transform: Transform,
    pub root: Node,
    pub materials: Vec<Material>,
    pub clips: Vec<AnimationClip>,
}

impl Model {
    /// Every mesh in the hierarchy, with its world transform resolved.
    pub fn visit_world(&self, f: &mut impl FnMut(&Node, &Transform)) {
        self.root.visit_world(&self.transform, f);
    }
}

/// Root container of everything renderable.
pub struct Scene {
    pub models: Vec<Model>,
    pub lights: Lights,
    pub background: Option<CubemapData>,
}

impl Scene {
    pub fn new(lights: Lights) -> Self {
        Self {
            models: Vec::new(),
            lights,
            background: None,
        }
    }

    pub fn set_background(&mut self, cubemap: CubemapData) {
        self.background = Some(cubemap);
    }

    /// Attach a loaded model. Every mesh of the hierarchy both casts and
    /// receives shadows; the index of the new entity is returned.
    pub fn attach(&mut self, mut model: Model) -> usize {
        model.root.set_shadow_flags(true, true);
        log::info!(
            "attached '{}' ({} meshes)",
            model.name,
            model.root.mesh_count()
        );
        self.models.push(model);
        self.models.len() - 1
    }

    /// Loaded entities plus camera plus lights, the child count an assembled
    /// scene reports.
    pub fn entity_count(&self) -> usize {
        self.models.len() + 1 + self.lights.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;

    fn test_lights() -> Lights {
        let config = ViewerConfig::default();
        Lights::new(&config.ambient, &config.directional, &config.point)
    }

    fn mesh(name: &str) -> Mesh {
        Mesh {
            name: name.to_string(),
            vertices: Vec::new(),
            indices: Vec::new(),
            material: 0,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    fn two_level_model(name: &str) -> Model {
        let mut root = Node::new(0, "root");
        root.meshes.push(mesh("a"));
        let mut child = Node::new(1, "child");
        child.meshes.push(mesh("b"));
        child.meshes.push(mesh("c"));
        root.children.push(child);
        Model {
            name: name.to_string(),
            transform: Transform::new(),
            root,
            materials: vec![Material::solid("default", [1.0; 4])],
            clips: Vec::new(),
        }
    }

    #[test]
    fn attach_sets_both_shadow_flags_on_every_mesh() {
        let mut scene = Scene::new(test_lights());
        scene.attach(two_level_model("walls"));
        let mut seen = 0;
        scene.models[0].visit_world(&mut |node, _| {
            for mesh in &node.meshes {
                assert!(mesh.cast_shadow && mesh.receive_shadow);
                seen += 1;
            }
        });
        assert_eq!(seen, 3);
    }

    #[test]
    fn attach_order_does_not_matter() {
        for flipped in [false, true] {
            let mut scene = Scene::new(test_lights());
            let (first, second) = if flipped {
                ("sofa", "walls")
            } else {
                ("walls", "sofa")
            };
            scene.attach(two_level_model(first));
            scene.attach(two_level_model(second));
            assert_eq!(scene.models.len(), 2);
        }
    }

    #[test]
    fn entity_count_includes_camera_and_lights() {
        let mut scene = Scene::new(test_lights());
        scene.attach(two_level_model("walls"));
        scene.attach(two_level_model("sofa"));
        // 2 models + 1 camera + 3 lights
        assert_eq!(scene.entity_count(), 6);
    }

    #[test]
    fn node_lookup_by_id() {
        let mut model = two_level_model("walls");
        assert!(model.root.find_mut(1).is_some());
        assert!(model.root.find_mut(7).is_none());
    }
}
