//! Asset loading: glTF models, images and cubemaps.
//!
//! Loading produces plain CPU-side data (`scene::Model`, `scene::CubemapData`);
//! GPU upload happens later in the renderer, on the main thread. That split
//! keeps the loaders runnable from any tokio task and the scene testable
//! without a device.

pub mod animation;
pub mod texture;

use std::io::{BufReader, Cursor};
use std::path::Path;

use anyhow::anyhow;

use crate::assets::animation::{AnimationClip, Keyframes};
use crate::scene::{Material, Mesh, MeshVertex, Model, Node, Transform};

pub use texture::{load_binary, load_cubemap, load_image};

/// Load and parse one glTF/GLB file into a model entity.
///
/// Buffers and images referenced by URI resolve relative to the file's own
/// directory. Draco-compressed primitives are rejected: decompression is
/// delegated territory this viewer does not enter.
pub async fn load_gltf(assets_dir: &str, file_name: &str) -> anyhow::Result<Model> {
    let gltf_bytes = load_binary(assets_dir, file_name).await?;
    let gltf_cursor = Cursor::new(gltf_bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    if gltf
        .extensions_required()
        .any(|e| e == "KHR_draco_mesh_compression")
    {
        return Err(anyhow!(
            "{} requires Draco decompression, which is not supported",
            file_name
        ));
    }

    let base_dir = Path::new(file_name)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let relative = |uri: &str| {
        if base_dir.is_empty() {
            uri.to_string()
        } else {
            format!("{}/{}", base_dir, uri)
        }
    };

    // Buffers: either the GLB blob or sibling .bin files.
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.to_vec());
                }
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(assets_dir, &relative(uri)).await?;
                buffer_data.push(bin);
            }
        }
    }

    let clips = load_clips(&gltf, &buffer_data);
    let materials = load_materials(&gltf, &buffer_data, assets_dir, &relative).await?;

    let mut roots = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            roots.push(to_node(node, &buffer_data));
        }
    }

    let root = if roots.len() == 1 {
        roots.into_iter().next().unwrap()
    } else {
        let mut root = Node::new(usize::MAX, "root");
        root.children = roots;
        root
    };

    let name = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    Ok(Model {
        name,
        transform: Transform::new(),
        root,
        materials,
        clips,
    })
}

fn to_node(node: gltf::scene::Node, buffer_data: &[Vec<u8>]) -> Node {
    let name = node.name().unwrap_or("unnamed_node");
    let mut out = Node::new(node.index(), name);

    let (position, rotation, scale) = node.transform().decomposed();
    out.transform = Transform {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    };

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(|b| &b[..]));

            let mut vertices = Vec::new();
            if let Some(positions) = reader.read_positions() {
                vertices.extend(positions.map(|position| MeshVertex {
                    position,
                    ..Default::default()
                }));
            }
            if let Some(normals) = reader.read_normals() {
                for (vertex, normal) in vertices.iter_mut().zip(normals) {
                    vertex.normal = normal;
                }
            }
            if let Some(tex_coords) = reader.read_tex_coords(0).map(|tc| tc.into_f32()) {
                for (vertex, uv) in vertices.iter_mut().zip(tex_coords) {
                    vertex.uv = uv;
                }
            }

            let mut indices = Vec::new();
            if let Some(raw) = reader.read_indices() {
                indices.extend(raw.into_u32());
            }

            out.meshes.push(Mesh {
                name: mesh.name().unwrap_or("unnamed_mesh").to_string(),
                vertices,
                indices,
                material: primitive.material().index().unwrap_or(0),
                cast_shadow: false,
                receive_shadow: false,
            });
        }
    }

    for child in node.children() {
        out.children.push(to_node(child, buffer_data));
    }

    out
}

async fn load_materials(
    gltf: &gltf::Gltf,
    buffer_data: &[Vec<u8>],
    assets_dir: &str,
    relative: &impl Fn(&str) -> String,
) -> anyhow::Result<Vec<Material>> {
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let base_color_image = match pbr.base_color_texture() {
            Some(info) => match info.texture().source().source() {
                gltf::image::Source::View { view, mime_type } => {
                    let buffer = buffer_data
                        .get(view.buffer().index())
                        .ok_or_else(|| anyhow!("texture view references a missing buffer"))?;
                    let bytes = &buffer[view.offset()..view.offset() + view.length()];
                    Some(texture::decode_image(
                        bytes,
                        mime_type.split('/').next_back(),
                    )?)
                }
                gltf::image::Source::Uri { uri, .. } => {
                    Some(load_image(assets_dir, &relative(uri)).await?)
                }
            },
            None => None,
        };
        materials.push(Material {
            name: material.name().unwrap_or("unnamed_material").to_string(),
            base_color: pbr.base_color_factor(),
            base_color_image,
        });
    }
    if materials.is_empty() {
        materials.push(Material::solid("default", [1.0, 1.0, 1.0, 1.0]));
    }
    Ok(materials)
}

fn load_clips(gltf: &gltf::Gltf, buffer_data: &[Vec<u8>]) -> Vec<AnimationClip> {
    let mut clips: Vec<AnimationClip> = Vec::new();
    for animation in gltf.animations() {
        for channel in animation.channels() {
            let reader = channel.reader(|buffer| buffer_data.get(buffer.index()).map(|b| &b[..]));
            let timestamps: Vec<f32> = match reader.read_inputs() {
                Some(gltf::accessor::Iter::Standard(times)) => times.collect(),
                _ => Vec::new(),
            };
            let keyframes = match reader.read_outputs() {
                Some(gltf::animation::util::ReadOutputs::Translations(t)) => {
                    Keyframes::Translation(t.map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::Rotations(r)) => {
                    Keyframes::Rotation(r.into_f32().map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::Scales(s)) => {
                    Keyframes::Scale(s.map(Into::into).collect())
                }
                _ => Keyframes::Other,
            };
            let target = channel.target().node().index();
            clips.push(AnimationClip {
                name: animation.name().unwrap_or("default").to_string(),
                target,
                timestamps,
                keyframes,
            });
        }
    }
    clips
}
