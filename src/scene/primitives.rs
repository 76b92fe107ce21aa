//! Procedural mesh primitives.

use crate::scene::{Mesh, MeshVertex};

/// A flat plane in the XZ plane, `size`×`size`, facing up.
///
/// Shadow flags start false; callers decide whether the plane casts or
/// receives when they place it.
pub fn plane(name: &str, size: f32) -> Mesh {
    let h = size / 2.0;
    let vertices = vec![
        MeshVertex {
            position: [-h, 0.0, -h],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 0.0],
        },
        MeshVertex {
            position: [h, 0.0, -h],
            normal: [0.0, 1.0, 0.0],
            uv: [1.0, 0.0],
        },
        MeshVertex {
            position: [h, 0.0, h],
            normal: [0.0, 1.0, 0.0],
            uv: [1.0, 1.0],
        },
        MeshVertex {
            position: [-h, 0.0, h],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 1.0],
        },
    ];
    let indices = vec![0, 3, 2, 0, 2, 1];
    Mesh {
        name: name.to_string(),
        vertices,
        indices,
        material: 0,
        cast_shadow: false,
        receive_shadow: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_is_two_triangles_facing_up() {
        let mesh = plane("floor", 50.0);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert!(mesh.vertices.iter().all(|v| v.position[0].abs() == 25.0));
    }
}
