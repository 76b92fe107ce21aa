//! Local/world transforms for scene nodes.

use std::ops::Mul;

use cgmath::{Euler, Matrix4, One, Rad};

/// Position, rotation (as quaternion) and scale of a node.
#[derive(Clone, Debug)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transform: no move, rotate or scale.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Placement from config: a translation plus XYZ Euler angles in radians.
    pub fn from_position_euler(position: [f32; 3], rotation: [f32; 3]) -> Self {
        Self {
            position: position.into(),
            rotation: Euler::new(Rad(rotation[0]), Rad(rotation[1]), Rad(rotation[2])).into(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Rotation-only matrix used to transform normals. The inverse-transpose
    /// of a pure rotation is the rotation itself, and that holds here as long
    /// as the scale stays uniform enough for the scene's static geometry.
    pub fn normal_matrix(&self) -> Matrix4<f32> {
        cgmath::Matrix3::from(self.rotation).into()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Transform {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        (&self).mul(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn identity_composition_is_neutral() {
        let placed = Transform::from_position_euler([9.43, 0.0, -4.8], [0.0, -1.0, 0.0]);
        let composed = &placed * &Transform::new();
        assert!((composed.position - placed.position).magnitude() < 1e-6);
    }

    #[test]
    fn normal_matrix_rotates_with_the_geometry() {
        // Quarter turn about Y carries a +Z face normal to +X, the same way
        // the model matrix carries the vertices.
        let t = Transform::from_position_euler([0.0; 3], [0.0, std::f32::consts::FRAC_PI_2, 0.0]);
        let normal = t.normal_matrix() * cgmath::Vector4::new(0.0, 0.0, 1.0, 0.0);
        let vertex_dir = t.to_matrix() * cgmath::Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!((normal - vertex_dir).magnitude() < 1e-6);
        assert!((normal.x - 1.0).abs() < 1e-6);
        assert!(normal.z.abs() < 1e-6);
    }

    #[test]
    fn parent_translation_offsets_child() {
        let mut parent = Transform::new();
        parent.position = cgmath::Vector3::new(1.0, 2.0, 3.0);
        let mut child = Transform::new();
        child.position = cgmath::Vector3::new(0.5, 0.0, 0.0);
        let world = &parent * &child;
        assert!((world.position - cgmath::Vector3::new(1.5, 2.0, 3.0)).magnitude() < 1e-6);
    }
}
