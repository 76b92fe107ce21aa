//! The three scene lights and their GPU uniform layout.
//!
//! Lights are created once from config and afterwards mutated only through
//! the debug panel bindings. The directional light carries the shadow-map
//! settings; its orthographic view-projection feeds the shadow pass.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3, ortho};

use crate::camera::OPENGL_TO_WGPU_MATRIX;
use crate::config::{AmbientConfig, DirectionalConfig, PointConfig, ShadowConfig};

#[derive(Clone, Debug)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Directional light shining from `position` toward the scene origin.
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vector3<f32>,
    pub shadow: ShadowConfig,
}

impl DirectionalLight {
    pub fn direction(&self) -> Vector3<f32> {
        (-self.position).normalize()
    }

    /// View-projection of the light's orthographic shadow camera.
    pub fn shadow_matrix(&self) -> Matrix4<f32> {
        let s = &self.shadow;
        let view = Matrix4::look_at_rh(
            Point3::from_vec(self.position),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        let proj = ortho(s.left, s.right, s.bottom, s.top, 0.1, s.far);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

#[derive(Clone, Debug)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vector3<f32>,
    pub range: f32,
    pub decay: f32,
}

/// All lights of the scene. Exactly one of each kind.
#[derive(Clone, Debug)]
pub struct Lights {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub point: PointLight,
}

impl Lights {
    pub fn new(
        ambient: &AmbientConfig,
        directional: &DirectionalConfig,
        point: &PointConfig,
    ) -> Self {
        Self {
            ambient: AmbientLight {
                color: ambient.color,
                intensity: ambient.intensity,
            },
            directional: DirectionalLight {
                color: directional.color,
                intensity: directional.intensity,
                position: directional.position.into(),
                shadow: directional.shadow.clone(),
            },
            point: PointLight {
                color: point.color,
                intensity: point.intensity,
                position: point.position.into(),
                range: point.range,
                decay: point.decay,
            },
        }
    }

    /// How many lights a correctly assembled scene carries.
    pub fn count(&self) -> usize {
        3
    }

    pub fn to_uniform(&self) -> LightsUniform {
        let dir = self.directional.direction();
        LightsUniform {
            ambient_color: self.ambient.color,
            ambient_intensity: self.ambient.intensity,
            dir_direction: dir.into(),
            dir_intensity: self.directional.intensity,
            dir_color: self.directional.color,
            shadow_bias: self.directional.shadow.bias,
            point_position: self.point.position.into(),
            point_intensity: self.point.intensity,
            point_color: self.point.color,
            point_range: self.point.range,
            point_decay: self.point.decay,
            shadow_normal_bias: self.directional.shadow.normal_bias,
            _padding: [0.0; 2],
        }
    }
}

// Uniforms require 16 byte field alignment, hence the intensity/bias scalars
// packed into the fourth component of each vec3.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub dir_direction: [f32; 3],
    pub dir_intensity: f32,
    pub dir_color: [f32; 3],
    pub shadow_bias: f32,
    pub point_position: [f32; 3],
    pub point_intensity: f32,
    pub point_color: [f32; 3],
    pub point_range: f32,
    pub point_decay: f32,
    pub shadow_normal_bias: f32,
    pub _padding: [f32; 2],
}

/// Light view-projection for the shadow pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    pub light_view_proj: [[f32; 4]; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;

    fn lights() -> Lights {
        let config = ViewerConfig::default();
        Lights::new(&config.ambient, &config.directional, &config.point)
    }

    #[test]
    fn directional_light_points_at_origin() {
        let lights = lights();
        let dir = lights.directional.direction();
        // Direction opposes the position vector.
        let expected = -Vector3::new(-18.0, 2.0, -5.0).normalize();
        assert!((dir - expected).magnitude() < 1e-6);
        assert!((dir.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn uniform_mirrors_light_fields() {
        let mut lights = lights();
        lights.ambient.intensity = 3.5;
        lights.point.position.x = -42.0;
        let uniform = lights.to_uniform();
        assert_eq!(uniform.ambient_intensity, 3.5);
        assert_eq!(uniform.point_position[0], -42.0);
        assert_eq!(uniform.point_range, 10.0);
        assert_eq!(uniform.shadow_bias, 0.0001);
    }
}
