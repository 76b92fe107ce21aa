//! Camera, projection and damped orbit controls.
//!
//! The camera orbits a fixed look-at target. User input moves goal angles;
//! every frame the actual angles are eased toward the goals so the motion
//! settles smoothly instead of snapping.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Orbit-state camera: eye position derived from yaw/pitch/distance around a
/// target point.
#[derive(Clone, Debug)]
pub struct Camera {
    pub target: Point3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Camera {
    /// Build the orbit state that places the eye at `eye` looking at `target`.
    pub fn from_eye_target(eye: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude();
        let pitch = (offset.y / distance).asin();
        let yaw = offset.z.atan2(offset.x);
        Self {
            target,
            yaw,
            pitch,
            distance,
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target
            + Vector3::new(
                self.distance * cos_pitch * cos_yaw,
                self.distance * sin_pitch,
                self.distance * cos_pitch * sin_yaw,
            )
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }
}

/// Perspective projection. The aspect ratio is an invariant of the viewport:
/// it must be recomputed through [`resize`](Self::resize) whenever the
/// viewport size changes.
#[derive(Clone, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

// Keep the pitch away from the poles so look_at never degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Damped orbit controls.
///
/// Dragging with the left mouse button rotates, the scroll wheel zooms. Input
/// only moves the goal state; [`update`](Self::update) eases the camera toward
/// it with an exponential falloff, so releasing the mouse leaves the camera
/// gliding to a stop.
pub struct OrbitControls {
    goal_yaw: f32,
    goal_pitch: f32,
    goal_distance: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    /// Damping rate in 1/seconds; higher settles faster.
    damping: f32,
    dragging: bool,
}

impl OrbitControls {
    pub fn new(camera: &Camera) -> Self {
        Self {
            goal_yaw: camera.yaw,
            goal_pitch: camera.pitch,
            goal_distance: camera.distance,
            rotate_speed: 0.005,
            zoom_speed: 0.5,
            damping: 10.0,
            dragging: false,
        }
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                };
                self.goal_distance = (self.goal_distance - scroll * self.zoom_speed).max(0.5);
            }
            _ => (),
        }
    }

    /// Raw mouse motion; only rotates while the left button is held.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        if !self.dragging {
            return;
        }
        self.goal_yaw += dx as f32 * self.rotate_speed;
        self.goal_pitch =
            (self.goal_pitch + dy as f32 * self.rotate_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Ease the camera toward the goal state by `dt` seconds.
    pub fn update(&mut self, camera: &mut Camera, dt: f32) {
        let t = 1.0 - (-self.damping * dt).exp();
        camera.yaw += (self.goal_yaw - camera.yaw) * t;
        camera.pitch += (self.goal_pitch - camera.pitch) * t;
        camera.distance += (self.goal_distance - camera.distance) * t;
    }
}

/// Camera data as the shaders see it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            inv_view_proj: Matrix4::identity().into(),
            view_pos: [0.0; 4],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        let view_proj = projection.matrix() * camera.view_matrix();
        self.view_proj = view_proj.into();
        self.inv_view_proj = view_proj
            .invert()
            .unwrap_or_else(Matrix4::identity)
            .into();
        let eye = camera.eye();
        self.view_pos = [eye.x, eye.y, eye.z, 1.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, EuclideanSpace};

    #[test]
    fn resize_recomputes_aspect_exactly() {
        let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
        projection.resize(1280, 720);
        assert_eq!(projection.aspect, 1280.0 / 720.0);
        projection.resize(333, 111);
        assert_eq!(projection.aspect, 3.0);
    }

    #[test]
    fn initial_viewport_gives_expected_aspect() {
        let projection = Projection::new(1280, 720, Deg(75.0), 0.1, 100.0);
        assert!((projection.aspect - 1.778).abs() < 0.001);
    }

    #[test]
    fn eye_round_trips_through_orbit_state() {
        let eye = Point3::new(-8.0, 4.0, 8.0);
        let target = Point3::new(0.0, 1.0, 0.0);
        let camera = Camera::from_eye_target(eye, target);
        let back = camera.eye();
        assert!((back.to_vec() - eye.to_vec()).magnitude() < 1e-4);
    }

    #[test]
    fn controls_ease_toward_goal_without_overshoot() {
        let mut camera =
            Camera::from_eye_target(Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(&camera);
        controls.dragging = true;
        controls.handle_mouse(100.0, 0.0);
        let goal = controls.goal_yaw;
        let before = (goal - camera.yaw).abs();
        for _ in 0..10 {
            controls.update(&mut camera, 0.016);
            assert!((goal - camera.yaw).abs() <= before);
        }
        // A few frames in the camera has moved a measurable part of the way.
        assert!((goal - camera.yaw).abs() < before * 0.5);
    }
}
