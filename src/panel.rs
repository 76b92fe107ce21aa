//! The live tweak panel.
//!
//! A small egui window with one slider per tweakable light parameter. Each
//! slider is described by a [`Binding`]: the value range, the step the value
//! snaps to, and which light field it reads and writes. Edits apply to the
//! scene immediately; nothing else about the scene can be changed at runtime.

use winit::event::WindowEvent;
use winit::window::Window;

use crate::context::Context;
use crate::lights::Lights;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// The light field a slider is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindTarget {
    AmbientIntensity,
    DirectionalIntensity,
    DirectionalPosition(Axis),
    PointPosition(Axis),
}

/// One slider: a label, a closed range, a step grid and a target field.
#[derive(Clone, Debug)]
pub struct Binding {
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub target: BindTarget,
}

impl Binding {
    /// Snap `value` onto the step grid and clamp it into the range.
    pub fn snap(&self, value: f32) -> f32 {
        let stepped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        stepped.clamp(self.min, self.max)
    }

    pub fn read(&self, lights: &Lights) -> f32 {
        match self.target {
            BindTarget::AmbientIntensity => lights.ambient.intensity,
            BindTarget::DirectionalIntensity => lights.directional.intensity,
            BindTarget::DirectionalPosition(axis) => axis_of(lights.directional.position, axis),
            BindTarget::PointPosition(axis) => axis_of(lights.point.position, axis),
        }
    }

    /// Write a snapped `value` to the bound field, leaving every other light
    /// parameter untouched.
    pub fn write(&self, lights: &mut Lights, value: f32) {
        let value = self.snap(value);
        match self.target {
            BindTarget::AmbientIntensity => lights.ambient.intensity = value,
            BindTarget::DirectionalIntensity => lights.directional.intensity = value,
            BindTarget::DirectionalPosition(axis) => {
                *axis_mut(&mut lights.directional.position, axis) = value;
            }
            BindTarget::PointPosition(axis) => {
                *axis_mut(&mut lights.point.position, axis) = value;
            }
        }
    }
}

fn axis_of(v: cgmath::Vector3<f32>, axis: Axis) -> f32 {
    match axis {
        Axis::X => v.x,
        Axis::Y => v.y,
        Axis::Z => v.z,
    }
}

fn axis_mut(v: &mut cgmath::Vector3<f32>, axis: Axis) -> &mut f32 {
    match axis {
        Axis::X => &mut v.x,
        Axis::Y => &mut v.y,
        Axis::Z => &mut v.z,
    }
}

/// The full slider set: ambient intensity, directional position and
/// intensity, point position.
pub fn default_bindings() -> Vec<Binding> {
    use BindTarget::*;
    vec![
        Binding {
            label: "ambient intensity",
            min: 0.0,
            max: 10.0,
            step: 0.01,
            target: AmbientIntensity,
        },
        Binding {
            label: "sun x",
            min: -100.0,
            max: 100.0,
            step: 1.0,
            target: DirectionalPosition(Axis::X),
        },
        Binding {
            label: "sun y",
            min: -100.0,
            max: 100.0,
            step: 1.0,
            target: DirectionalPosition(Axis::Y),
        },
        Binding {
            label: "sun z",
            min: -100.0,
            max: 100.0,
            step: 1.0,
            target: DirectionalPosition(Axis::Z),
        },
        Binding {
            label: "sun intensity",
            min: 0.0,
            max: 50.0,
            step: 0.01,
            target: DirectionalIntensity,
        },
        Binding {
            label: "lamp x",
            min: -100.0,
            max: 100.0,
            step: 0.01,
            target: PointPosition(Axis::X),
        },
        Binding {
            label: "lamp y",
            min: -100.0,
            max: 100.0,
            step: 0.01,
            target: PointPosition(Axis::Y),
        },
        Binding {
            label: "lamp z",
            min: -100.0,
            max: 100.0,
            step: 0.01,
            target: PointPosition(Axis::Z),
        },
    ]
}

/// egui state plus the slider bindings, drawn on top of every frame.
pub struct DebugPanel {
    context: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    bindings: Vec<Binding>,
}

impl DebugPanel {
    pub fn new(ctx: &Context) -> Self {
        let context = egui::Context::default();
        let state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            None,
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            &ctx.device,
            ctx.config.format,
            egui_wgpu::RendererOptions::default(),
        );
        Self {
            context,
            state,
            renderer,
            bindings: default_bindings(),
        }
    }

    /// Feed a window event to egui. Returns true when egui consumed it and
    /// the camera controls should not see it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run the panel UI and paint it over `view`. Slider edits land on
    /// `lights` before the method returns.
    pub fn draw(
        &mut self,
        ctx: &Context,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        lights: &mut Lights,
    ) {
        let raw_input = self.state.take_egui_input(&ctx.window);
        self.context.begin_pass(raw_input);

        egui::Window::new("lights")
            .default_open(true)
            .resizable(false)
            .show(&self.context, |ui| {
                for binding in &self.bindings {
                    let mut value = binding.read(lights);
                    let slider = egui::Slider::new(&mut value, binding.min..=binding.max)
                        .text(binding.label)
                        .step_by(binding.step as f64);
                    if ui.add(slider).changed() {
                        binding.write(lights, value);
                    }
                }
            });

        let output = self.context.end_pass();
        self.state
            .handle_platform_output(&ctx.window, output.platform_output);

        let pixels_per_point = self.context.pixels_per_point();
        let tris = self.context.tessellate(output.shapes, pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [ctx.config.width, ctx.config.height],
            pixels_per_point,
        };

        for (id, delta) in &output.textures_delta.set {
            self.renderer
                .update_texture(&ctx.device, &ctx.queue, *id, delta);
        }
        self.renderer
            .update_buffers(&ctx.device, &ctx.queue, encoder, &tris, &screen);

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("panel_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer
                .render(&mut pass.forget_lifetime(), &tris, &screen);
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;

    fn lights() -> Lights {
        let config = ViewerConfig::default();
        Lights::new(&config.ambient, &config.directional, &config.point)
    }

    fn binding_for(target: BindTarget) -> Binding {
        default_bindings()
            .into_iter()
            .find(|b| b.target == target)
            .unwrap()
    }

    #[test]
    fn values_snap_to_the_step_grid() {
        let sun_x = binding_for(BindTarget::DirectionalPosition(Axis::X));
        assert_eq!(sun_x.snap(3.4), 3.0);
        assert_eq!(sun_x.snap(3.6), 4.0);

        let ambient = binding_for(BindTarget::AmbientIntensity);
        assert!((ambient.snap(0.123) - 0.12).abs() < 1e-4);
    }

    #[test]
    fn values_clamp_to_the_range() {
        let ambient = binding_for(BindTarget::AmbientIntensity);
        assert_eq!(ambient.snap(-5.0), 0.0);
        assert_eq!(ambient.snap(25.0), 10.0);

        let sun = binding_for(BindTarget::DirectionalIntensity);
        assert_eq!(sun.snap(120.0), 50.0);
    }

    #[test]
    fn write_touches_only_the_bound_field() {
        let mut lights = lights();
        let before = lights.clone();

        let lamp_y = binding_for(BindTarget::PointPosition(Axis::Y));
        lamp_y.write(&mut lights, 5.5);

        assert_eq!(lights.point.position.y, 5.5);
        assert_eq!(lights.point.position.x, before.point.position.x);
        assert_eq!(lights.point.position.z, before.point.position.z);
        assert_eq!(lights.point.intensity, before.point.intensity);
        assert_eq!(lights.ambient.intensity, before.ambient.intensity);
        assert_eq!(lights.directional.position, before.directional.position);
        assert_eq!(lights.directional.intensity, before.directional.intensity);
    }

    #[test]
    fn every_light_parameter_has_a_slider() {
        let bindings = default_bindings();
        assert_eq!(bindings.len(), 8);
        assert!(
            bindings
                .iter()
                .any(|b| b.target == BindTarget::AmbientIntensity)
        );
        assert!(
            bindings
                .iter()
                .any(|b| b.target == BindTarget::DirectionalIntensity)
        );
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            assert!(
                bindings
                    .iter()
                    .any(|b| b.target == BindTarget::DirectionalPosition(axis))
            );
            assert!(
                bindings
                    .iter()
                    .any(|b| b.target == BindTarget::PointPosition(axis))
            );
        }
    }

    #[test]
    fn edits_round_trip_through_read() {
        let mut lights = lights();
        for binding in default_bindings() {
            binding.write(&mut lights, 1.0);
            assert_eq!(binding.read(&lights), 1.0);
        }
    }
}
