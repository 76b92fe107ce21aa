//! Central GPU and window context.
//!
//! Owns the surface, device and queue. Everything else (pipelines, scene
//! buffers, the panel) borrows from here. Created once on the main thread.

use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Output-surface pixel ratio, capped at 2 regardless of what the host
/// display reports.
pub fn clamped_pixel_ratio(host_ratio: f64) -> f64 {
    host_ratio.min(2.0)
}

/// Surface size in pixels for a window of `size` at `scale_factor`.
///
/// Matches the window exactly up to a scale factor of 2; denser displays
/// render at the capped ratio and let the compositor upscale.
pub fn surface_extent(size: PhysicalSize<u32>, scale_factor: f64) -> (u32, u32) {
    let scale = scale_factor.max(1e-6);
    let ratio = clamped_pixel_ratio(scale_factor);
    let width = (size.width as f64 * ratio / scale).round() as u32;
    let height = (size.height as f64 * ratio / scale).round() as u32;
    (width.max(1), height.max(1))
}

#[derive(Debug)]
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface; colors come out dark otherwise.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let (width, height) = surface_extent(size, scale_factor);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
        })
    }

    /// Reconfigure the surface for a new window size. Zero sizes
    /// (minimized window) are ignored.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        let (width, height) = surface_extent(size, self.window.scale_factor());
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_caps_at_two() {
        assert_eq!(clamped_pixel_ratio(1.0), 1.0);
        assert_eq!(clamped_pixel_ratio(1.5), 1.5);
        assert_eq!(clamped_pixel_ratio(2.0), 2.0);
        assert_eq!(clamped_pixel_ratio(3.0), 2.0);
    }

    #[test]
    fn surface_matches_window_below_the_cap() {
        let size = PhysicalSize::new(1280, 720);
        assert_eq!(surface_extent(size, 1.0), (1280, 720));
        assert_eq!(surface_extent(size, 2.0), (1280, 720));
    }

    #[test]
    fn dense_displays_render_at_the_cap() {
        // 3x display: 1000x500 logical, rendered at 2x.
        let size = PhysicalSize::new(3000, 1500);
        assert_eq!(surface_extent(size, 3.0), (2000, 1000));
    }
}
