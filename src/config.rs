//! Static scene configuration.
//!
//! Everything the viewer assembles (asset paths, light settings, camera
//! placement) is plain data declared here. Defaults describe the bundled
//! interior scene (a walls shell and a sofa); an optional JSON file can
//! override any subset of fields.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "roomview".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// One glTF asset plus the transform it gets once attached to the scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    pub position: [f32; 3],
    /// Euler rotation in radians, applied as X then Y then Z.
    pub rotation: [f32; 3],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            position: [0.0; 3],
            rotation: [0.0; 3],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: WARM_WHITE,
            intensity: 0.8,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Shadow map resolution, square.
    pub map_size: u32,
    pub bias: f32,
    pub normal_bias: f32,
    /// Orthographic frustum bounds of the light camera.
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub far: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 1024,
            bias: 0.0001,
            normal_bias: 0.1,
            left: -15.0,
            right: 7.0,
            top: 7.0,
            bottom: -7.0,
            far: 35.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalConfig {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
    pub shadow: ShadowConfig,
}

impl Default for DirectionalConfig {
    fn default() -> Self {
        Self {
            color: WARM_WHITE,
            intensity: 20.0,
            position: [-18.0, 2.0, -5.0],
            shadow: ShadowConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PointConfig {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
    /// Distance beyond which the light contributes nothing.
    pub range: f32,
    /// Falloff exponent within the range.
    pub decay: f32,
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 20.0,
            position: [-0.27, 2.0, -3.0],
            range: 10.0,
            decay: 2.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fovy_deg: f32,
    pub znear: f32,
    pub zfar: f32,
    pub eye: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_deg: 75.0,
            znear: 0.1,
            zfar: 100.0,
            eye: [-8.0, 4.0, 8.0],
            target: [0.0, 1.0, 0.0],
        }
    }
}

/// `#fdfbd3`, the warm white both the ambient and directional light use.
pub const WARM_WHITE: [f32; 3] = [253.0 / 255.0, 251.0 / 255.0, 211.0 / 255.0];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    /// Directory all asset paths below resolve against.
    pub assets_dir: String,
    pub models: Vec<ModelConfig>,
    /// Cubemap faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub environment: [String; 6],
    /// Substitute cushion texture. Listed so the asset set is complete; the
    /// viewer never applies it.
    pub cushion_texture: String,
    pub ambient: AmbientConfig,
    pub directional: DirectionalConfig,
    pub point: PointConfig,
    pub camera: CameraConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets_dir: "assets".to_string(),
            models: vec![
                ModelConfig {
                    path: "models/walls.glb".to_string(),
                    position: [0.0, 0.0, 0.0],
                    rotation: [0.0, -1.0, 0.0],
                },
                ModelConfig {
                    path: "models/sofa/sofa.gltf".to_string(),
                    position: [9.43, 0.0, -4.8],
                    rotation: [0.0, -1.0, 0.0],
                },
            ],
            environment: [
                "textures/environmentMaps/1/px.jpg".to_string(),
                "textures/environmentMaps/1/nx.jpg".to_string(),
                "textures/environmentMaps/1/py.jpg".to_string(),
                "textures/environmentMaps/1/ny.jpg".to_string(),
                "textures/environmentMaps/1/pz.jpg".to_string(),
                "textures/environmentMaps/1/nz.jpg".to_string(),
            ],
            cushion_texture: "models/sofa/cushion_textures/green_cushion.png".to_string(),
            ambient: AmbientConfig::default(),
            directional: DirectionalConfig::default(),
            point: PointConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Read the config file if present, otherwise use the built-in scene.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::info!("no config at {} ({}), using defaults", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_lists_both_models() {
        let config = ViewerConfig::default();
        assert_eq!(config.models.len(), 2);
        assert!(config.models[0].path.ends_with("walls.glb"));
        assert!(config.models[1].path.ends_with("sofa.gltf"));
    }

    #[test]
    fn partial_json_overrides_keep_defaults_elsewhere() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "ambient": { "intensity": 2.5 } }"#).unwrap();
        assert_eq!(config.ambient.intensity, 2.5);
        assert_eq!(config.ambient.color, WARM_WHITE);
        assert_eq!(config.directional.shadow.map_size, 1024);
    }
}
