use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::scene::{ProjectionParams, SceneParams};

/// Window side length when the monitor size is unknown
pub const FALLBACK_WINDOW_SIZE: u32 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Defaults to a square of half the primary monitor height
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "GLprimer".to_string(),
            width: None,
            height: None,
        }
    }
}

impl WindowConfig {
    /// Initial inner size for the window
    pub fn size(&self, monitor_height: Option<u32>) -> (u32, u32) {
        let side = monitor_height
            .map(|h| (h / 2).max(1))
            .unwrap_or(FALLBACK_WINDOW_SIZE);
        (self.width.unwrap_or(side), self.height.unwrap_or(side))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Relative paths below are resolved against this directory
    pub root: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub mesh: PathBuf,
    /// `None` uses a procedural checkerboard
    pub mesh_texture: Option<PathBuf>,
    pub sphere_texture: Option<PathBuf>,
    pub box_texture: Option<PathBuf>,
    pub sphere_radius: f32,
    pub sphere_segments: u32,
    pub box_size: [f32; 3],
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            vertex_shader: PathBuf::from("shaders/vertex.wgsl"),
            fragment_shader: PathBuf::from("shaders/fragment.wgsl"),
            mesh: PathBuf::from("assets/meshes/model.obj"),
            mesh_texture: Some(PathBuf::from("assets/textures/model.tga")),
            sphere_texture: Some(PathBuf::from("assets/textures/earth.tga")),
            box_texture: Some(PathBuf::from("assets/textures/crate.tga")),
            sphere_radius: 0.4,
            sphere_segments: 50,
            box_size: [1.0, 1.0, 1.0],
        }
    }
}

impl AssetConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Everything the demo reads at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub projection: ProjectionParams,
    pub scene: SceneParams,
    pub assets: AssetConfig,
    pub clear_color: [f64; 4],
    pub vsync: bool,
    pub show_ui: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            projection: ProjectionParams::default(),
            scene: SceneParams::default(),
            assets: AssetConfig::default(),
            clear_color: [0.3, 0.3, 0.3, 0.0],
            vsync: false,
            show_ui: true,
        }
    }
}

impl DemoConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Defaults, then the config file, then command-line flags
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(root) = &cli.assets {
            config.assets.root = root.clone();
        }
        config.vsync |= cli.vsync;
        config.show_ui &= !cli.no_ui;
        Ok(config)
    }

    pub fn wgpu_clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults_to_half_monitor_height() {
        let window = WindowConfig::default();
        assert_eq!(window.size(Some(1440)), (720, 720));
        assert_eq!(window.size(None), (FALLBACK_WINDOW_SIZE, FALLBACK_WINDOW_SIZE));
    }

    #[test]
    fn test_explicit_window_size() {
        let window = WindowConfig {
            width: Some(1024),
            height: Some(512),
            ..Default::default()
        };
        assert_eq!(window.size(Some(1440)), (1024, 512));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let assets = AssetConfig {
            root: PathBuf::from("data"),
            ..Default::default()
        };
        assert_eq!(assets.resolve(Path::new("a.obj")), PathBuf::from("data/a.obj"));
        let absolute = std::env::temp_dir().join("b.obj");
        assert_eq!(assets.resolve(&absolute), absolute);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli {
            assets: Some(PathBuf::from("elsewhere")),
            vsync: true,
            no_ui: true,
            ..Default::default()
        };
        let config = DemoConfig::from_cli(&cli).expect("no config file needed");
        assert_eq!(config.assets.root, PathBuf::from("elsewhere"));
        assert!(config.vsync);
        assert!(!config.show_ui);
    }

    #[test]
    fn test_clear_color() {
        let color = DemoConfig::default().wgpu_clear_color();
        assert_eq!((color.r, color.g, color.b, color.a), (0.3, 0.3, 0.3, 0.0));
    }
}
