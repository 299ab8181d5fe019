pub mod cli;
pub mod config;
pub mod core;
pub mod loaders;
pub mod math;
pub mod mesh;
pub mod overlay;
pub mod renderer;
pub mod rotator;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod types;

pub use math::Matrix4;
pub use scene::{compose_frame, FrameTransforms, ProjectionParams, Rotation, SceneParams};
