//! # Globe
//!
//! **A rotating, textured globe with an atmospheric glow, a starfield, and
//! pointer parallax.**
//!
//! The crate is split along one seam. Everything that decides *what* a frame
//! looks like (scene graph, spin, parallax easing, pointer sampling, the frame
//! clock, and the [`RenderLoop`] that ties them together) is plain Rust and
//! runs headless. Everything that puts pixels on screen lives behind the
//! [`SceneRenderer`] trait, implemented by the wgpu-backed [`GlobePass`].
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), globe::AppError> {
//!     globe::run_with_config(
//!         globe::GlobeConfig::earth()
//!             .globe_texture("assets/earth.jpg")
//!             .cloud_texture("assets/clouds.png"),
//!     )
//! }
//! ```
//!
//! ## Headless
//!
//! ```
//! use globe::{AssetLoader, GlobeConfig, GlobeScene, ManualClock, RenderLoop};
//! # use globe::{FrameScheduler, RenderError, SceneRenderer};
//! # struct Null;
//! # impl SceneRenderer for Null {
//! #     fn render(&mut self, _: &GlobeScene, _: f32) -> Result<(), RenderError> { Ok(()) }
//! # }
//! # struct Host;
//! # impl FrameScheduler for Host { fn request_frame(&self) {} }
//!
//! let config = GlobeConfig::earth();
//! let scene = GlobeScene::build(&config, AssetLoader::new());
//! let mut render_loop = RenderLoop::new(&config, scene, Null, ManualClock::new());
//!
//! render_loop.start();
//! render_loop.clock().set(2.0);
//! render_loop.tick(&Host).unwrap();
//! ```

pub mod animation;
mod app;
mod assets;
mod camera;
mod clock;
mod config;
mod geometry;
mod globe_pass;
mod gpu;
mod input;
mod mesh;
mod render_loop;
pub mod scene;
mod shader;
mod texture;

pub use app::{AppError, run, run_with_config};
pub use assets::{
    AssetError, AssetLoader, MAX_TEXTURE_DIMENSION, SlotState, TextureData, TextureHandle,
    TextureSlot, texture_from_bytes,
};
pub use camera::{Camera, DirectionalLight};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CloudConfig, GlobeConfig, StarfieldConfig};
pub use geometry::{Geometry, PointCloud, RawGeometry};
pub use globe_pass::{FrameUniforms, GlobePass, ModelUniforms};
pub use gpu::{GpuContext, RenderError};
pub use input::{Input, normalize_pointer};
pub use mesh::{GpuMesh, StarPoint, Vertex3d};
pub use render_loop::{FrameScheduler, LoopState, RenderLoop, SceneRenderer};
pub use scene::{GlobeScene, NodeId, SceneGraph, Transform};
pub use shader::{FRAGMENT_ENTRY, ShaderError, ShaderProgram, ShaderSet, Stage, VERTEX_ENTRY};
pub use texture::Texture;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
