//! The globe scene graph.
//!
//! A [`SceneGraph`] is a tree of [`Node`]s, each with a [`Transform`] and at
//! most one immutable [`Drawable`]. [`GlobeScene::build`] assembles the
//! concrete globe tree once at startup:
//!
//! ```text
//! root
//! ├── group          (parallax rotation)
//! │   ├── surface    (spin)
//! │   └── clouds     (spin × ratio, optional)
//! ├── atmosphere     (additive, back faces)
//! └── stars          (additive points)
//! ```
//!
//! # Example
//!
//! ```
//! use globe::{AssetLoader, GlobeConfig, GlobeScene};
//!
//! let scene = GlobeScene::build(&GlobeConfig::classic(), AssetLoader::new());
//! assert!(scene.clouds.is_none());
//! assert_eq!(scene.graph.drawables().len(), 3);
//! ```

mod graph;
pub mod material;
mod setup;

pub use graph::{Node, NodeId, SceneGraph, Transform, WorldDrawable};
pub use material::{BlendMode, Drawable, Material, ProgramKind, Side, UniformValue};
pub use setup::{CLOUD_FALLBACK, GLOBE_FALLBACK, GlobeScene};
