//! Builds the globe scene graph from a [`GlobeConfig`].

use glam::{Vec2, Vec3};

use super::graph::{NodeId, SceneGraph, Transform};
use super::material::{BlendMode, Drawable, Material, ProgramKind, Side, UniformValue, uniforms};
use crate::assets::{AssetLoader, TextureHandle};
use crate::camera::{Camera, DirectionalLight};
use crate::config::GlobeConfig;
use crate::geometry::{Geometry, PointCloud, RawGeometry};

/// Ocean blue shown until the surface texture arrives.
pub const GLOBE_FALLBACK: [u8; 4] = [40, 90, 160, 255];
/// Fully transparent, so a missing cloud texture hides the layer.
pub const CLOUD_FALLBACK: [u8; 4] = [255, 255, 255, 0];

/// The complete scene: graph, camera, light, and textures.
///
/// Built once before the render loop starts. Afterwards only node transforms
/// change.
#[derive(Debug)]
pub struct GlobeScene {
    pub graph: SceneGraph,
    pub camera: Camera,
    pub light: Option<DirectionalLight>,
    pub textures: AssetLoader,
    /// Rotating group holding the surface and cloud layer.
    pub group: NodeId,
    pub surface: NodeId,
    pub clouds: Option<NodeId>,
    /// Glow shell. Sits directly under the root so it ignores parallax.
    pub atmosphere: NodeId,
    pub stars: NodeId,
}

impl GlobeScene {
    /// Builds the scene and starts any texture loads the config asks for.
    pub fn build(config: &GlobeConfig, mut textures: AssetLoader) -> Self {
        let sphere = RawGeometry::sphere(config.radius, config.width_segments, config.height_segments);
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let globe_texture = texture_or_fallback(
            &mut textures,
            "globe",
            config.globe_texture.as_deref(),
            GLOBE_FALLBACK,
        );

        let group = graph.add_child(root, "group", Transform::new(), None);

        let surface_material = Material::new(ProgramKind::Surface)
            .uniform(uniforms::TEXTURE, UniformValue::Texture(globe_texture))
            .uniform(uniforms::COLOR, UniformValue::Color(Vec3::ONE))
            .uniform(uniforms::OPACITY, UniformValue::Float(1.0))
            .uniform(uniforms::GLOW, UniformValue::Float(config.rim_strength));
        let surface = graph.add_child(
            group,
            "surface",
            Transform::new(),
            Some(Drawable::new(Geometry::Mesh(sphere.clone()), surface_material)),
        );
        let surface_scale = graph.transform(surface).map_or(1.0, |t| t.scale);

        let clouds = config.clouds.as_ref().map(|cloud| {
            let texture =
                texture_or_fallback(&mut textures, "clouds", cloud.texture.as_deref(), CLOUD_FALLBACK);
            let material = Material::new(ProgramKind::Surface)
                .uniform(uniforms::TEXTURE, UniformValue::Texture(texture))
                .uniform(uniforms::COLOR, UniformValue::Color(Vec3::ONE))
                .uniform(uniforms::OPACITY, UniformValue::Float(cloud.opacity))
                .uniform(uniforms::GLOW, UniformValue::Float(0.0))
                .blend(BlendMode::Alpha)
                .depth_write(false);
            graph.add_child(
                group,
                "clouds",
                Transform::new().uniform_scale(cloud.scale * surface_scale),
                Some(Drawable::new(Geometry::Mesh(sphere.clone()), material)),
            )
        });

        let atmosphere_material = Material::new(ProgramKind::Atmosphere)
            .uniform(uniforms::COLOR, UniformValue::Color(config.atmosphere_color))
            .uniform(uniforms::GLOW, UniformValue::Float(config.atmosphere_strength))
            .blend(BlendMode::Additive)
            .side(Side::Back)
            .depth_write(false);
        let atmosphere = graph.add_child(
            root,
            "atmosphere",
            Transform::new().uniform_scale(config.atmosphere_scale * surface_scale),
            Some(Drawable::new(Geometry::Mesh(sphere), atmosphere_material)),
        );

        let star_material = Material::new(ProgramKind::Starfield)
            .uniform(uniforms::COLOR, UniformValue::Color(config.stars.color))
            .uniform(uniforms::POINT_SIZE, UniformValue::Float(config.stars.size))
            .uniform(uniforms::OPACITY, UniformValue::Float(1.0))
            .blend(BlendMode::Additive)
            .side(Side::Both)
            .depth_write(false);
        let stars = graph.add_child(
            root,
            "stars",
            Transform::new(),
            Some(Drawable::new(
                Geometry::Points(PointCloud::starfield(&config.stars)),
                star_material,
            )),
        );

        let aspect = config.width as f32 / config.height.max(1) as f32;
        let camera = Camera::new()
            .at(0.0, 0.0, config.camera_distance)
            .looking_at(0.0, 0.0, 0.0)
            .with_fov(config.fov_degrees)
            .with_clip(config.near, config.far)
            .with_aspect(aspect);

        log::info!(
            "Built globe scene: {} nodes, {} stars, clouds {}, light {}",
            graph.len(),
            config.stars.count,
            if clouds.is_some() { "on" } else { "off" },
            if config.light.is_some() { "on" } else { "off" },
        );

        Self {
            graph,
            camera,
            light: config.light,
            textures,
            group,
            surface,
            clouds,
            atmosphere,
            stars,
        }
    }

    /// Applies a new viewport aspect ratio to the camera.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    /// The group's parallax rotation as `(x, y)`.
    pub fn group_rotation(&self) -> Vec2 {
        self.graph
            .transform(self.group)
            .map_or(Vec2::ZERO, |t| Vec2::new(t.rotation.x, t.rotation.y))
    }

    pub fn set_group_rotation(&mut self, rotation: Vec2) {
        if let Some(t) = self.graph.transform_mut(self.group) {
            t.rotation.x = rotation.x;
            t.rotation.y = rotation.y;
        }
    }

    /// The surface's spin angle about Y.
    pub fn surface_spin(&self) -> f32 {
        self.graph.transform(self.surface).map_or(0.0, |t| t.rotation.y)
    }

    /// The cloud layer's spin angle about Y, if the layer exists.
    pub fn cloud_spin(&self) -> Option<f32> {
        let clouds = self.clouds?;
        self.graph.transform(clouds).map(|t| t.rotation.y)
    }

    /// Sets the surface and cloud spin angles.
    pub fn set_spin(&mut self, surface: f32, clouds: f32) {
        if let Some(t) = self.graph.transform_mut(self.surface) {
            t.rotation.y = surface;
        }
        if let Some(t) = self.clouds.and_then(|id| self.graph.transform_mut(id)) {
            t.rotation.y = clouds;
        }
    }

    /// Uniform scale of `node` in world space.
    pub fn world_scale(&self, node: NodeId) -> Option<f32> {
        self.graph.world_matrix(node).map(|m| m.x_axis.truncate().length())
    }
}

fn texture_or_fallback(
    textures: &mut AssetLoader,
    label: &str,
    path: Option<&std::path::Path>,
    fallback: [u8; 4],
) -> TextureHandle {
    match path {
        Some(path) => textures.load(path, fallback),
        None => textures.fallback(label, fallback),
    }
}
