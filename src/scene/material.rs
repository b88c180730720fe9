use std::collections::BTreeMap;

use glam::Vec3;

use crate::assets::TextureHandle;
use crate::geometry::Geometry;

/// Which bundled shader program draws a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Textured, optionally lit sphere. Also used for the cloud layer.
    Surface,
    /// Rim glow drawn from the inside of a slightly larger shell.
    Atmosphere,
    /// Instanced point billboards.
    Starfield,
}

/// How fragments combine with what is already in the framebuffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Replace.
    #[default]
    Opaque,
    /// Standard alpha-over.
    Alpha,
    /// Color is summed onto the framebuffer.
    Additive,
}

impl BlendMode {
    pub fn is_blended(self) -> bool {
        !matches!(self, BlendMode::Opaque)
    }
}

/// Which triangle faces are rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    /// Only faces pointing away from the camera.
    Back,
    Both,
}

/// A value bound to a named material uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Color(Vec3),
    Vec3(Vec3),
    Texture(TextureHandle),
}

/// Uniform names understood by the bundled programs.
pub mod uniforms {
    pub const TEXTURE: &str = "texture";
    pub const COLOR: &str = "color";
    pub const OPACITY: &str = "opacity";
    /// Rim or glow strength.
    pub const GLOW: &str = "glow";
    pub const POINT_SIZE: &str = "point_size";
}

/// Shader program plus its uniforms and raster state.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub program: ProgramKind,
    pub uniforms: BTreeMap<String, UniformValue>,
    pub blend: BlendMode,
    pub side: Side,
    pub depth_write: bool,
}

impl Material {
    pub fn new(program: ProgramKind) -> Self {
        Self {
            program,
            uniforms: BTreeMap::new(),
            blend: BlendMode::Opaque,
            side: Side::Front,
            depth_write: true,
        }
    }

    pub fn uniform(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.uniforms.insert(name.into(), value);
        self
    }

    pub fn blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn depth_write(mut self, depth_write: bool) -> Self {
        self.depth_write = depth_write;
        self
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.uniforms.get(name)? {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// A color or vector uniform.
    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.uniforms.get(name)? {
            UniformValue::Color(v) | UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        match self.uniforms.get(name)? {
            UniformValue::Texture(handle) => Some(*handle),
            _ => None,
        }
    }
}

/// An immutable geometry + material pair.
#[derive(Debug)]
pub struct Drawable {
    geometry: Geometry,
    material: Material,
}

impl Drawable {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self { geometry, material }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

/// Sorts draw items so opaque materials come before blended ones.
///
/// The sort is stable, so insertion order holds within each group.
pub fn sort_for_drawing<T>(items: &mut [T], material: impl Fn(&T) -> &Material) {
    items.sort_by_key(|item| material(item).blend.is_blended());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_uniform_lookup() {
        let material = Material::new(ProgramKind::Atmosphere)
            .uniform(uniforms::COLOR, UniformValue::Color(Vec3::new(0.3, 0.6, 1.0)))
            .uniform(uniforms::GLOW, UniformValue::Float(1.0));

        assert_eq!(material.vec3(uniforms::COLOR), Some(Vec3::new(0.3, 0.6, 1.0)));
        assert_eq!(material.float(uniforms::GLOW), Some(1.0));
        assert_eq!(material.float(uniforms::COLOR), None);
        assert_eq!(material.texture(uniforms::TEXTURE), None);
    }

    #[test]
    fn defaults_are_opaque_front_depth_writing() {
        let material = Material::new(ProgramKind::Surface);
        assert_eq!(material.blend, BlendMode::Opaque);
        assert_eq!(material.side, Side::Front);
        assert!(material.depth_write);
    }

    #[test]
    fn opaque_draws_first_keeping_order() {
        let mut items = vec![
            ("stars", Material::new(ProgramKind::Starfield).blend(BlendMode::Additive)),
            ("surface", Material::new(ProgramKind::Surface)),
            ("clouds", Material::new(ProgramKind::Surface).blend(BlendMode::Alpha)),
            ("core", Material::new(ProgramKind::Surface)),
        ];
        sort_for_drawing(&mut items, |(_, m)| m);
        let order: Vec<_> = items.iter().map(|(name, _)| *name).collect();
        assert_eq!(order, ["surface", "core", "stars", "clouds"]);
    }
}
