//! Configuration for the globe scene and its window.
//!
//! [`GlobeConfig`] gathers every tunable of the demo in one place, with two
//! presets matching the two variants of the demo:
//!
//! - [`GlobeConfig::classic`]: per-frame spin, no clouds, no light, plain white stars
//! - [`GlobeConfig::earth`]: time-based spin, drifting cloud layer, directional
//!   light, stars of varying size (the default)
//!
//! # Example
//!
//! ```
//! use globe::GlobeConfig;
//!
//! let config = GlobeConfig::earth()
//!     .title("Blue Marble")
//!     .size(1280, 720)
//!     .globe_texture("assets/globe.png");
//!
//! assert_eq!(config.width, 1280);
//! assert!(config.clouds.is_some());
//! ```

use std::path::PathBuf;

use glam::Vec3;

use crate::animation::SpinMode;
use crate::camera::DirectionalLight;

/// Starfield generation parameters.
#[derive(Clone, Copy, Debug)]
pub struct StarfieldConfig {
    /// Number of stars.
    pub count: usize,
    /// Half-extent of the field on X and Y.
    pub spread: f32,
    /// Depth of the field behind the origin (stars have `z` in `[-depth, 0)`).
    pub depth: f32,
    /// Base billboard size in world units.
    pub size: f32,
    /// Per-star size multiplier range (inclusive).
    pub scale_range: (f32, f32),
    /// Linear RGB star color.
    pub color: Vec3,
    /// RNG seed for reproducible fields.
    pub seed: u64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            spread: 1000.0,
            depth: 1500.0,
            size: 2.0,
            scale_range: (1.0, 1.0),
            color: Vec3::ONE,
            seed: 0x5eed,
        }
    }
}

/// The optional semi-transparent cloud layer.
#[derive(Clone, Debug)]
pub struct CloudConfig {
    /// Cloud texture (alpha channel is coverage).
    pub texture: Option<PathBuf>,
    /// Scale relative to the globe surface.
    pub scale: f32,
    /// Opacity multiplier.
    pub opacity: f32,
    /// Cloud spin as a multiple of the surface spin.
    pub ratio: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            texture: None,
            scale: 1.01,
            opacity: 0.8,
            ratio: 1.4,
        }
    }
}

/// Configuration for the globe window and scene.
#[derive(Clone, Debug)]
pub struct GlobeConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,

    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera distance along +Z from the globe center.
    pub camera_distance: f32,

    /// Globe radius in world units.
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Surface texture. Without one the globe renders in its fallback color.
    pub globe_texture: Option<PathBuf>,
    /// Strength of the blue rim added by the surface shader.
    pub rim_strength: f32,

    /// Atmosphere shell scale relative to the surface.
    pub atmosphere_scale: f32,
    pub atmosphere_color: Vec3,
    pub atmosphere_strength: f32,

    pub clouds: Option<CloudConfig>,
    pub light: Option<DirectionalLight>,
    pub spin: SpinMode,

    /// Pointer-to-rotation sensitivity `k`.
    pub sensitivity: f32,
    /// Duration of the parallax ease in seconds.
    pub ease_duration: f32,

    pub stars: StarfieldConfig,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self::earth()
    }
}

impl GlobeConfig {
    /// The canonical variant: elapsed-time spin, clouds, and a directional light.
    pub fn earth() -> Self {
        Self {
            title: "Globe".to_string(),
            light: Some(DirectionalLight::default()),
            clouds: Some(CloudConfig::default()),
            spin: SpinMode::Elapsed { rate: 0.1 },
            stars: StarfieldConfig {
                count: 5000,
                scale_range: (0.5, 3.0),
                ..StarfieldConfig::default()
            },
            ..Self::classic()
        }
    }

    /// The simpler variant: fixed per-frame spin, no clouds, unlit.
    pub fn classic() -> Self {
        Self {
            title: "Globe (classic)".to_string(),
            width: 1280,
            height: 720,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_distance: 15.0,
            radius: 5.0,
            width_segments: 50,
            height_segments: 50,
            globe_texture: None,
            rim_strength: 1.0,
            atmosphere_scale: 1.1,
            atmosphere_color: Vec3::new(0.3, 0.6, 1.0),
            atmosphere_strength: 1.0,
            clouds: None,
            light: None,
            spin: SpinMode::PerFrame { delta: 0.003 },
            sensitivity: 0.5,
            ease_duration: 2.0,
            stars: StarfieldConfig::default(),
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn globe_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.globe_texture = Some(path.into());
        self
    }

    /// Sets the cloud texture, enabling the cloud layer if it was off.
    pub fn cloud_texture(mut self, path: impl Into<PathBuf>) -> Self {
        let clouds = self.clouds.get_or_insert_with(CloudConfig::default);
        clouds.texture = Some(path.into());
        self
    }

    pub fn without_clouds(mut self) -> Self {
        self.clouds = None;
        self
    }

    pub fn light(mut self, light: Option<DirectionalLight>) -> Self {
        self.light = light;
        self
    }

    pub fn spin(mut self, spin: SpinMode) -> Self {
        self.spin = spin;
        self
    }

    pub fn atmosphere_scale(mut self, scale: f32) -> Self {
        self.atmosphere_scale = scale;
        self
    }

    pub fn stars(mut self, stars: StarfieldConfig) -> Self {
        self.stars = stars;
        self
    }

    /// Cloud spin ratio, or `None` when the layer is disabled.
    pub fn cloud_ratio(&self) -> Option<f32> {
        self.clouds.as_ref().map(|c| c.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_matches_first_demo() {
        let config = GlobeConfig::classic();
        assert_eq!(config.fov_degrees, 75.0);
        assert_eq!(config.camera_distance, 15.0);
        assert_eq!(config.radius, 5.0);
        assert_eq!(config.atmosphere_scale, 1.1);
        assert_eq!(config.stars.count, 1000);
        assert!(config.clouds.is_none());
        assert!(config.light.is_none());
        assert!(matches!(config.spin, SpinMode::PerFrame { delta } if delta == 0.003));
    }

    #[test]
    fn default_is_earth() {
        let config = GlobeConfig::default();
        assert!(matches!(config.spin, SpinMode::Elapsed { .. }));
        assert_eq!(config.cloud_ratio(), Some(1.4));
        assert!(config.light.is_some());
    }

    #[test]
    fn cloud_texture_enables_layer() {
        let config = GlobeConfig::classic().cloud_texture("clouds.png");
        let clouds = config.clouds.expect("cloud layer should be enabled");
        assert_eq!(clouds.texture, Some(PathBuf::from("clouds.png")));
        assert_eq!(clouds.ratio, 1.4);
    }
}
