//! CPU-side geometry for the globe scene.
//!
//! Geometry is generated once at startup and uploaded to the GPU by
//! [`GpuMesh`](crate::mesh::GpuMesh). Two shapes are needed:
//!
//! - [`RawGeometry`]: indexed triangle meshes (the globe, cloud layer and atmosphere shell)
//! - [`PointCloud`]: per-point positions with a scale attribute (the starfield)
//!
//! # Example
//!
//! ```
//! use globe::{Geometry, RawGeometry};
//!
//! let sphere = RawGeometry::sphere(5.0, 50, 50);
//! assert_eq!(sphere.vertices.len(), 51 * 51);
//!
//! let geometry = Geometry::Mesh(sphere);
//! assert!(!geometry.is_empty());
//! ```

use crate::config::StarfieldConfig;
use crate::mesh::{StarPoint, Vertex3d};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Geometry attached to a drawable.
#[derive(Clone, Debug)]
pub enum Geometry {
    /// Indexed triangle list.
    Mesh(RawGeometry),
    /// Point sprites, one per [`StarPoint`].
    Points(PointCloud),
}

impl Geometry {
    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Mesh(mesh) => mesh.indices.is_empty(),
            Geometry::Points(points) => points.points.is_empty(),
        }
    }
}

/// Raw triangle geometry before GPU upload.
#[derive(Clone, Debug)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    /// Creates raw geometry from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Creates a UV sphere centered at the origin.
    ///
    /// Vertices are laid out ring by ring from the north pole (+Y) to the south
    /// pole, `width_segments + 1` per ring so the texture seam gets its own
    /// column. UVs are equirectangular with `v = 0` at the north pole, matching
    /// wgpu's top-left texture origin so a standard world map lands upright.
    ///
    /// Segment counts are clamped to at least 3 around and 2 pole to pole.
    ///
    /// # Geometry Details
    ///
    /// - **Vertices**: `(width_segments + 1) × (height_segments + 1)`
    /// - **Triangles**: `width_segments × height_segments × 2`
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);

        for ring in 0..=height_segments {
            let v = ring as f32 / height_segments as f32;
            let phi = std::f32::consts::PI * v;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=width_segments {
                let u = seg as f32 / width_segments as f32;
                let theta = 2.0 * std::f32::consts::PI * u;
                let x = -ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let position = [x * radius, y * radius, z * radius];
                let normal = [x, y, z];

                vertices.push(Vertex3d::new(position, normal, [u, v]));
            }
        }

        for ring in 0..height_segments {
            for seg in 0..width_segments {
                let current = ring * (width_segments + 1) + seg;
                let next = current + width_segments + 1;

                indices.push(current);
                indices.push(next);
                indices.push(current + 1);

                indices.push(current + 1);
                indices.push(next);
                indices.push(next + 1);
            }
        }

        Self::new(vertices, indices)
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns `(min, max)` corners of the bounding box.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }
}

/// A set of points rendered as additive sprites.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    pub points: Vec<StarPoint>,
}

impl PointCloud {
    pub fn new(points: Vec<StarPoint>) -> Self {
        Self { points }
    }

    /// Scatters `config.count` stars through a box in front of the camera.
    ///
    /// X and Y are uniform in `[-spread, spread)`, Z is uniform in
    /// `[-depth, 0)`, and each point's scale is drawn from `config.scale_range`.
    /// The same seed always yields the same field.
    pub fn starfield(config: &StarfieldConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let (min_scale, max_scale) = config.scale_range;
        let (min_scale, max_scale) = (min_scale.min(max_scale), min_scale.max(max_scale));

        let points = (0..config.count)
            .map(|_| {
                let x = (rng.random::<f32>() - 0.5) * 2.0 * config.spread;
                let y = (rng.random::<f32>() - 0.5) * 2.0 * config.spread;
                let z = -rng.random::<f32>() * config.depth;
                let scale = rng.random_range(min_scale..=max_scale);
                StarPoint::new([x, y, z], scale)
            })
            .collect();

        Self { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_counts() {
        let sphere = RawGeometry::sphere(5.0, 50, 50);
        assert_eq!(sphere.vertices.len(), 51 * 51);
        assert_eq!(sphere.indices.len(), 50 * 50 * 6);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = RawGeometry::sphere(5.0, 16, 8);
        for v in &sphere.vertices {
            let p = Vec3::from(v.position);
            assert!((p.length() - 5.0).abs() < 1e-4);
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }

        let (min, max) = sphere.bounds();
        assert!((max.y - 5.0).abs() < 1e-4);
        assert!((min.y + 5.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_uv_north_pole_is_top() {
        let sphere = RawGeometry::sphere(1.0, 8, 4);
        let first = sphere.vertices[0];
        assert!((first.position[1] - 1.0).abs() < 1e-6);
        assert_eq!(first.uv[1], 0.0);

        let last = sphere.vertices[sphere.vertices.len() - 1];
        assert!((last.position[1] + 1.0).abs() < 1e-6);
        assert_eq!(last.uv[1], 1.0);
    }

    #[test]
    fn degenerate_segments_are_clamped() {
        let sphere = RawGeometry::sphere(1.0, 0, 0);
        assert_eq!(sphere.vertices.len(), 4 * 3);
        assert!(!Geometry::Mesh(sphere).is_empty());
    }

    #[test]
    fn starfield_respects_bounds() {
        let config = StarfieldConfig {
            count: 500,
            spread: 1000.0,
            depth: 1500.0,
            scale_range: (0.5, 2.0),
            ..StarfieldConfig::default()
        };
        let field = PointCloud::starfield(&config);
        assert_eq!(field.points.len(), 500);

        for star in &field.points {
            let [x, y, z] = star.position;
            assert!((-1000.0..1000.0).contains(&x));
            assert!((-1000.0..1000.0).contains(&y));
            assert!(z <= 0.0 && z > -1500.0);
            assert!((0.5..=2.0).contains(&star.scale));
        }
    }

    #[test]
    fn starfield_is_reproducible() {
        let config = StarfieldConfig::default();
        let a = PointCloud::starfield(&config);
        let b = PointCloud::starfield(&config);
        assert_eq!(a.points.len(), b.points.len());
        for (pa, pb) in a.points.iter().zip(&b.points) {
            assert_eq!(pa.position, pb.position);
            assert_eq!(pa.scale, pb.scale);
        }

        let other = PointCloud::starfield(&StarfieldConfig {
            seed: config.seed + 1,
            ..config
        });
        assert_ne!(a.points[0].position, other.points[0].position);
    }

    #[test]
    fn empty_starfield() {
        let field = PointCloud::starfield(&StarfieldConfig {
            count: 0,
            ..StarfieldConfig::default()
        });
        assert!(Geometry::Points(field).is_empty());
    }
}
