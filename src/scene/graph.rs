//! Transform hierarchy for the globe scene.
//!
//! Nodes live in a flat arena owned by [`SceneGraph`] and refer to their
//! children by [`NodeId`]. Only parent-to-child links exist, nodes are only
//! ever appended under an existing parent and never re-parented, so the graph
//! is a tree by construction.

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::material::Drawable;

/// Handle to a node inside a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Index of the node in its graph's arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Position, rotation, and uniform scale of a node relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local-to-parent matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.quat(), self.position)
    }
}

/// A transformable node with optional drawable content.
#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    children: Vec<NodeId>,
    drawable: Option<Drawable>,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }
}

/// A drawable with its resolved world matrix, as yielded by [`SceneGraph::drawables`].
#[derive(Clone, Copy, Debug)]
pub struct WorldDrawable<'a> {
    pub node: NodeId,
    pub world: Mat4,
    pub drawable: &'a Drawable,
}

/// Arena of scene nodes rooted at a single root.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph holding only an empty root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: "root".to_string(),
                transform: Transform::default(),
                children: Vec::new(),
                drawable: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists.
        false
    }

    /// Appends a new node under `parent` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this graph.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
        drawable: Option<Drawable>,
    ) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "parent {parent:?} is not in this graph");
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            transform,
            children: Vec::new(),
            drawable,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.nodes.get(id.0).map(|n| &n.transform)
    }

    /// The only mutable access into the graph. Drawables stay untouched.
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id.0).map(|n| &mut n.transform)
    }

    /// Finds the first node with the given name in traversal order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.visit(|id, node, _| {
            if found.is_none() && node.name == name {
                found = Some(id);
            }
        });
        found
    }

    /// World matrix of `id`: its ancestors' transforms composed with its own.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut result = None;
        self.visit(|visited, _, world| {
            if visited == id {
                result = Some(world);
            }
        });
        result
    }

    /// Depth-first traversal from the root, parents before children.
    ///
    /// The callback receives each node with its world matrix. Node borrows
    /// live as long as the graph borrow, so they may be collected.
    pub fn visit<'a>(&'a self, mut f: impl FnMut(NodeId, &'a Node, Mat4)) {
        let mut stack = vec![(self.root(), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent_world * node.transform.matrix();
            f(id, node, world);
            // Reverse so the first child is visited first.
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// Every drawable with its world matrix, in traversal order.
    pub fn drawables(&self) -> Vec<WorldDrawable<'_>> {
        let mut out = Vec::new();
        self.visit(|id, node, world| {
            if let Some(drawable) = node.drawable.as_ref() {
                out.push(WorldDrawable {
                    node: id,
                    world,
                    drawable,
                });
            }
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn world_matrix_composes_ancestors() {
        let mut graph = SceneGraph::new();
        let parent = graph.add_child(
            graph.root(),
            "parent",
            Transform::new().position(Vec3::new(1.0, 0.0, 0.0)).uniform_scale(2.0),
            None,
        );
        let child = graph.add_child(
            parent,
            "child",
            Transform::new().position(Vec3::new(0.0, 1.0, 0.0)),
            None,
        );

        let world = graph.world_matrix(child).unwrap();
        let origin = world * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.truncate() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn rotation_is_inherited() {
        let mut graph = SceneGraph::new();
        let group = graph.add_child(graph.root(), "group", Transform::new(), None);
        let child = graph.add_child(
            group,
            "child",
            Transform::new().position(Vec3::new(1.0, 0.0, 0.0)),
            None,
        );

        graph.transform_mut(group).unwrap().rotation.y = std::f32::consts::FRAC_PI_2;
        let p = graph.world_matrix(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn visit_is_depth_first_in_insertion_order() {
        let mut graph = SceneGraph::new();
        let a = graph.add_child(graph.root(), "a", Transform::new(), None);
        graph.add_child(a, "a1", Transform::new(), None);
        graph.add_child(graph.root(), "b", Transform::new(), None);

        let mut names = Vec::new();
        graph.visit(|_, node, _| names.push(node.name.clone()));
        assert_eq!(names, ["root", "a", "a1", "b"]);
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.find("a1"), Some(NodeId(2)));
        assert_eq!(graph.find("missing"), None);
    }

    #[test]
    fn drawables_outlive_traversal() {
        use crate::geometry::{Geometry, RawGeometry};
        use crate::scene::material::{Material, ProgramKind};

        let mut graph = SceneGraph::new();
        let group = graph.add_child(
            graph.root(),
            "group",
            Transform::new().position(Vec3::new(0.0, 0.0, -3.0)),
            None,
        );
        let sphere = Drawable::new(
            Geometry::Mesh(RawGeometry::sphere(1.0, 8, 6)),
            Material::new(ProgramKind::Surface),
        );
        let surface = graph.add_child(group, "surface", Transform::new(), Some(sphere));

        let mut visited: Vec<&Node> = Vec::new();
        graph.visit(|_, node, _| visited.push(node));
        assert_eq!(visited.len(), 3);
        assert_eq!(visited[2].name, "surface");

        let drawables = graph.drawables();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].node, surface);
        assert_eq!(drawables[0].drawable.material().program, ProgramKind::Surface);
        let origin = drawables[0].world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-6);
    }

    #[test]
    fn unknown_node_is_none() {
        let graph = SceneGraph::new();
        assert!(graph.node(NodeId(7)).is_none());
        assert!(graph.world_matrix(NodeId(7)).is_none());
        assert_eq!(graph.world_matrix(graph.root()), Some(Mat4::IDENTITY));
    }

    #[test]
    #[should_panic]
    fn foreign_parent_panics() {
        let mut graph = SceneGraph::new();
        graph.add_child(NodeId(3), "orphan", Transform::new(), None);
    }
}
