//! Scene graph: CPU-side hierarchy of a loaded model.
//!
//! Nodes form a tree under a synthetic root Group. The root's local transform
//! is owned by the viewer (auto-framing); authored transforms live on the
//! children. Traversal is depth-first in child insertion order, which is the
//! asset's own node order.

use std::collections::HashMap;

use glam::Mat4;

use crate::math::Aabb;

use super::mesh::{Material, MaterialId, Mesh, MeshId, Primitive};
use super::node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};

/// A mesh instance found during traversal.
#[derive(Clone, Copy, Debug)]
pub struct MeshInstance {
    pub node: SceneNodeId,
    pub mesh: MeshId,
    /// Root-inclusive world transform
    pub world: Mat4,
}

/// CPU-side scene graph of one loaded model.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Allocate a fresh node ID.
    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        content: NodeContent,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, content);
        node.parent = Some(parent);

        self.nodes.insert(id, node);

        // Register as child of parent
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }

        id
    }

    /// Register a mesh and return its id.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Register a material and return its id.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Set the local transform of a node.
    pub fn set_transform(&mut self, id: SceneNodeId, transform: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform = transform;
        }
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Total number of nodes in the graph, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Depth-first walk from the root, handing each node its world matrix.
    fn walk(&self, mut visit: impl FnMut(&SceneNode, Mat4)) {
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else { continue };
            let world = parent_world * node.local_transform.to_mat4();
            visit(node, world);
            // Reverse so the first child is visited first
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// Recompute cached world transforms.
    pub fn propagate_transforms(&mut self) {
        let mut worlds = Vec::with_capacity(self.nodes.len());
        self.walk(|node, world| worlds.push((node.id, world)));
        for (id, world) in worlds {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.world_transform = world;
            }
        }
    }

    /// Mesh instances in traversal order.
    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let mut out = Vec::new();
        self.walk(|node, world| {
            if let Some(mesh) = node.mesh() {
                out.push(MeshInstance { node: node.id, mesh, world });
            }
        });
        out
    }

    /// Distinct materials referenced by the mesh graph, in first-use order.
    pub fn materials_in_use(&self) -> Vec<MaterialId> {
        let mut seen = Vec::new();
        for instance in self.mesh_instances() {
            let Some(mesh) = self.mesh(instance.mesh) else { continue };
            for primitive in &mesh.primitives {
                if !seen.contains(&primitive.material) {
                    seen.push(primitive.material);
                }
            }
        }
        seen
    }

    /// First primitive of the first mesh met in traversal order.
    pub fn first_primitive(&self) -> Option<(MeshInstance, &Primitive)> {
        self.mesh_instances().into_iter().find_map(|instance| {
            self.mesh(instance.mesh)
                .and_then(|mesh| mesh.primitives.first())
                .map(|primitive| (instance, primitive))
        })
    }

    /// World-space bounds of every vertex in the hierarchy.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut aabb = Aabb::empty();
        for instance in self.mesh_instances() {
            let Some(mesh) = self.mesh(instance.mesh) else { continue };
            for primitive in &mesh.primitives {
                for &p in &primitive.positions {
                    aabb.expand(instance.world.transform_point3(p));
                }
            }
        }
        (!aabb.is_empty()).then_some(aabb)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle(material: MaterialId, offset: Vec3) -> Primitive {
        Primitive::new(
            vec![offset, offset + Vec3::X, offset + Vec3::Y],
            None,
            None,
            None,
            material,
        )
    }

    #[test]
    fn test_new_graph_has_root() {
        let graph = SceneGraph::new();
        assert_eq!(graph.node_count(), 1);
        assert!(graph.get(graph.root()).is_some());
        assert!(graph.bounds().is_none());
    }

    #[test]
    fn test_add_child_links_parent() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a", NodeContent::Group);
        let b = graph.add_child(a, "b", NodeContent::Group);
        assert_eq!(graph.children(root).collect::<Vec<_>>(), vec![a]);
        assert_eq!(graph.get(b).unwrap().parent, Some(a));
    }

    #[test]
    fn test_traversal_is_depth_first_in_order() {
        let mut graph = SceneGraph::new();
        let m0 = graph.add_material(Material::untextured("m0"));
        let m1 = graph.add_material(Material::untextured("m1"));
        let mesh_a = graph.add_mesh(Mesh { name: "a".into(), primitives: vec![triangle(m1, Vec3::ZERO)] });
        let mesh_b = graph.add_mesh(Mesh { name: "b".into(), primitives: vec![triangle(m0, Vec3::ZERO)] });

        let root = graph.root();
        let group = graph.add_child(root, "group", NodeContent::Group);
        let deep = graph.add_child(group, "deep", NodeContent::Mesh(mesh_a));
        graph.add_child(root, "shallow", NodeContent::Mesh(mesh_b));

        let instances = graph.mesh_instances();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].node, deep);
        assert_eq!(graph.materials_in_use(), vec![m1, m0]);

        let (first, _) = graph.first_primitive().unwrap();
        assert_eq!(first.mesh, mesh_a);
    }

    #[test]
    fn test_bounds_include_transforms() {
        let mut graph = SceneGraph::new();
        let m = graph.add_material(Material::untextured("m"));
        let mesh = graph.add_mesh(Mesh { name: "tri".into(), primitives: vec![triangle(m, Vec3::ZERO)] });
        let root = graph.root();
        let node = graph.add_child(root, "tri", NodeContent::Mesh(mesh));
        graph.set_transform(node, LocalTransform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        graph.set_transform(root, LocalTransform { scale: Vec3::splat(2.0), ..Default::default() });

        let b = graph.bounds().unwrap();
        assert!((b.min - Vec3::new(20.0, 0.0, 0.0)).length() < 1e-5);
        assert!((b.max - Vec3::new(22.0, 2.0, 0.0)).length() < 1e-5);

        graph.propagate_transforms();
        let world = graph.get(node).unwrap().world_transform;
        assert!((world.transform_point3(Vec3::ZERO) - Vec3::new(20.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_first_primitive_skips_empty_meshes() {
        let mut graph = SceneGraph::new();
        let m = graph.add_material(Material::untextured("m"));
        let empty = graph.add_mesh(Mesh::default());
        let full = graph.add_mesh(Mesh { name: "full".into(), primitives: vec![triangle(m, Vec3::ZERO)] });
        let root = graph.root();
        graph.add_child(root, "empty", NodeContent::Mesh(empty));
        graph.add_child(root, "full", NodeContent::Mesh(full));

        let (instance, _) = graph.first_primitive().unwrap();
        assert_eq!(instance.mesh, full);
    }
}
