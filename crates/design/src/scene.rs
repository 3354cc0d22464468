use keycase_tessellation::FlatMesh;
use serde::{Deserialize, Serialize};

/// A node of the exported scene tree: a mesh or a nested list of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SceneNode {
    Mesh(FlatMesh),
    Group(Vec<SceneNode>),
}

impl SceneNode {
    /// Reflect the whole subtree across the YZ plane.
    pub fn mirrored_x(&self) -> SceneNode {
        match self {
            SceneNode::Mesh(mesh) => SceneNode::Mesh(mesh.mirrored_x()),
            SceneNode::Group(children) => SceneNode::Group(children.iter().map(SceneNode::mirrored_x).collect()),
        }
    }

    /// Depth-first walk over the meshes in this subtree.
    pub fn meshes(&self) -> Box<dyn Iterator<Item = &FlatMesh> + '_> {
        match self {
            SceneNode::Mesh(mesh) => Box::new(std::iter::once(mesh)),
            SceneNode::Group(children) => Box::new(children.iter().flat_map(SceneNode::meshes)),
        }
    }

    /// All meshes of the subtree concatenated into one buffer.
    pub fn flatten(&self) -> FlatMesh {
        let mut out = FlatMesh::new();
        for mesh in self.meshes() {
            out.merge(mesh);
        }
        out
    }
}

impl From<FlatMesh> for SceneNode {
    fn from(mesh: FlatMesh) -> Self {
        SceneNode::Mesh(mesh)
    }
}

impl From<Vec<SceneNode>> for SceneNode {
    fn from(children: Vec<SceneNode>) -> Self {
        SceneNode::Group(children)
    }
}

/// Accumulates the objects a design produces.
///
/// Debug objects are only kept when the scene was created with debugging
/// enabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    debug: bool,
    nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new(debug: bool) -> Self {
        Self { debug, nodes: Vec::new() }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    pub fn add_object(&mut self, object: impl Into<SceneNode>) {
        self.nodes.push(object.into());
    }

    /// Returns whether the object was kept.
    pub fn add_debug_object(&mut self, object: impl Into<SceneNode>) -> bool {
        if self.debug {
            self.add_object(object);
        }
        self.debug
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_tree(self) -> SceneNode {
        SceneNode::Group(self.nodes)
    }
}
