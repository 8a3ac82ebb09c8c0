//! Scene node access
//!
//! The model layer never owns geometry. It mutates named nodes of a scene
//! graph supplied by the caller through [`SceneNodes`].

use parking_lot::RwLock;
use robolink_core::Pose;
use std::collections::BTreeMap;

/// Named nodes of a device model that can be moved or actuated
pub trait SceneNodes: Send + Sync {
    /// Place a node at an absolute pose
    ///
    /// Returns `false` when the node does not exist.
    fn set_node_pose(&self, node: &str, pose: &Pose) -> bool;

    /// Apply an opaque tool action to a node
    ///
    /// Returns `false` when the node does not exist.
    fn apply_node_action(&self, node: &str, action: &str) -> bool;
}

/// Last known state of one node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeState {
    /// Absolute pose
    pub pose: Pose,
    /// Last applied action, if any
    pub action: Option<String>,
}

/// Node graph kept in memory
///
/// Stands in for a rendered scene: headless runs and tests read node poses
/// back from it.
#[derive(Debug, Default)]
pub struct InMemoryNodeGraph {
    nodes: RwLock<BTreeMap<String, NodeState>>,
}

impl InMemoryNodeGraph {
    /// Create a graph with the given node names, all at the default pose
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes = names
            .into_iter()
            .map(|n| (n.into(), NodeState::default()))
            .collect();
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Add a node, replacing any existing node of the same name
    pub fn insert_node(&self, name: impl Into<String>) {
        self.nodes.write().insert(name.into(), NodeState::default());
    }

    /// Node names in sorted order
    pub fn node_names(&self) -> Vec<String> {
        self.nodes.read().keys().cloned().collect()
    }

    /// Current state of a node
    pub fn node(&self, name: &str) -> Option<NodeState> {
        self.nodes.read().get(name).cloned()
    }

    /// Current pose of a node
    pub fn node_pose(&self, name: &str) -> Option<Pose> {
        self.nodes.read().get(name).map(|n| n.pose)
    }
}

impl SceneNodes for InMemoryNodeGraph {
    fn set_node_pose(&self, node: &str, pose: &Pose) -> bool {
        match self.nodes.write().get_mut(node) {
            Some(state) => {
                state.pose = *pose;
                true
            }
            None => {
                tracing::debug!("Unknown scene node {:?}", node);
                false
            }
        }
    }

    fn apply_node_action(&self, node: &str, action: &str) -> bool {
        match self.nodes.write().get_mut(node) {
            Some(state) => {
                state.action = Some(action.to_string());
                true
            }
            None => {
                tracing::debug!("Unknown scene node {:?}", node);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_nodes_are_ignored() {
        let graph = InMemoryNodeGraph::new(["base", "jaw"]);

        assert!(graph.set_node_pose("base", &Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)));
        assert!(!graph.set_node_pose("missing", &Pose::default()));
        assert!(graph.apply_node_action("jaw", "close"));

        assert_eq!(graph.node_pose("base").unwrap().x, 1.0);
        assert_eq!(graph.node("jaw").unwrap().action.as_deref(), Some("close"));
        assert_eq!(graph.node_names(), vec!["base", "jaw"]);
    }
}
