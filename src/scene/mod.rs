// scene/mod.rs

// Scene collaborator boundary. The scene owns every point, line and group; the
// planner only holds handles into it and learns about changes through queued
// notifications.

/// In-memory scene for the runner and the tests
pub mod memory;

pub use memory::InMemoryScene;

use crate::PlannerError;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable handle to a node owned by the scene
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which end of a trajectory a point stands for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Where the trajectory enters
    Entry,
    /// What the trajectory aims at
    Target,
}

impl Role {
    /// Label shown in the role column and used for generated names
    pub fn label(self) -> &'static str {
        match self {
            Role::Entry => "Entry",
            Role::Target => "Target",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// RGB display color, components in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
}

impl Color {
    /// Color from RGB components in 0..=1
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }
}

/// Change notifications queued by the scene
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEvent {
    /// A node was added under a group
    ChildAdded {
        /// Parent group
        group: NodeId,
        /// New child
        child: NodeId,
    },
    /// A node was removed from a group
    ChildRemoved {
        /// Former parent group
        group: NodeId,
        /// Removed child
        child: NodeId,
    },
    /// Name, coordinates or line endpoints of a node changed
    NodeModified(NodeId),
    /// A node left the scene
    NodeRemoved(NodeId),
}

/// The document/scene store the planner works against.
///
/// Every operation on a stale handle fails with `PlannerError::UnknownNode`.
#[cfg_attr(test, mockall::automock)]
pub trait SceneStore {
    /// Creates a point of the given role inside the active group
    fn create_point(&mut self, role: Role) -> Result<NodeId, PlannerError>;
    /// Deletes a point or line and detaches it from its group
    fn delete_node(&mut self, node: NodeId) -> Result<(), PlannerError>;
    /// Position of a point
    fn coordinates(&self, point: NodeId) -> Result<Point3<f64>, PlannerError>;
    /// Moves a point
    fn set_coordinates(&mut self, point: NodeId, position: Point3<f64>) -> Result<(), PlannerError>;
    /// Name of any node
    fn name(&self, node: NodeId) -> Result<String, PlannerError>;
    /// Renames any node
    fn set_name(&mut self, node: NodeId, name: &str) -> Result<(), PlannerError>;
    /// Display opacity of a point
    fn set_opacity(&mut self, point: NodeId, opacity: f64) -> Result<(), PlannerError>;
    /// Display color of a point
    fn set_color(&mut self, point: NodeId, color: Color) -> Result<(), PlannerError>;

    /// Creates an empty, named group
    fn create_group(&mut self, name: &str) -> NodeId;
    /// Group that receives newly created points and lines
    fn set_active_group(&mut self, group: NodeId) -> Result<(), PlannerError>;
    /// Current active group, if any
    fn active_group(&self) -> Option<NodeId>;
    /// Number of children of a group
    fn child_count(&self, group: NodeId) -> Result<usize, PlannerError>;
    /// Child of a group by position
    fn nth_child(&self, group: NodeId, index: usize) -> Result<NodeId, PlannerError>;
    /// Deletes every child of a group
    fn remove_all_children(&mut self, group: NodeId) -> Result<(), PlannerError>;

    /// Creates a line (ruler) inside the group, with a scene-generated name
    fn create_line(&mut self, group: NodeId) -> Result<NodeId, PlannerError>;
    /// Position 1 is the entry, position 2 the target
    fn set_line_endpoints(
        &mut self,
        line: NodeId,
        first: Point3<f64>,
        second: Point3<f64>,
    ) -> Result<(), PlannerError>;

    /// Drains the pending change notifications, oldest first
    fn take_events(&mut self) -> Vec<SceneEvent>;
}
