// scene/memory.rs

// In-memory scene used by the demo binary and the tests. Behaves like the host
// document: groups own ordered children, points land in the active group, lines
// get generated names, and every observable change is queued as a SceneEvent.

use super::{Color, NodeId, Role, SceneEvent, SceneStore};
use crate::PlannerError;
use log::debug;
use nalgebra::Point3;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum NodeKind {
    Point {
        role: Role,
        position: Point3<f64>,
        opacity: f64,
        color: Color,
    },
    Line {
        first: Point3<f64>,
        second: Point3<f64>,
    },
    Group {
        children: Vec<NodeId>,
    },
}

#[derive(Clone, Debug)]
struct SceneNode {
    name: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// Scene store kept entirely in memory
#[derive(Default)]
pub struct InMemoryScene {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    line_counter: u64,
    active_group: Option<NodeId>,
    events: Vec<SceneEvent>,
}

impl InMemoryScene {
    /// Empty scene with no groups
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the handle still resolves
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Children of a group, in insertion order
    pub fn children(&self, group: NodeId) -> Vec<NodeId> {
        match self.nodes.get(&group).map(|n| &n.kind) {
            Some(NodeKind::Group { children }) => children.clone(),
            _ => Vec::new(),
        }
    }

    /// Group holding a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    /// Role of a point
    pub fn role(&self, point: NodeId) -> Option<Role> {
        match self.nodes.get(&point).map(|n| &n.kind) {
            Some(NodeKind::Point { role, .. }) => Some(*role),
            _ => None,
        }
    }

    /// Current opacity of a point
    pub fn opacity(&self, point: NodeId) -> Option<f64> {
        match self.nodes.get(&point).map(|n| &n.kind) {
            Some(NodeKind::Point { opacity, .. }) => Some(*opacity),
            _ => None,
        }
    }

    /// Current color of a point
    pub fn color(&self, point: NodeId) -> Option<Color> {
        match self.nodes.get(&point).map(|n| &n.kind) {
            Some(NodeKind::Point { color, .. }) => Some(*color),
            _ => None,
        }
    }

    /// Both endpoints of a line, entry first
    pub fn line_endpoints(&self, line: NodeId) -> Option<(Point3<f64>, Point3<f64>)> {
        match self.nodes.get(&line).map(|n| &n.kind) {
            Some(NodeKind::Line { first, second }) => Some((*first, *second)),
            _ => None,
        }
    }

    /// Number of lines currently in the scene
    pub fn line_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| matches!(n.kind, NodeKind::Line { .. }))
            .count()
    }

    /// Creates a point directly under `group`, as another module or a file load would
    pub fn insert_point(
        &mut self,
        group: NodeId,
        role: Role,
        name: &str,
        position: Point3<f64>,
    ) -> Result<NodeId, PlannerError> {
        self.group_children_mut(group)?;
        let id = self.insert(name, Some(group), NodeKind::Point {
            role,
            position,
            opacity: 1.0,
            color: Color::new(1.0, 1.0, 1.0),
        });
        Ok(id)
    }

    fn insert(&mut self, name: &str, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(id, SceneNode { name: name.to_string(), parent, kind });
        if let Some(group) = parent {
            if let Ok(children) = self.group_children_mut(group) {
                children.push(id);
            }
            self.events.push(SceneEvent::ChildAdded { group, child: id });
        }
        id
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut SceneNode, PlannerError> {
        self.nodes.get_mut(&node).ok_or(PlannerError::UnknownNode(node))
    }

    fn group_children_mut(&mut self, group: NodeId) -> Result<&mut Vec<NodeId>, PlannerError> {
        match self.nodes.get_mut(&group).map(|n| &mut n.kind) {
            Some(NodeKind::Group { children }) => Ok(children),
            _ => Err(PlannerError::UnknownNode(group)),
        }
    }
}

impl SceneStore for InMemoryScene {
    fn create_point(&mut self, role: Role) -> Result<NodeId, PlannerError> {
        let parent = self.active_group;
        let id = self.insert("", parent, NodeKind::Point {
            role,
            position: Point3::origin(),
            opacity: 1.0,
            color: Color::new(1.0, 1.0, 1.0),
        });
        debug!("Created {} point {} in group {:?}", role, id, parent);
        Ok(id)
    }

    fn delete_node(&mut self, node: NodeId) -> Result<(), PlannerError> {
        let removed = self.nodes.remove(&node).ok_or(PlannerError::UnknownNode(node))?;
        if let Some(group) = removed.parent {
            if let Ok(children) = self.group_children_mut(group) {
                children.retain(|c| *c != node);
            }
            self.events.push(SceneEvent::ChildRemoved { group, child: node });
        }
        if self.active_group == Some(node) {
            self.active_group = None;
        }
        self.events.push(SceneEvent::NodeRemoved(node));
        if let NodeKind::Group { children } = removed.kind {
            for child in children {
                if let Some(orphan) = self.nodes.get_mut(&child) {
                    orphan.parent = None;
                }
                self.delete_node(child)?;
            }
        }
        Ok(())
    }

    fn coordinates(&self, point: NodeId) -> Result<Point3<f64>, PlannerError> {
        match self.nodes.get(&point).map(|n| &n.kind) {
            Some(NodeKind::Point { position, .. }) => Ok(*position),
            _ => Err(PlannerError::UnknownNode(point)),
        }
    }

    fn set_coordinates(&mut self, point: NodeId, new_position: Point3<f64>) -> Result<(), PlannerError> {
        let changed = match &mut self.node_mut(point)?.kind {
            NodeKind::Point { position, .. } => {
                let changed = *position != new_position;
                *position = new_position;
                changed
            }
            _ => return Err(PlannerError::UnknownNode(point)),
        };
        if changed {
            self.events.push(SceneEvent::NodeModified(point));
        }
        Ok(())
    }

    fn name(&self, node: NodeId) -> Result<String, PlannerError> {
        self.nodes
            .get(&node)
            .map(|n| n.name.clone())
            .ok_or(PlannerError::UnknownNode(node))
    }

    fn set_name(&mut self, node: NodeId, name: &str) -> Result<(), PlannerError> {
        let entry = self.node_mut(node)?;
        if entry.name != name {
            entry.name = name.to_string();
            self.events.push(SceneEvent::NodeModified(node));
        }
        Ok(())
    }

    fn set_opacity(&mut self, point: NodeId, value: f64) -> Result<(), PlannerError> {
        match &mut self.node_mut(point)?.kind {
            NodeKind::Point { opacity, .. } => {
                *opacity = value;
                Ok(())
            }
            _ => Err(PlannerError::UnknownNode(point)),
        }
    }

    fn set_color(&mut self, point: NodeId, value: Color) -> Result<(), PlannerError> {
        match &mut self.node_mut(point)?.kind {
            NodeKind::Point { color, .. } => {
                *color = value;
                Ok(())
            }
            _ => Err(PlannerError::UnknownNode(point)),
        }
    }

    fn create_group(&mut self, name: &str) -> NodeId {
        let id = self.insert(name, None, NodeKind::Group { children: Vec::new() });
        debug!("Created group {} ({})", id, name);
        id
    }

    fn set_active_group(&mut self, group: NodeId) -> Result<(), PlannerError> {
        self.group_children_mut(group)?;
        self.active_group = Some(group);
        Ok(())
    }

    fn active_group(&self) -> Option<NodeId> {
        self.active_group
    }

    fn child_count(&self, group: NodeId) -> Result<usize, PlannerError> {
        match self.nodes.get(&group).map(|n| &n.kind) {
            Some(NodeKind::Group { children }) => Ok(children.len()),
            _ => Err(PlannerError::UnknownNode(group)),
        }
    }

    fn nth_child(&self, group: NodeId, index: usize) -> Result<NodeId, PlannerError> {
        match self.nodes.get(&group).map(|n| &n.kind) {
            Some(NodeKind::Group { children }) => {
                children.get(index).copied().ok_or(PlannerError::UnknownRow)
            }
            _ => Err(PlannerError::UnknownNode(group)),
        }
    }

    fn remove_all_children(&mut self, group: NodeId) -> Result<(), PlannerError> {
        let children = self.group_children_mut(group)?.clone();
        for child in children {
            self.delete_node(child)?;
        }
        Ok(())
    }

    fn create_line(&mut self, group: NodeId) -> Result<NodeId, PlannerError> {
        self.group_children_mut(group)?;
        self.line_counter += 1;
        let name = format!("Ruler {}", self.line_counter);
        let origin = Point3::origin();
        Ok(self.insert(&name, Some(group), NodeKind::Line { first: origin, second: origin }))
    }

    fn set_line_endpoints(
        &mut self,
        line: NodeId,
        new_first: Point3<f64>,
        new_second: Point3<f64>,
    ) -> Result<(), PlannerError> {
        let changed = match &mut self.node_mut(line)?.kind {
            NodeKind::Line { first, second } => {
                let changed = *first != new_first || *second != new_second;
                *first = new_first;
                *second = new_second;
                changed
            }
            _ => return Err(PlannerError::UnknownNode(line)),
        };
        if changed {
            self.events.push(SceneEvent::NodeModified(line));
        }
        Ok(())
    }

    fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}
