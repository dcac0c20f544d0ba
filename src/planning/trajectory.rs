// planning/trajectory.rs

// Trajectory index: the live (entry, target) pairs, each backed by a line in the
// active trajectory group. Keeps pairs unique, derives line geometry from the
// current point coordinates and reconciles display names with the line names.

use crate::scene::{NodeId, Role, SceneStore};
use crate::PlannerError;
use log::{debug, info, warn};
use nalgebra::Point3;
use std::fmt;

/// A trajectory is identified by the line node that draws it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrajectoryId(pub NodeId);

impl TrajectoryId {
    /// Line node drawing the trajectory
    pub fn line(self) -> NodeId {
        self.0
    }
}

impl fmt::Display for TrajectoryId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}", self.0)
    }
}

/// Display name state. A user edit latches `UserNamed` for good.
#[derive(Clone, Debug, PartialEq)]
pub enum TrajectoryName {
    /// Follows the line's generated name
    Unnamed,
    /// Set from the name cell; pushed onto the line
    UserNamed(String),
}

/// One entry/target pairing
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    /// Line handle
    pub id: TrajectoryId,
    /// Entry point handle
    pub entry: NodeId,
    /// Target point handle
    pub target: NodeId,
    /// Generated or user-given name
    pub name: TrajectoryName,
    /// Name currently shown in the table
    pub display_name: String,
    /// Line endpoints from the last geometry update, entry first
    pub endpoints: (Point3<f64>, Point3<f64>),
}

impl Trajectory {
    /// Endpoint handle for a role
    pub fn endpoint(&self, role: Role) -> NodeId {
        match role {
            Role::Entry => self.entry,
            Role::Target => self.target,
        }
    }

    /// Whether `point` is either endpoint
    pub fn references(&self, point: NodeId) -> bool {
        self.entry == point || self.target == point
    }
}

/// Scene group the trajectories are created in
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryGroup {
    /// Group handle
    pub id: NodeId,
    /// Group name, used in the table title
    pub name: String,
}

/// Live trajectories, in table order
#[derive(Default)]
pub struct TrajectoryIndex {
    group: Option<TrajectoryGroup>,
    trajectories: Vec<Trajectory>,
}

impl TrajectoryIndex {
    /// Empty index with no active group
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `group` the active trajectory group. Existing entries are kept.
    pub fn set_group(&mut self, group: Option<TrajectoryGroup>) {
        self.group = group;
    }

    /// Active trajectory group
    pub fn group(&self) -> Option<&TrajectoryGroup> {
        self.group.as_ref()
    }

    /// Number of live trajectories
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    /// Whether no trajectory is live
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Trajectories in table order
    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter()
    }

    /// Trajectory by line handle
    pub fn get(&self, id: TrajectoryId) -> Option<&Trajectory> {
        self.trajectories.iter().find(|t| t.id == id)
    }

    /// Row of a trajectory in the table
    pub fn position(&self, id: TrajectoryId) -> Option<usize> {
        self.trajectories.iter().position(|t| t.id == id)
    }

    /// Trajectory shown in `row`
    pub fn at(&self, row: usize) -> Option<&Trajectory> {
        self.trajectories.get(row)
    }

    /// Whether a live trajectory already joins these two points.
    /// Compares handles, never names.
    pub fn find_pair(&self, entry: NodeId, target: NodeId) -> bool {
        self.trajectories
            .iter()
            .any(|t| t.entry == entry && t.target == target)
    }

    /// Trajectories using `point` as either endpoint
    pub fn referencing(&self, point: NodeId) -> Vec<TrajectoryId> {
        self.trajectories
            .iter()
            .filter(|t| t.references(point))
            .map(|t| t.id)
            .collect()
    }

    /// Pairs two points with a new line in the active group
    pub fn add(
        &mut self,
        scene: &mut dyn SceneStore,
        entry: NodeId,
        target: NodeId,
    ) -> Result<TrajectoryId, PlannerError> {
        let group = self.group.as_ref().ok_or(PlannerError::NoActiveGroup)?.id;
        if self.find_pair(entry, target) {
            return Err(PlannerError::DuplicateTrajectory { entry, target });
        }
        // Both endpoints must resolve before anything is created
        scene.coordinates(entry)?;
        scene.coordinates(target)?;

        if scene.active_group() != Some(group) {
            scene.set_active_group(group)?;
        }
        let line = scene.create_line(group)?;
        let id = TrajectoryId(line);
        self.trajectories.push(Trajectory {
            id,
            entry,
            target,
            name: TrajectoryName::Unnamed,
            display_name: String::new(),
            endpoints: (Point3::origin(), Point3::origin()),
        });
        if let Err(e) = self.recompute_geometry(scene, id) {
            // Leave neither a cache entry nor a stray line behind
            self.trajectories.pop();
            if let Err(cleanup) = scene.delete_node(line) {
                warn!("Could not delete line {} of failed trajectory: {}", line, cleanup);
            }
            return Err(e);
        }
        info!("Added trajectory {} from {} to {}", id, entry, target);
        Ok(id)
    }

    /// Drops a trajectory and deletes its line from the scene
    pub fn remove(&mut self, scene: &mut dyn SceneStore, id: TrajectoryId) -> Result<Trajectory, PlannerError> {
        let trajectory = self.forget(id).ok_or(PlannerError::UnknownTrajectory(id))?;
        scene.delete_node(id.line())?;
        info!("Removed trajectory {}", id);
        Ok(trajectory)
    }

    /// Drops a trajectory whose line is already gone
    pub fn forget(&mut self, id: TrajectoryId) -> Option<Trajectory> {
        let row = self.position(id)?;
        Some(self.trajectories.remove(row))
    }

    /// Deletes every child of the active group and empties the index
    pub fn clear(&mut self, scene: &mut dyn SceneStore) -> Result<Vec<Trajectory>, PlannerError> {
        let group = self.group.as_ref().ok_or(PlannerError::NoActiveGroup)?.id;
        scene.remove_all_children(group)?;
        let cleared = std::mem::take(&mut self.trajectories);
        // Lines created under an earlier group are not children of this one
        for trajectory in &cleared {
            if scene.name(trajectory.id.line()).is_ok() {
                scene.delete_node(trajectory.id.line())?;
            }
        }
        info!("Cleared {} trajectories", cleared.len());
        Ok(cleared)
    }

    /// Empties the index without touching the scene
    pub fn reset(&mut self) {
        self.trajectories.clear();
        self.group = None;
    }

    /// Points one end of an existing trajectory at another point
    pub fn update_endpoint(
        &mut self,
        scene: &mut dyn SceneStore,
        id: TrajectoryId,
        role: Role,
        point: NodeId,
    ) -> Result<(), PlannerError> {
        let current = self.get(id).ok_or(PlannerError::UnknownTrajectory(id))?;
        let (entry, target) = match role {
            Role::Entry => (point, current.target),
            Role::Target => (current.entry, point),
        };
        self.repoint(scene, id, entry, target)
    }

    /// Moves both ends of a trajectory at once. The new pair must not belong
    /// to another live trajectory.
    pub fn repoint(
        &mut self,
        scene: &mut dyn SceneStore,
        id: TrajectoryId,
        entry: NodeId,
        target: NodeId,
    ) -> Result<(), PlannerError> {
        let row = self.position(id).ok_or(PlannerError::UnknownTrajectory(id))?;
        let current = &self.trajectories[row];
        if current.entry == entry && current.target == target {
            return Ok(());
        }
        if self.find_pair(entry, target) {
            return Err(PlannerError::DuplicateTrajectory { entry, target });
        }
        scene.coordinates(entry)?;
        scene.coordinates(target)?;

        let trajectory = &mut self.trajectories[row];
        let previous = (trajectory.entry, trajectory.target);
        trajectory.entry = entry;
        trajectory.target = target;
        if let Err(e) = self.recompute_geometry(scene, id) {
            let trajectory = &mut self.trajectories[row];
            (trajectory.entry, trajectory.target) = previous;
            return Err(e);
        }
        debug!("Trajectory {} now runs from {} to {}", id, entry, target);
        Ok(())
    }

    /// Writes the current endpoint coordinates onto the line and reconciles
    /// the display name with the line name.
    pub fn recompute_geometry(&mut self, scene: &mut dyn SceneStore, id: TrajectoryId) -> Result<(), PlannerError> {
        let row = self.position(id).ok_or(PlannerError::UnknownTrajectory(id))?;
        let trajectory = &mut self.trajectories[row];

        let resolve = |point: NodeId, scene: &dyn SceneStore| {
            scene
                .coordinates(point)
                .map_err(|_| PlannerError::DanglingReference { trajectory: id, point })
        };
        let entry = resolve(trajectory.entry, &*scene)?;
        let target = resolve(trajectory.target, &*scene)?;
        scene.set_line_endpoints(id.line(), entry, target)?;
        trajectory.endpoints = (entry, target);

        let line_name = scene.name(id.line())?;
        match &trajectory.name {
            TrajectoryName::Unnamed => trajectory.display_name = line_name,
            TrajectoryName::UserNamed(name) => {
                if *name != line_name {
                    scene.set_name(id.line(), name)?;
                }
                trajectory.display_name = name.clone();
            }
        }
        Ok(())
    }

    /// Applies a user edit of the name cell. Blank text is ignored.
    pub fn rename(&mut self, scene: &mut dyn SceneStore, id: TrajectoryId, name: &str) -> Result<(), PlannerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::EmptyName);
        }
        let row = self.position(id).ok_or(PlannerError::UnknownTrajectory(id))?;
        scene.set_name(id.line(), name)?;
        let trajectory = &mut self.trajectories[row];
        trajectory.name = TrajectoryName::UserNamed(name.to_string());
        trajectory.display_name = name.to_string();
        info!("Trajectory {} renamed to {:?}", id, name);
        Ok(())
    }
}
