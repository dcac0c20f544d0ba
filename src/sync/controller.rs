// sync/controller.rs

// The event-driven core of the panel. Table events and scene notifications both
// end up here; each handler runs to completion, then the scene's queued
// notifications are drained so that changes made by the handler come back
// through the same path as changes made by anyone else.

use super::display::{DisplayAdapter, RowView};
use super::subscriptions::Subscriptions;
use crate::planning::{PointRegistry, RowHandle, TrajectoryGroup, TrajectoryId, TrajectoryIndex};
use crate::scene::{NodeId, Role, SceneEvent, SceneStore};
use crate::table::{point_columns, trajectory_columns, Button, GridView, TableEvent, TableId};
use crate::{PlannerConfig, PlannerError};
use log::{debug, info, warn};

const ROLES: [Role; 2] = [Role::Entry, Role::Target];

/// Binds the grid and the scene together through the planning caches
pub struct SyncController<S: SceneStore, G: GridView> {
    scene: S,
    grid: G,
    config: PlannerConfig,
    registry: PointRegistry,
    index: TrajectoryIndex,
    subscriptions: Subscriptions,
    display: DisplayAdapter,
    entry_group: Option<NodeId>,
    target_group: Option<NodeId>,
    selected_trajectory: Option<TrajectoryId>,
}

impl<S: SceneStore, G: GridView> SyncController<S, G> {
    /// Creates a controller over an injected scene and grid. Call
    /// `on_scene_attached` (or `attach_scene`) before feeding it events.
    pub fn new(scene: S, grid: G, config: PlannerConfig) -> Self {
        SyncController {
            registry: PointRegistry::new(config.style.clone()),
            display: DisplayAdapter::new(&config.table),
            index: TrajectoryIndex::new(),
            subscriptions: Subscriptions::new(),
            scene,
            grid,
            config,
            entry_group: None,
            target_group: None,
            selected_trajectory: None,
        }
    }

    /// Scene the controller works against
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Direct access for hosts that edit the scene themselves; follow with `pump_scene_events`
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Grid the controller writes to
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Grid access for hosts that feed user input
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    /// Cached point rows
    pub fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    /// Live trajectories
    pub fn index(&self) -> &TrajectoryIndex {
        &self.index
    }

    /// Point to trajectory subscriptions
    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Active configuration
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Group whose children fill the table of `role`
    pub fn point_group(&self, role: Role) -> Option<NodeId> {
        match role {
            Role::Entry => self.entry_group,
            Role::Target => self.target_group,
        }
    }

    /// Trajectory last picked in the trajectory table
    pub fn selected_trajectory(&self) -> Option<TrajectoryId> {
        self.selected_trajectory
    }

    /// Point behind the current row of a point table
    pub fn selected_point(&self, role: Role) -> Option<NodeId> {
        self.grid
            .current_row(TableId::for_role(role))
            .and_then(|row| self.registry.get(RowHandle::new(role, row)))
            .map(|row| row.point)
    }

    /// Swaps in a new document and starts a fresh session on it
    pub fn attach_scene(&mut self, scene: S) -> Result<(), PlannerError> {
        self.scene = scene;
        self.on_scene_attached()
    }

    /// Resets every cache and creates empty entry, target and trajectory groups
    pub fn on_scene_attached(&mut self) -> Result<(), PlannerError> {
        self.registry.clear(Role::Entry);
        self.registry.clear(Role::Target);
        self.index.reset();
        self.subscriptions.clear();
        self.entry_group = None;
        self.target_group = None;
        self.selected_trajectory = None;
        for table in [TableId::Entry, TableId::Target, TableId::Trajectory] {
            self.grid.clear(table);
        }
        // Notifications from the previous session are stale
        self.scene.take_events();

        let entry = self.scene.create_group(&self.config.groups.entry);
        let target = self.scene.create_group(&self.config.groups.target);
        let trajectory = self.scene.create_group(&self.config.groups.trajectory);
        self.select_point_group(Role::Entry, entry)?;
        self.select_point_group(Role::Target, target)?;
        self.select_trajectory_group(trajectory)?;
        self.pump_scene_events();

        info!("Planning session started (entry {}, target {}, trajectories {})", entry, target, trajectory);
        Ok(())
    }

    /// Points the table of `role` at an existing scene group and fills it
    pub fn select_point_group(&mut self, role: Role, group: NodeId) -> Result<(), PlannerError> {
        self.scene.child_count(group)?;
        let name = self.scene.name(group)?;
        match role {
            Role::Entry => self.entry_group = Some(group),
            Role::Target => self.target_group = Some(group),
        }
        self.display.set_title(&mut self.grid, TableId::for_role(role), &name);
        debug!("{} table now follows group {} ({})", role, group, name);
        self.rebuild_points(role)
    }

    /// Makes `group` the active trajectory group. Existing trajectories stay listed.
    pub fn select_trajectory_group(&mut self, group: NodeId) -> Result<(), PlannerError> {
        self.scene.child_count(group)?;
        let name = self.scene.name(group)?;
        self.display.set_title(&mut self.grid, TableId::Trajectory, &name);
        self.index.set_group(Some(TrajectoryGroup { id: group, name }));
        self.refresh_update_action();
        Ok(())
    }

    /// Entry point for grid events. Failures are logged and otherwise ignored.
    pub fn handle_table_event(&mut self, event: TableEvent) {
        if let Err(e) = self.dispatch(event) {
            absorb(&format!("{:?}", event), &e);
        }
    }

    /// Runs the handler for `event`, drains scene notifications and reports
    /// the handler's outcome.
    pub fn dispatch(&mut self, event: TableEvent) -> Result<(), PlannerError> {
        let result = self.route(event);
        self.pump_scene_events();
        result
    }

    fn route(&mut self, event: TableEvent) -> Result<(), PlannerError> {
        match event {
            TableEvent::CellChanged { table, row, column } => match table.role() {
                Some(role) => self.on_point_cell_changed(role, row, column),
                None => self.on_trajectory_cell_changed(row, column),
            },
            TableEvent::CellClicked { table: TableId::Trajectory, row, .. } => self.on_trajectory_cell_clicked(row),
            TableEvent::CellClicked { .. } => Ok(()),
            TableEvent::SelectionChanged(table) => match table.role() {
                Some(role) => self.on_point_selection_changed(role),
                None => self.on_trajectory_selection_changed(),
            },
            TableEvent::ButtonActivated { table, button } => match (table.role(), button) {
                (Some(role), Button::Add) => self.add_point(role),
                (Some(role), Button::Delete) => self.delete_point(role),
                (Some(role), Button::Clear) => self.clear_points(role),
                (Some(_), Button::Update) => Ok(()),
                (None, Button::Add) => self.add_trajectory(),
                (None, Button::Delete) => self.delete_trajectory(),
                (None, Button::Update) => self.update_trajectory(),
                (None, Button::Clear) => self.clear_trajectories(),
            },
        }
    }

    /// Feeds queued scene notifications back into the controller until none are left
    pub fn pump_scene_events(&mut self) {
        let max_rounds = self.config.table.max_event_rounds;
        for round in 0usize.. {
            let events = self.scene.take_events();
            if events.is_empty() {
                return;
            }
            if round >= max_rounds {
                warn!("Dropping {} scene notifications after {} rounds", events.len(), max_rounds);
                return;
            }
            for event in events {
                if let Err(e) = self.handle_scene_event(event) {
                    absorb(&format!("{:?}", event), &e);
                }
            }
        }
    }

    /// Applies one scene notification to the caches and the grid
    pub fn handle_scene_event(&mut self, event: SceneEvent) -> Result<(), PlannerError> {
        match event {
            SceneEvent::ChildAdded { group, .. } | SceneEvent::ChildRemoved { group, .. } => {
                match self.role_of_group(group) {
                    Some(role) => self.rebuild_points(role),
                    None => Ok(()),
                }
            }
            SceneEvent::NodeRemoved(node) => self.on_node_removed(node),
            SceneEvent::NodeModified(node) => self.on_node_modified(node),
        }
    }

    fn role_of_group(&self, group: NodeId) -> Option<Role> {
        ROLES.into_iter().find(|role| self.point_group(*role) == Some(group))
    }

    /// Clears the table of `role` and fills it again from its group's children
    fn rebuild_points(&mut self, role: Role) -> Result<(), PlannerError> {
        let Some(group) = self.point_group(role) else {
            return Ok(());
        };
        let table = TableId::for_role(role);
        let selected = self.selected_point(role);

        self.registry.clear(role);
        let count = self.scene.child_count(group)?;
        for index in 0..count {
            let child = self.scene.nth_child(group, index)?;
            // Only children with coordinates are points
            if self.scene.coordinates(child).is_err() {
                continue;
            }
            if let Err(e) = self.registry.add(&mut self.scene, role, Some(child)) {
                warn!("Skipping {} point {}: {}", role, child, e);
            }
        }
        self.display.render_points(&mut self.grid, &self.scene, &self.registry, role);

        if let Some(handle) = selected.and_then(|point| self.registry.find(point)) {
            self.grid.select_row(table, Some(handle.row));
            self.registry.selection_changed(&mut self.scene, handle)?;
        }
        self.refresh_update_action();
        debug!("Rebuilt {} table: {} rows", role, self.registry.len(role));
        Ok(())
    }

    fn on_node_removed(&mut self, node: NodeId) -> Result<(), PlannerError> {
        let as_trajectory = TrajectoryId(node);
        if let Some(row) = self.index.position(as_trajectory) {
            self.index.forget(as_trajectory);
            self.drop_trajectory_row(as_trajectory, row);
            info!("Line {} left the scene; trajectory dropped", node);
        }

        // Deleting a point deletes every trajectory built on it
        for id in self.index.referencing(node) {
            info!("Point {} removed; deleting trajectory {}", node, id);
            if let Err(e) = self.remove_trajectory(id) {
                warn!("Cascade removal of {} incomplete: {}", id, e);
            }
        }

        if let Some(role) = self.role_of_group(node) {
            match role {
                Role::Entry => self.entry_group = None,
                Role::Target => self.target_group = None,
            }
            self.registry.clear(role);
            self.grid.clear(TableId::for_role(role));
        }
        if self.index.group().is_some_and(|g| g.id == node) {
            self.index.set_group(None);
        }
        Ok(())
    }

    fn on_node_modified(&mut self, node: NodeId) -> Result<(), PlannerError> {
        if let Some(handle) = self.registry.refresh(&self.scene, node)? {
            self.render_point(handle);
        }
        for id in self.subscriptions.subscribers(node) {
            self.recompute(id)?;
        }
        let as_trajectory = TrajectoryId(node);
        if self.index.get(as_trajectory).is_some() {
            self.recompute(as_trajectory)?;
        }
        Ok(())
    }

    /// Re-derives a trajectory and redraws its row; trajectories whose
    /// endpoints no longer resolve are removed.
    fn recompute(&mut self, id: TrajectoryId) -> Result<(), PlannerError> {
        match self.index.recompute_geometry(&mut self.scene, id) {
            Ok(()) => {
                self.render_trajectory(id);
                Ok(())
            }
            Err(PlannerError::DanglingReference { point, .. }) => {
                warn!("Trajectory {} lost point {}; removing it", id, point);
                self.remove_trajectory(id)
            }
            Err(e) => {
                self.render_trajectory(id);
                Err(e)
            }
        }
    }

    fn render_trajectory(&mut self, id: TrajectoryId) {
        let Some(row) = self.index.position(id) else {
            return;
        };
        if let Some(trajectory) = self.index.get(id) {
            let view = RowView::of_trajectory(&self.scene, &self.registry, trajectory);
            self.display.write_row(&mut self.grid, TableId::Trajectory, row, &view);
        }
    }

    fn render_point(&mut self, handle: RowHandle) {
        if let Some(row) = self.registry.get(handle) {
            let view = RowView::of_point(&self.scene, row);
            self.display
                .write_row(&mut self.grid, TableId::for_role(handle.role), handle.row, &view);
        }
    }

    // Point tables

    fn add_point(&mut self, role: Role) -> Result<(), PlannerError> {
        let group = self.point_group(role).ok_or(PlannerError::NoActiveGroup)?;
        if self.scene.active_group() != Some(group) {
            self.scene.set_active_group(group)?;
        }
        let point = self.scene.create_point(role)?;
        info!("Placed new {} point {}", role, point);
        Ok(())
    }

    fn delete_point(&mut self, role: Role) -> Result<(), PlannerError> {
        let table = TableId::for_role(role);
        let row = self.grid.current_row(table).ok_or(PlannerError::NoSelection(table))?;
        let removed = self.registry.remove(RowHandle::new(role, row))?;
        self.display.remove_row(&mut self.grid, table, row);
        self.scene.delete_node(removed.point)?;
        info!("Deleted {} point {} ({})", role, removed.point, removed.name);
        Ok(())
    }

    fn clear_points(&mut self, role: Role) -> Result<(), PlannerError> {
        let group = self.point_group(role).ok_or(PlannerError::NoActiveGroup)?;
        self.scene.remove_all_children(group)?;
        self.registry.clear(role);
        self.grid.clear(TableId::for_role(role));
        self.refresh_update_action();
        info!("Cleared {} points", role);
        Ok(())
    }

    fn on_point_selection_changed(&mut self, role: Role) -> Result<(), PlannerError> {
        let table = TableId::for_role(role);
        let row = self.grid.current_row(table).ok_or(PlannerError::NoSelection(table))?;
        self.registry.selection_changed(&mut self.scene, RowHandle::new(role, row))?;
        self.refresh_update_action();
        Ok(())
    }

    fn on_point_cell_changed(&mut self, role: Role, row: usize, column: usize) -> Result<(), PlannerError> {
        let table = TableId::for_role(role);
        let handle = RowHandle::new(role, row);
        let result = match column {
            point_columns::NAME => {
                let text = self.grid.cell_text(table, row, column).unwrap_or_default();
                self.registry.rename(&mut self.scene, handle, &text)
            }
            point_columns::X | point_columns::Y | point_columns::Z => {
                let cell = |column| self.grid.cell_text(table, row, column).unwrap_or_default();
                let (x, y, z) = (cell(point_columns::X), cell(point_columns::Y), cell(point_columns::Z));
                self.registry
                    .set_coordinates(&mut self.scene, handle, [x.as_str(), y.as_str(), z.as_str()])
                    .map(|_| ())
            }
            _ => return Ok(()),
        };
        // Rejected edits put the cached values back into the cells
        if result.is_err() {
            self.render_point(handle);
        }
        result
    }

    // Trajectory table

    fn add_trajectory(&mut self) -> Result<(), PlannerError> {
        let entry = self
            .selected_point(Role::Entry)
            .ok_or(PlannerError::NoSelection(TableId::Entry))?;
        let target = self
            .selected_point(Role::Target)
            .ok_or(PlannerError::NoSelection(TableId::Target))?;

        let id = self.index.add(&mut self.scene, entry, target)?;
        let (Some(row), Some(trajectory)) = (self.index.position(id), self.index.get(id)) else {
            return Err(PlannerError::UnknownTrajectory(id));
        };
        self.subscriptions.watch(trajectory);
        let view = RowView::of_trajectory(&self.scene, &self.registry, trajectory);
        self.display.insert_row(&mut self.grid, TableId::Trajectory, row, &view);
        self.refresh_update_action();
        Ok(())
    }

    fn delete_trajectory(&mut self) -> Result<(), PlannerError> {
        let row = self
            .grid
            .current_row(TableId::Trajectory)
            .ok_or(PlannerError::NoSelection(TableId::Trajectory))?;
        let id = self.index.at(row).ok_or(PlannerError::UnknownRow)?.id;
        self.remove_trajectory(id)
    }

    /// Removes a trajectory, its line and its row
    fn remove_trajectory(&mut self, id: TrajectoryId) -> Result<(), PlannerError> {
        let row = self.index.position(id).ok_or(PlannerError::UnknownTrajectory(id))?;
        let result = self.index.remove(&mut self.scene, id).map(|_| ());
        self.drop_trajectory_row(id, row);
        result
    }

    fn drop_trajectory_row(&mut self, id: TrajectoryId, row: usize) {
        self.subscriptions.drop_trajectory(id);
        self.display.remove_row(&mut self.grid, TableId::Trajectory, row);
        if self.selected_trajectory == Some(id) {
            self.selected_trajectory = None;
        }
        self.refresh_update_action();
    }

    /// Repoints the selected trajectory at the selected entry and target points
    fn update_trajectory(&mut self) -> Result<(), PlannerError> {
        let id = self
            .selected_trajectory
            .ok_or(PlannerError::NoSelection(TableId::Trajectory))?;
        let current = self.index.get(id).ok_or(PlannerError::UnknownTrajectory(id))?;
        let entry = self.selected_point(Role::Entry).unwrap_or(current.entry);
        let target = self.selected_point(Role::Target).unwrap_or(current.target);

        self.index.repoint(&mut self.scene, id, entry, target)?;
        if let Some(trajectory) = self.index.get(id) {
            self.subscriptions.drop_trajectory(id);
            self.subscriptions.watch(trajectory);
        }
        self.render_trajectory(id);
        self.refresh_update_action();
        Ok(())
    }

    fn clear_trajectories(&mut self) -> Result<(), PlannerError> {
        self.index.clear(&mut self.scene)?;
        self.subscriptions.clear();
        self.selected_trajectory = None;
        self.grid.clear(TableId::Trajectory);
        self.refresh_update_action();
        Ok(())
    }

    fn on_trajectory_selection_changed(&mut self) -> Result<(), PlannerError> {
        self.selected_trajectory = self
            .grid
            .current_row(TableId::Trajectory)
            .and_then(|row| self.index.at(row))
            .map(|t| t.id);
        self.refresh_update_action();
        Ok(())
    }

    /// Selects the clicked trajectory and highlights its two points
    fn on_trajectory_cell_clicked(&mut self, row: usize) -> Result<(), PlannerError> {
        let trajectory = self.index.at(row).ok_or(PlannerError::UnknownRow)?;
        let id = trajectory.id;
        let endpoints = [trajectory.entry, trajectory.target];
        self.selected_trajectory = Some(id);

        for (role, point) in ROLES.into_iter().zip(endpoints) {
            match self.registry.find(point) {
                Some(handle) if handle.role == role => {
                    self.grid.select_row(TableId::for_role(role), Some(handle.row));
                    self.registry.selection_changed(&mut self.scene, handle)?;
                }
                _ => debug!("{} point {} of {} is not listed", role, point, id),
            }
        }
        self.refresh_update_action();
        Ok(())
    }

    fn on_trajectory_cell_changed(&mut self, row: usize, column: usize) -> Result<(), PlannerError> {
        if column != trajectory_columns::NAME {
            return Ok(());
        }
        let id = self.index.at(row).ok_or(PlannerError::UnknownRow)?.id;
        let text = self
            .grid
            .cell_text(TableId::Trajectory, row, column)
            .unwrap_or_default();
        let result = self.index.rename(&mut self.scene, id, &text);
        self.render_trajectory(id);
        result
    }

    /// Update is only offered when a selected point differs from the
    /// selected trajectory's endpoint of the same role.
    fn refresh_update_action(&mut self) {
        let enabled = self
            .selected_trajectory
            .and_then(|id| self.index.get(id))
            .is_some_and(|trajectory| {
                ROLES.into_iter().any(|role| {
                    self.selected_point(role)
                        .is_some_and(|point| point != trajectory.endpoint(role))
                })
            });
        self.display.set_update_enabled(&mut self.grid, enabled);
    }
}

fn absorb(context: &str, error: &PlannerError) {
    match error {
        PlannerError::NullHandle
        | PlannerError::NoSelection(_)
        | PlannerError::NoActiveGroup
        | PlannerError::EmptyName
        | PlannerError::UnknownRow => debug!("{} ignored: {}", context, error),
        PlannerError::DuplicateTrajectory { .. } | PlannerError::MalformedCoordinate(_) => {
            info!("{} rejected: {}", context, error)
        }
        _ => warn!("{} failed: {}", context, error),
    }
}
