// sync/display.rs

// Writes registry and index state out to the grid and to the point display
// attributes of the scene. Rows are described by a tagged RowView so the grid
// side never has to guess what a row holds.

use crate::planning::{PointRegistry, PointRow, Trajectory};
use crate::scene::{NodeId, Role, SceneStore};
use crate::table::{point_columns, trajectory_columns, Button, GridView, TableId};
use crate::{PlannerError, TableConfig};
use nalgebra::Point3;

/// Contents of one table row
#[derive(Clone, Debug, PartialEq)]
pub enum RowView {
    /// Row of an entry or target table
    Point {
        /// Point name
        name: String,
        /// `None` when the scene no longer resolves the point
        position: Option<Point3<f64>>,
        /// Entry or target
        role: Role,
    },
    /// Row of the trajectory table
    Trajectory {
        /// Trajectory display name
        name: String,
        /// Target point name
        target: String,
        /// Entry point name
        entry: String,
    },
}

impl RowView {
    /// View of a cached point row
    pub fn of_point(scene: &dyn SceneStore, row: &PointRow) -> Self {
        RowView::Point {
            name: row.name.clone(),
            position: scene.coordinates(row.point).ok(),
            role: row.role,
        }
    }

    /// View of a trajectory; endpoint names come from the registry first, then the scene
    pub fn of_trajectory(scene: &dyn SceneStore, registry: &PointRegistry, trajectory: &Trajectory) -> Self {
        let name_of = |point: NodeId| {
            registry
                .find(point)
                .and_then(|handle| registry.get(handle))
                .map(|row| row.name.clone())
                .or_else(|| scene.name(point).ok())
                .unwrap_or_default()
        };
        RowView::Trajectory {
            name: trajectory.display_name.clone(),
            target: name_of(trajectory.target),
            entry: name_of(trajectory.entry),
        }
    }
}

/// Grid and scene-display writer
#[derive(Clone, Debug)]
pub struct DisplayAdapter {
    precision: usize,
    scroll_to_new_rows: bool,
}

impl DisplayAdapter {
    /// Adapter following the table options
    pub fn new(config: &TableConfig) -> Self {
        DisplayAdapter {
            precision: config.coordinate_precision,
            scroll_to_new_rows: config.scroll_to_new_rows,
        }
    }

    /// Pushes the cached opacity and color of a point to the scene
    pub fn paint_point(scene: &mut dyn SceneStore, row: &PointRow) -> Result<(), PlannerError> {
        scene.set_opacity(row.point, row.opacity)?;
        scene.set_color(row.point, row.color)
    }

    /// Inserts a row and fills it. Only the name column stays editable.
    pub fn insert_row(&self, grid: &mut dyn GridView, table: TableId, row: usize, view: &RowView) {
        grid.insert_row(table, row);
        for column in 1..table.column_count() {
            grid.set_cell_editable(table, row, column, false);
        }
        self.write_row(grid, table, row, view);
        if self.scroll_to_new_rows {
            grid.scroll_to_row(table, row);
        }
    }

    /// Rewrites the cell texts of an existing row
    pub fn write_row(&self, grid: &mut dyn GridView, table: TableId, row: usize, view: &RowView) {
        match view {
            RowView::Point { name, position, role } => {
                grid.set_cell_text(table, row, point_columns::NAME, name);
                let components = position.as_ref().map(|p| [p.x, p.y, p.z]);
                for (offset, column) in [point_columns::X, point_columns::Y, point_columns::Z]
                    .into_iter()
                    .enumerate()
                {
                    let text = components
                        .map(|c| format!("{:.*}", self.precision, c[offset]))
                        .unwrap_or_default();
                    grid.set_cell_text(table, row, column, &text);
                }
                grid.set_cell_text(table, row, point_columns::ROLE, role.label());
            }
            RowView::Trajectory { name, target, entry } => {
                grid.set_cell_text(table, row, trajectory_columns::NAME, name);
                grid.set_cell_text(table, row, trajectory_columns::TARGET, target);
                grid.set_cell_text(table, row, trajectory_columns::ENTRY, entry);
            }
        }
    }

    /// Removes a row
    pub fn remove_row(&self, grid: &mut dyn GridView, table: TableId, row: usize) {
        grid.remove_row(table, row);
    }

    /// Clears a point table and fills it again from the registry
    pub fn render_points(&self, grid: &mut dyn GridView, scene: &dyn SceneStore, registry: &PointRegistry, role: Role) {
        let table = TableId::for_role(role);
        grid.clear(table);
        for (row, point) in registry.rows(role).iter().enumerate() {
            self.insert_row(grid, table, row, &RowView::of_point(scene, point));
        }
    }

    /// Enables or disables the Update button
    pub fn set_update_enabled(&self, grid: &mut dyn GridView, enabled: bool) {
        grid.set_button_enabled(TableId::Trajectory, Button::Update, enabled);
    }

    /// Title of a table box, e.g. "Entry Point : Entry Points"
    pub fn set_title(&self, grid: &mut dyn GridView, table: TableId, group_name: &str) {
        let prefix = match table {
            TableId::Entry => "Entry Point",
            TableId::Target => "Target Point",
            TableId::Trajectory => "Trajectory",
        };
        grid.set_title(table, &format!("{} : {}", prefix, group_name));
    }
}
