// planning/registry.rs

// Cache of the entry and target point rows. Each row mirrors one scene point
// and one table row at the same position; the scene stays the source of truth
// for names and coordinates.

use crate::scene::{Color, NodeId, Role, SceneStore};
use crate::sync::DisplayAdapter;
use crate::{PlannerError, PointStyle};
use log::{debug, info, warn};
use nalgebra::Point3;

/// Position of a row in one of the two point tables
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowHandle {
    /// Table the row belongs to
    pub role: Role,
    /// Row index in that table
    pub row: usize,
}

impl RowHandle {
    /// Handle for `row` of the table holding `role` points
    pub fn new(role: Role, row: usize) -> Self {
        RowHandle { role, row }
    }
}

/// Cached state of one point
#[derive(Clone, Debug, PartialEq)]
pub struct PointRow {
    /// Scene point behind the row
    pub point: NodeId,
    /// Entry or target
    pub role: Role,
    /// Name shown in the name column
    pub name: String,
    /// Opacity last written to the scene
    pub opacity: f64,
    /// Color last written to the scene
    pub color: Color,
}

/// Entry and target point rows, in table order
pub struct PointRegistry {
    entries: Vec<PointRow>,
    targets: Vec<PointRow>,
    style: PointStyle,
}

impl PointRegistry {
    /// Empty registry painting points with `style`
    pub fn new(style: PointStyle) -> Self {
        PointRegistry {
            entries: Vec::new(),
            targets: Vec::new(),
            style,
        }
    }

    fn rows_mut(&mut self, role: Role) -> &mut Vec<PointRow> {
        match role {
            Role::Entry => &mut self.entries,
            Role::Target => &mut self.targets,
        }
    }

    /// Rows of one table
    pub fn rows(&self, role: Role) -> &[PointRow] {
        match role {
            Role::Entry => &self.entries,
            Role::Target => &self.targets,
        }
    }

    /// Number of rows in one table
    pub fn len(&self, role: Role) -> usize {
        self.rows(role).len()
    }

    /// Whether one table is empty
    pub fn is_empty(&self, role: Role) -> bool {
        self.rows(role).is_empty()
    }

    /// Cached row behind a handle
    pub fn get(&self, handle: RowHandle) -> Option<&PointRow> {
        self.rows(handle.role).get(handle.row)
    }

    /// Row of a point, searching both tables
    pub fn find(&self, point: NodeId) -> Option<RowHandle> {
        [Role::Entry, Role::Target].into_iter().find_map(|role| {
            self.rows(role)
                .iter()
                .position(|r| r.point == point)
                .map(|row| RowHandle::new(role, row))
        })
    }

    /// Whether either table lists `point`
    pub fn contains(&self, point: NodeId) -> bool {
        self.find(point).is_some()
    }

    /// Appends a row for `point`.
    ///
    /// An unnamed point is called `"<Role> <count+1>"`. The point starts
    /// unselected and takes the role color. Registering a point twice returns
    /// the row it already has.
    pub fn add(
        &mut self,
        scene: &mut dyn SceneStore,
        role: Role,
        point: Option<NodeId>,
    ) -> Result<RowHandle, PlannerError> {
        let point = point.ok_or(PlannerError::NullHandle)?;
        if let Some(existing) = self.rows(role).iter().position(|r| r.point == point) {
            return Ok(RowHandle::new(role, existing));
        }

        let mut name = scene.name(point)?;
        if name.is_empty() {
            name = format!("{} {}", role.label(), self.len(role) + 1);
            scene.set_name(point, &name)?;
        }

        let row = PointRow {
            point,
            role,
            name,
            opacity: self.style.unselected_opacity,
            color: self.style.color_for(role),
        };
        DisplayAdapter::paint_point(scene, &row)?;

        let rows = self.rows_mut(role);
        rows.push(row);
        let handle = RowHandle::new(role, rows.len() - 1);
        debug!("Registered {} point {} at row {}", role, point, handle.row);
        Ok(handle)
    }

    /// Drops a row. The scene point is left alone.
    pub fn remove(&mut self, handle: RowHandle) -> Result<PointRow, PlannerError> {
        let rows = self.rows_mut(handle.role);
        if handle.row >= rows.len() {
            return Err(PlannerError::UnknownRow);
        }
        Ok(rows.remove(handle.row))
    }

    /// Forgets every row of one table
    pub fn clear(&mut self, role: Role) {
        self.rows_mut(role).clear();
    }

    /// Renames the point behind a row. Blank names are ignored.
    pub fn rename(
        &mut self,
        scene: &mut dyn SceneStore,
        handle: RowHandle,
        new_name: &str,
    ) -> Result<(), PlannerError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(PlannerError::EmptyName);
        }
        let row = self
            .rows_mut(handle.role)
            .get_mut(handle.row)
            .ok_or(PlannerError::UnknownRow)?;
        scene.set_name(row.point, new_name)?;
        row.name = new_name.to_string();
        info!("Renamed {} point {} to {:?}", row.role, row.point, new_name);
        Ok(())
    }

    /// Moves the point behind a row. All three components must parse or
    /// nothing is written.
    pub fn set_coordinates(
        &mut self,
        scene: &mut dyn SceneStore,
        handle: RowHandle,
        xyz: [&str; 3],
    ) -> Result<Point3<f64>, PlannerError> {
        let point = self.get(handle).ok_or(PlannerError::UnknownRow)?.point;
        let [x, y, z] = xyz;
        let position = Point3::new(parse_coordinate(x)?, parse_coordinate(y)?, parse_coordinate(z)?);
        scene.set_coordinates(point, position)?;
        debug!("Moved point {} to {}", point, position);
        Ok(position)
    }

    /// Highlights the selected row and dims every other row of its table
    pub fn selection_changed(
        &mut self,
        scene: &mut dyn SceneStore,
        handle: RowHandle,
    ) -> Result<(), PlannerError> {
        if handle.row >= self.len(handle.role) {
            return Err(PlannerError::UnknownRow);
        }
        let selected = self.style.selected_opacity;
        let unselected = self.style.unselected_opacity;
        for (index, row) in self.rows_mut(handle.role).iter_mut().enumerate() {
            row.opacity = if index == handle.row { selected } else { unselected };
            if let Err(e) = DisplayAdapter::paint_point(scene, row) {
                warn!("Could not update display of point {}: {}", row.point, e);
            }
        }
        Ok(())
    }

    /// Re-reads the cached name of a point after the scene changed it
    pub fn refresh(&mut self, scene: &dyn SceneStore, point: NodeId) -> Result<Option<RowHandle>, PlannerError> {
        let Some(handle) = self.find(point) else {
            return Ok(None);
        };
        let name = scene.name(point)?;
        if let Some(row) = self.rows_mut(handle.role).get_mut(handle.row) {
            row.name = name;
        }
        Ok(Some(handle))
    }
}

/// Parses one coordinate cell. Empty, non-numeric and non-finite text is rejected.
pub fn parse_coordinate(text: &str) -> Result<f64, PlannerError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PlannerError::MalformedCoordinate(text.to_string())),
    }
}
