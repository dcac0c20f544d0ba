//! Path Planner - entry/target trajectory pairing for surgical planning scenes
//!
//! This library keeps tables of entry points, target points and the trajectories
//! joining them synchronized with a shared, externally owned scene. The scene and
//! the table widgets are consumed through the `SceneStore` and `GridView` traits.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Scene handles, notifications and the `SceneStore` boundary
pub mod scene;
/// Table ids, events and the `GridView` boundary
pub mod table;
pub mod planning;
pub mod sync;

// Re-export commonly used items for easier access
pub use scene::{Color, InMemoryScene, NodeId, Role, SceneEvent, SceneStore};
pub use table::{Button, GridView, InMemoryGrid, TableEvent, TableId};
pub use planning::{PointRegistry, PointRow, RowHandle, Trajectory, TrajectoryId, TrajectoryIndex, TrajectoryName};
pub use sync::{DisplayAdapter, RowView, Subscriptions, SyncController};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Main configuration structure for the planner panel
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlannerConfig {
    /// Names given to the groups created on scene attachment
    pub groups: GroupNames,
    /// Point display attributes
    pub style: PointStyle,
    /// Table behaviour
    pub table: TableConfig,
}

/// Names of the three groups created for a planning session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupNames {
    /// Entry point group
    pub entry: String,
    /// Target point group
    pub target: String,
    /// Trajectory group
    pub trajectory: String,
}

/// Opacity and color applied to points
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// Opacity of the selected point
    pub selected_opacity: f64,
    /// Opacity of every other point in the same table
    pub unselected_opacity: f64,
    /// Color of entry points
    pub entry_color: Color,
    /// Color of target points
    pub target_color: Color,
}

/// Table options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Digits after the decimal point in coordinate cells
    pub coordinate_precision: usize,
    /// Scroll to rows as they are appended
    pub scroll_to_new_rows: bool,
    /// Upper bound on scene notification drain rounds per handler
    pub max_event_rounds: usize,
}

impl Default for GroupNames {
    fn default() -> Self {
        GroupNames {
            entry: "Entry Points".to_string(),
            target: "Target Points".to_string(),
            trajectory: "Trajectories".to_string(),
        }
    }
}

impl Default for PointStyle {
    fn default() -> Self {
        PointStyle {
            selected_opacity: 1.0,
            unselected_opacity: 0.3,
            entry_color: Color::new(0.2, 0.8, 0.2),
            target_color: Color::new(0.9, 0.2, 0.2),
        }
    }
}

impl PointStyle {
    /// Color used for points of the given role
    pub fn color_for(&self, role: Role) -> Color {
        match role {
            Role::Entry => self.entry_color,
            Role::Target => self.target_color,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            coordinate_precision: 2,
            scroll_to_new_rows: true,
            max_event_rounds: 32,
        }
    }
}

impl PlannerConfig {
    /// Parses a configuration from YAML text. Missing keys fall back to defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, PlannerError> {
        serde_yaml::from_str(text).map_err(|e| PlannerError::ConfigError(e.to_string()))
    }

    /// Loads a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PlannerError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| PlannerError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let config: PlannerConfig = serde_yaml::from_reader(file)
            .map_err(|e| PlannerError::ConfigError(e.to_string()))?;
        log::info!("Loaded planner configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration as YAML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PlannerError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| PlannerError::ConfigError(format!("{}: {}", path.display(), e)))?;
        serde_yaml::to_writer(file, self).map_err(|e| PlannerError::ConfigError(e.to_string()))?;
        log::info!("Saved planner configuration to {}", path.display());
        Ok(())
    }
}

/// Planner error types
///
/// None of these reach the user as a dialog. Event handlers log them and
/// leave every cache and scene node as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// A point handle was required but none was given
    NullHandle,
    /// The table has no current row
    NoSelection(TableId),
    /// No trajectory group is active
    NoActiveGroup,
    /// A trajectory with the same entry and target already exists
    DuplicateTrajectory {
        /// Entry point of the rejected pair
        entry: NodeId,
        /// Target point of the rejected pair
        target: NodeId,
    },
    /// Blank names are ignored
    EmptyName,
    /// Coordinate text that is empty or not a number
    MalformedCoordinate(String),
    /// Row index outside the cached rows
    UnknownRow,
    /// Handle not present in the scene
    UnknownNode(NodeId),
    /// Trajectory not present in the index
    UnknownTrajectory(TrajectoryId),
    /// A trajectory endpoint no longer resolves in the scene
    DanglingReference {
        /// Trajectory holding the reference
        trajectory: TrajectoryId,
        /// The missing point
        point: NodeId,
    },
    /// Configuration error
    ConfigError(String),
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PlannerError::NullHandle => write!(f, "No point given"),
            PlannerError::NoSelection(table) => write!(f, "No row selected in {} table", table),
            PlannerError::NoActiveGroup => write!(f, "No active trajectory group"),
            PlannerError::DuplicateTrajectory { entry, target } => {
                write!(f, "Trajectory from {} to {} already exists", entry, target)
            }
            PlannerError::EmptyName => write!(f, "Empty name ignored"),
            PlannerError::MalformedCoordinate(text) => write!(f, "Malformed coordinate: {:?}", text),
            PlannerError::UnknownRow => write!(f, "Unknown row"),
            PlannerError::UnknownNode(node) => write!(f, "Unknown scene node {}", node),
            PlannerError::UnknownTrajectory(id) => write!(f, "Unknown trajectory {}", id),
            PlannerError::DanglingReference { trajectory, point } => {
                write!(f, "Trajectory {} references missing point {}", trajectory, point)
            }
            PlannerError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PlannerError {}
