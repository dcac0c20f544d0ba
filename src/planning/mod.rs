//! Planning caches
//!
//! The point registry and the trajectory index. Both hold handles into the
//! scene only; they are rebuilt or corrected whenever the scene reports a change.

/// Entry and target point rows
pub mod registry;
/// Entry/target pairs and their lines
pub mod trajectory;

pub use registry::{parse_coordinate, PointRegistry, PointRow, RowHandle};
pub use trajectory::{Trajectory, TrajectoryGroup, TrajectoryId, TrajectoryIndex, TrajectoryName};
