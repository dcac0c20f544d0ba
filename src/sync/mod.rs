//! Synchronization between the grid, the scene and the planning caches
//!
//! `SyncController` owns the injected collaborators and routes every event;
//! `DisplayAdapter` renders rows; `Subscriptions` tracks which trajectories
//! follow which points.

/// Event routing and cascades
pub mod controller;
/// Row rendering and point display attributes
pub mod display;
/// Which trajectories follow which points
pub mod subscriptions;

pub use controller::SyncController;
pub use display::{DisplayAdapter, RowView};
pub use subscriptions::Subscriptions;
