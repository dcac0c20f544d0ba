// src/main.rs
// Scripted planning session that drives the planner through the in-memory scene and grid.

// Imports dependencies and planner modules.
// - env_logger: Logging for debugging (set RUST_LOG=info to follow the session).
// - path_planner: Controller, collaborators and configuration.
use log::{info, warn};
use nalgebra::Point3;
use path_planner::{
    Button, InMemoryGrid, InMemoryScene, PlannerConfig, Role, SceneStore, SyncController, TableId,
};
use std::error::Error;

type Planner = SyncController<InMemoryScene, InMemoryGrid>;

/// Runs a short session: place points, pair them, rename, delete.
/// The first argument, if given, is a YAML configuration file.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    info!("Starting path planner session...");

    let config = match std::env::args().nth(1) {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    let mut planner = Planner::new(InMemoryScene::new(), InMemoryGrid::new(), config);
    planner.on_scene_attached()?;

    // Two entry points, one target
    press(&mut planner, TableId::Entry, Button::Add);
    press(&mut planner, TableId::Entry, Button::Add);
    press(&mut planner, TableId::Target, Button::Add);

    // Place them, as the viewer would after a click in the image
    let placements = [
        (Role::Entry, 0, Point3::new(-20.0, 35.0, 10.0)),
        (Role::Entry, 1, Point3::new(15.0, 40.0, 12.0)),
        (Role::Target, 0, Point3::new(-5.0, 5.0, -8.0)),
    ];
    for (role, row, position) in placements {
        let point = planner.registry().rows(role)[row].point;
        planner.scene_mut().set_coordinates(point, position)?;
    }
    planner.pump_scene_events();

    // Entry 1 -> Target 1, then the same pair again (ignored)
    click(&mut planner, TableId::Entry, 0);
    click(&mut planner, TableId::Target, 0);
    press(&mut planner, TableId::Trajectory, Button::Add);
    press(&mut planner, TableId::Trajectory, Button::Add);

    // Entry 2 -> Target 1
    click(&mut planner, TableId::Entry, 1);
    press(&mut planner, TableId::Trajectory, Button::Add);

    // Name the first trajectory
    if let Some(event) = planner.grid_mut().edit_cell(TableId::Trajectory, 0, 0, "Frontal approach") {
        planner.handle_table_event(event);
    }

    for row in 0..planner.index().len() {
        info!("Trajectory row {}: {:?}", row, planner.grid().row_texts(TableId::Trajectory, row));
    }

    // Deleting the target takes both trajectories with it
    click(&mut planner, TableId::Target, 0);
    press(&mut planner, TableId::Target, Button::Delete);
    if !planner.index().is_empty() {
        warn!("{} trajectories survived their target", planner.index().len());
    }

    info!(
        "Session finished: {} entry, {} target, {} trajectories",
        planner.registry().len(Role::Entry),
        planner.registry().len(Role::Target),
        planner.index().len()
    );
    Ok(())
}

fn press(planner: &mut Planner, table: TableId, button: Button) {
    if let Some(event) = planner.grid().press(table, button) {
        planner.handle_table_event(event);
    }
}

fn click(planner: &mut Planner, table: TableId, row: usize) {
    for event in planner.grid_mut().click(table, row, 0) {
        planner.handle_table_event(event);
    }
}
