// tests/controller_tests.rs
// End-to-end panel flows: grid events in, scene and grid state out.

use nalgebra::Point3;
use path_planner::table::point_columns;
use path_planner::{
    Button, GridView, InMemoryGrid, InMemoryScene, NodeId, PlannerConfig, PlannerError, Role, SceneStore,
    SyncController, TableEvent, TableId, TrajectoryId,
};
use rstest::{fixture, rstest};

type Planner = SyncController<InMemoryScene, InMemoryGrid>;

#[fixture]
fn planner() -> Planner {
    let mut planner = Planner::new(InMemoryScene::new(), InMemoryGrid::new(), PlannerConfig::default());
    planner.on_scene_attached().unwrap();
    planner
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

/// Adds a point through the table and moves it, as a click in the viewer would
fn place(planner: &mut Planner, role: Role, position: Point3<f64>) -> NodeId {
    press(planner, TableId::for_role(role), Button::Add);
    let point = planner.registry().rows(role).last().unwrap().point;
    planner.scene_mut().set_coordinates(point, position).unwrap();
    planner.pump_scene_events();
    point
}

/// E1 (0,0,0), E2 (0,10,0), T1 (10,0,0) and the trajectory E1 -> T1
fn planned(planner: &mut Planner) -> (NodeId, NodeId, NodeId, TrajectoryId) {
    let e1 = place(planner, Role::Entry, Point3::new(0.0, 0.0, 0.0));
    let e2 = place(planner, Role::Entry, Point3::new(0.0, 10.0, 0.0));
    let t1 = place(planner, Role::Target, Point3::new(10.0, 0.0, 0.0));
    click(planner, TableId::Entry, 0);
    click(planner, TableId::Target, 0);
    press(planner, TableId::Trajectory, Button::Add);
    let id = planner.index().at(0).unwrap().id;
    (e1, e2, t1, id)
}

#[rstest]
fn attaching_a_scene_creates_three_empty_groups(planner: Planner) {
    let entry = planner.point_group(Role::Entry).unwrap();
    let target = planner.point_group(Role::Target).unwrap();
    let trajectories = planner.index().group().unwrap();

    assert_eq!(planner.scene().name(entry).unwrap(), "Entry Points");
    assert_eq!(planner.scene().name(target).unwrap(), "Target Points");
    assert_eq!(trajectories.name, "Trajectories");
    for group in [entry, target, trajectories.id] {
        assert_eq!(planner.scene().child_count(group).unwrap(), 0);
    }

    assert_eq!(planner.grid().title(TableId::Entry), "Entry Point : Entry Points");
    assert_eq!(planner.grid().title(TableId::Target), "Target Point : Target Points");
    assert_eq!(planner.grid().title(TableId::Trajectory), "Trajectory : Trajectories");
    assert!(!planner.grid().is_button_enabled(TableId::Trajectory, Button::Update));
}

#[rstest]
fn added_points_get_a_read_only_row(mut planner: Planner) {
    let point = place(&mut planner, Role::Entry, Point3::new(1.0, -2.5, 7.891));

    assert_eq!(planner.scene().parent(point), planner.point_group(Role::Entry));
    assert_eq!(
        planner.grid().row_texts(TableId::Entry, 0),
        vec!["Entry 1", "1.00", "-2.50", "7.89", "Entry"]
    );
    assert!(planner.grid().is_cell_editable(TableId::Entry, 0, point_columns::NAME));
    for column in [point_columns::X, point_columns::Y, point_columns::Z, point_columns::ROLE] {
        assert!(!planner.grid().is_cell_editable(TableId::Entry, 0, column));
    }
    assert_eq!(planner.grid().scrolled_to(TableId::Entry), Some(0));
}

#[rstest]
fn trajectory_add_needs_both_selections(mut planner: Planner) {
    place(&mut planner, Role::Entry, Point3::origin());
    place(&mut planner, Role::Target, Point3::new(1.0, 0.0, 0.0));
    click(&mut planner, TableId::Entry, 0);

    assert_eq!(
        planner.dispatch(TableEvent::ButtonActivated { table: TableId::Trajectory, button: Button::Add }),
        Err(PlannerError::NoSelection(TableId::Target))
    );
    assert!(planner.index().is_empty());
    assert_eq!(planner.scene().line_count(), 0);
}

#[rstest]
fn pairing_lists_the_trajectory_once(mut planner: Planner) {
    let (e1, _, t1, id) = planned(&mut planner);
    press(&mut planner, TableId::Trajectory, Button::Add);

    assert_eq!(planner.index().len(), 1);
    assert_eq!(planner.grid().row_count(TableId::Trajectory), 1);
    assert_eq!(
        planner.grid().row_texts(TableId::Trajectory, 0),
        vec!["Ruler 1", "Target 1", "Entry 1"]
    );
    assert_eq!(
        planner.scene().line_endpoints(id.line()),
        Some((Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)))
    );
    assert!(planner.subscriptions().subscribers(e1).contains(&id));
    assert!(planner.subscriptions().subscribers(t1).contains(&id));
}

#[rstest]
fn renaming_a_point_refreshes_its_trajectories(mut planner: Planner) {
    planned(&mut planner);
    let event = planner
        .grid_mut()
        .edit_cell(TableId::Target, 0, point_columns::NAME, "Nucleus")
        .unwrap();
    planner.handle_table_event(event);

    assert_eq!(planner.registry().rows(Role::Target)[0].name, "Nucleus");
    assert_eq!(planner.grid().row_texts(TableId::Trajectory, 0)[1], "Nucleus");
}

#[rstest]
fn blank_point_name_is_put_back(mut planner: Planner) {
    let point = place(&mut planner, Role::Entry, Point3::origin());
    let event = planner
        .grid_mut()
        .edit_cell(TableId::Entry, 0, point_columns::NAME, "  ")
        .unwrap();
    assert_eq!(planner.dispatch(event), Err(PlannerError::EmptyName));

    assert_eq!(planner.scene().name(point).unwrap(), "Entry 1");
    assert_eq!(planner.grid().cell_text(TableId::Entry, 0, point_columns::NAME).unwrap(), "Entry 1");
}

#[rstest]
fn moving_a_point_in_the_scene_moves_the_line(mut planner: Planner) {
    let (e1, _, _, id) = planned(&mut planner);
    planner.scene_mut().set_coordinates(e1, Point3::new(5.0, 5.0, 5.0)).unwrap();
    planner.pump_scene_events();

    assert_eq!(
        planner.scene().line_endpoints(id.line()),
        Some((Point3::new(5.0, 5.0, 5.0), Point3::new(10.0, 0.0, 0.0)))
    );
    assert_eq!(
        planner.grid().row_texts(TableId::Entry, 0)[1..4],
        ["5.00".to_string(), "5.00".to_string(), "5.00".to_string()]
    );
}

#[rstest]
fn coordinate_cells_apply_only_when_all_parse(mut planner: Planner) {
    let point = place(&mut planner, Role::Entry, Point3::origin());
    let changed = TableEvent::CellChanged { table: TableId::Entry, row: 0, column: point_columns::X };

    planner.grid_mut().set_cell_text(TableId::Entry, 0, point_columns::X, "12");
    planner.dispatch(changed).unwrap();
    assert_eq!(planner.scene().coordinates(point).unwrap(), Point3::new(12.0, 0.0, 0.0));
    assert_eq!(planner.grid().cell_text(TableId::Entry, 0, point_columns::X).unwrap(), "12.00");

    planner.grid_mut().set_cell_text(TableId::Entry, 0, point_columns::Y, "abc");
    assert_eq!(
        planner.dispatch(changed),
        Err(PlannerError::MalformedCoordinate("abc".to_string()))
    );
    assert_eq!(planner.scene().coordinates(point).unwrap(), Point3::new(12.0, 0.0, 0.0));
    assert_eq!(planner.grid().cell_text(TableId::Entry, 0, point_columns::Y).unwrap(), "0.00");
}

#[rstest]
#[case(Role::Entry)]
#[case(Role::Target)]
fn deleting_a_point_deletes_its_trajectories(mut planner: Planner, #[case] role: Role) {
    let (e1, _, t1, id) = planned(&mut planner);
    let deleted = match role {
        Role::Entry => e1,
        Role::Target => t1,
    };
    click(&mut planner, TableId::for_role(role), 0);
    press(&mut planner, TableId::for_role(role), Button::Delete);

    assert!(!planner.scene().contains(deleted));
    assert!(!planner.registry().contains(deleted));
    assert!(planner.index().is_empty());
    assert!(!planner.scene().contains(id.line()));
    assert_eq!(planner.grid().row_count(TableId::Trajectory), 0);
    assert!(!planner.subscriptions().is_watched(e1));
    assert!(!planner.subscriptions().is_watched(t1));
}

#[rstest]
fn trajectory_with_a_vanished_endpoint_is_dropped_on_recompute(mut planner: Planner) {
    let (e1, _, t1, id) = planned(&mut planner);
    // The target disappears without its removal ever being reported
    planner.scene_mut().delete_node(t1).unwrap();
    planner.scene_mut().take_events();
    assert_eq!(planner.index().len(), 1);

    planner.scene_mut().set_coordinates(e1, Point3::new(2.0, 2.0, 2.0)).unwrap();
    planner.pump_scene_events();

    assert!(planner.index().is_empty());
    assert!(!planner.scene().contains(id.line()));
    assert_eq!(planner.grid().row_count(TableId::Trajectory), 0);
    assert!(!planner.subscriptions().is_watched(e1));
}

#[rstest]
fn clearing_points_cascades(mut planner: Planner) {
    planned(&mut planner);
    press(&mut planner, TableId::Entry, Button::Clear);

    assert!(planner.registry().is_empty(Role::Entry));
    assert_eq!(planner.grid().row_count(TableId::Entry), 0);
    assert!(planner.index().is_empty());
    assert_eq!(planner.scene().line_count(), 0);
    // Target points are untouched
    assert_eq!(planner.registry().len(Role::Target), 1);
}

#[rstest]
fn clearing_trajectories_keeps_points(mut planner: Planner) {
    planned(&mut planner);
    press(&mut planner, TableId::Trajectory, Button::Clear);

    assert!(planner.index().is_empty());
    assert_eq!(planner.grid().row_count(TableId::Trajectory), 0);
    assert_eq!(planner.scene().line_count(), 0);
    assert_eq!(planner.registry().len(Role::Entry), 2);
}

#[rstest]
fn clicking_a_trajectory_highlights_its_points(mut planner: Planner) {
    let (e1, e2, t1, id) = planned(&mut planner);
    click(&mut planner, TableId::Entry, 1);
    click(&mut planner, TableId::Trajectory, 0);

    assert_eq!(planner.selected_trajectory(), Some(id));
    assert_eq!(planner.selected_point(Role::Entry), Some(e1));
    assert_eq!(planner.scene().opacity(e1), Some(1.0));
    assert_eq!(planner.scene().opacity(e2), Some(0.3));
    assert_eq!(planner.scene().opacity(t1), Some(1.0));
}

#[rstest]
fn update_is_offered_only_for_a_different_selection(mut planner: Planner) {
    let (_, e2, t1, id) = planned(&mut planner);
    assert!(!planner.grid().is_button_enabled(TableId::Trajectory, Button::Update));

    click(&mut planner, TableId::Trajectory, 0);
    assert!(!planner.grid().is_button_enabled(TableId::Trajectory, Button::Update));

    click(&mut planner, TableId::Entry, 1);
    assert!(planner.grid().is_button_enabled(TableId::Trajectory, Button::Update));

    press(&mut planner, TableId::Trajectory, Button::Update);
    let trajectory = planner.index().get(id).unwrap();
    assert_eq!((trajectory.entry, trajectory.target), (e2, t1));
    assert_eq!(
        planner.scene().line_endpoints(id.line()).unwrap().0,
        Point3::new(0.0, 10.0, 0.0)
    );
    assert_eq!(planner.grid().row_texts(TableId::Trajectory, 0)[2], "Entry 2");
    assert!(planner.subscriptions().subscribers(e2).contains(&id));
    assert!(!planner.grid().is_button_enabled(TableId::Trajectory, Button::Update));
}

#[rstest]
fn update_onto_an_existing_pair_is_refused(mut planner: Planner) {
    let (e1, _, _, first) = planned(&mut planner);
    click(&mut planner, TableId::Entry, 1);
    press(&mut planner, TableId::Trajectory, Button::Add);
    assert_eq!(planner.index().len(), 2);

    click(&mut planner, TableId::Trajectory, 0);
    click(&mut planner, TableId::Entry, 1);
    assert!(matches!(
        planner.dispatch(TableEvent::ButtonActivated { table: TableId::Trajectory, button: Button::Update }),
        Err(PlannerError::DuplicateTrajectory { .. })
    ));
    assert_eq!(planner.index().get(first).unwrap().entry, e1);
}

#[rstest]
fn user_trajectory_name_sticks(mut planner: Planner) {
    let (e1, _, _, id) = planned(&mut planner);
    let event = planner.grid_mut().edit_cell(TableId::Trajectory, 0, 0, "MyPath").unwrap();
    planner.handle_table_event(event);
    assert_eq!(planner.scene().name(id.line()).unwrap(), "MyPath");

    // Geometry updates and outside renames both leave the user's name in place
    planner.scene_mut().set_coordinates(e1, Point3::new(1.0, 1.0, 1.0)).unwrap();
    planner.scene_mut().set_name(id.line(), "Ruler 9").unwrap();
    planner.pump_scene_events();

    assert_eq!(planner.scene().name(id.line()).unwrap(), "MyPath");
    assert_eq!(planner.grid().row_texts(TableId::Trajectory, 0)[0], "MyPath");
}

#[rstest]
fn removing_a_line_elsewhere_drops_its_row(mut planner: Planner) {
    let (e1, _, _, id) = planned(&mut planner);
    planner.scene_mut().delete_node(id.line()).unwrap();
    planner.pump_scene_events();

    assert!(planner.index().is_empty());
    assert_eq!(planner.grid().row_count(TableId::Trajectory), 0);
    assert!(!planner.subscriptions().is_watched(e1));
    assert!(planner.scene().contains(e1));
}

#[rstest]
fn points_added_elsewhere_are_listed(mut planner: Planner) {
    let group = planner.point_group(Role::Target).unwrap();
    planner
        .scene_mut()
        .insert_point(group, Role::Target, "Thalamus", Point3::new(3.0, 2.0, 1.0))
        .unwrap();
    planner.pump_scene_events();

    assert_eq!(
        planner.grid().row_texts(TableId::Target, 0),
        vec!["Thalamus", "3.00", "2.00", "1.00", "Target"]
    );
}

#[rstest]
fn a_new_scene_starts_a_clean_session(mut planner: Planner) {
    planned(&mut planner);
    planner.attach_scene(InMemoryScene::new()).unwrap();

    assert!(planner.registry().is_empty(Role::Entry));
    assert!(planner.registry().is_empty(Role::Target));
    assert!(planner.index().is_empty());
    assert_eq!(planner.selected_trajectory(), None);
    for table in [TableId::Entry, TableId::Target, TableId::Trajectory] {
        assert_eq!(planner.grid().row_count(table), 0);
    }
    assert_eq!(planner.scene().line_count(), 0);
}

#[rstest]
fn configured_group_names_are_used() {
    let config = PlannerConfig::from_yaml_str("groups:\n  trajectory: Paths\n").unwrap();
    let mut planner = Planner::new(InMemoryScene::new(), InMemoryGrid::new(), config);
    planner.on_scene_attached().unwrap();

    assert_eq!(planner.index().group().unwrap().name, "Paths");
    assert_eq!(planner.grid().title(TableId::Trajectory), "Trajectory : Paths");
    assert_eq!(planner.grid().title(TableId::Entry), "Entry Point : Entry Points");
}
