// table/mod.rs

// Grid collaborator boundary: the three tables of the planning panel and the
// events their widgets emit.

/// In-memory grid for the runner and the tests
pub mod memory;

pub use memory::InMemoryGrid;

use crate::scene::Role;
use std::fmt;

/// Columns of the entry and target tables
pub mod point_columns {
    /// Point name
    pub const NAME: usize = 0;
    /// X coordinate
    pub const X: usize = 1;
    /// Y coordinate
    pub const Y: usize = 2;
    /// Z coordinate
    pub const Z: usize = 3;
    /// Role label
    pub const ROLE: usize = 4;
    /// Number of columns
    pub const COUNT: usize = 5;
}

/// Columns of the trajectory table. Target is shown before entry.
pub mod trajectory_columns {
    /// Trajectory name
    pub const NAME: usize = 0;
    /// Target point name
    pub const TARGET: usize = 1;
    /// Entry point name
    pub const ENTRY: usize = 2;
    /// Number of columns
    pub const COUNT: usize = 3;
}

/// The three tables of the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableId {
    /// Entry point table
    Entry,
    /// Target point table
    Target,
    /// Trajectory table
    Trajectory,
}

impl TableId {
    /// The point table holding points of `role`
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Entry => TableId::Entry,
            Role::Target => TableId::Target,
        }
    }

    /// Role of a point table; `None` for the trajectory table
    pub fn role(self) -> Option<Role> {
        match self {
            TableId::Entry => Some(Role::Entry),
            TableId::Target => Some(Role::Target),
            TableId::Trajectory => None,
        }
    }

    /// Number of columns in the table
    pub fn column_count(self) -> usize {
        match self {
            TableId::Entry | TableId::Target => point_columns::COUNT,
            TableId::Trajectory => trajectory_columns::COUNT,
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableId::Entry => f.write_str("entry"),
            TableId::Target => f.write_str("target"),
            TableId::Trajectory => f.write_str("trajectory"),
        }
    }
}

/// Buttons attached to each table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// Adds a point or trajectory
    Add,
    /// Deletes the current row
    Delete,
    /// Repoints the selected trajectory
    Update,
    /// Deletes every row
    Clear,
}

/// Events emitted by the grid widgets
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TableEvent {
    /// Text of a cell was edited
    CellChanged {
        /// Table holding the cell
        table: TableId,
        /// Row of the cell
        row: usize,
        /// Column of the cell
        column: usize,
    },
    /// A cell was clicked
    CellClicked {
        /// Table holding the cell
        table: TableId,
        /// Row of the cell
        row: usize,
        /// Column of the cell
        column: usize,
    },
    /// The current row of a table changed
    SelectionChanged(TableId),
    /// A button was pressed
    ButtonActivated {
        /// Table the button belongs to
        table: TableId,
        /// Which button
        button: Button,
    },
}

/// Table widgets the planner writes to
pub trait GridView {
    /// Inserts an empty row before `row`
    fn insert_row(&mut self, table: TableId, row: usize);
    /// Removes a row
    fn remove_row(&mut self, table: TableId, row: usize);
    /// Removes every row
    fn clear(&mut self, table: TableId);
    /// Number of rows
    fn row_count(&self, table: TableId) -> usize;
    /// Text of a cell; `None` outside the table
    fn cell_text(&self, table: TableId, row: usize, column: usize) -> Option<String>;
    /// Replaces the text of a cell
    fn set_cell_text(&mut self, table: TableId, row: usize, column: usize, text: &str);
    /// Allows or forbids user edits of a cell
    fn set_cell_editable(&mut self, table: TableId, row: usize, column: usize, editable: bool);
    /// Current row, if any
    fn current_row(&self, table: TableId) -> Option<usize>;
    /// Moves the current row without emitting events
    fn select_row(&mut self, table: TableId, row: Option<usize>);
    /// Brings a row into view
    fn scroll_to_row(&mut self, table: TableId, row: usize);
    /// Enables or disables a button of a table
    fn set_button_enabled(&mut self, table: TableId, button: Button, enabled: bool);
    /// Title of the box around the table
    fn set_title(&mut self, table: TableId, title: &str);
}
