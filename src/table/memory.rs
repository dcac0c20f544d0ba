// table/memory.rs

// Headless grid used by the demo binary and the tests. Besides the GridView
// writes it offers `edit_cell`, `click` and `press`, which play the user's part
// and hand back the events a real widget would emit.

use super::{Button, GridView, TableEvent, TableId};
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct Cell {
    text: String,
    editable: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Cell { text: String::new(), editable: true }
    }
}

#[derive(Clone, Debug, Default)]
struct GridTable {
    rows: Vec<Vec<Cell>>,
    current: Option<usize>,
    scrolled_to: Option<usize>,
    title: String,
}

/// Grid kept entirely in memory
#[derive(Default)]
pub struct InMemoryGrid {
    tables: HashMap<TableId, GridTable>,
    buttons: HashMap<(TableId, Button), bool>,
}

impl InMemoryGrid {
    /// Empty grid, every button enabled
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, table: TableId) -> Option<&GridTable> {
        self.tables.get(&table)
    }

    fn table_mut(&mut self, table: TableId) -> &mut GridTable {
        self.tables.entry(table).or_default()
    }

    fn cell_mut(&mut self, table: TableId, row: usize, column: usize) -> Option<&mut Cell> {
        self.table_mut(table).rows.get_mut(row).and_then(|r| r.get_mut(column))
    }

    /// All cell texts of a row
    pub fn row_texts(&self, table: TableId, row: usize) -> Vec<String> {
        self.table(table)
            .and_then(|t| t.rows.get(row))
            .map(|r| r.iter().map(|c| c.text.clone()).collect())
            .unwrap_or_default()
    }

    /// Whether a cell accepts edits
    pub fn is_cell_editable(&self, table: TableId, row: usize, column: usize) -> bool {
        self.table(table)
            .and_then(|t| t.rows.get(row))
            .and_then(|r| r.get(column))
            .is_some_and(|c| c.editable)
    }

    /// Row last scrolled into view
    pub fn scrolled_to(&self, table: TableId) -> Option<usize> {
        self.table(table).and_then(|t| t.scrolled_to)
    }

    /// Title of the box around a table
    pub fn title(&self, table: TableId) -> String {
        self.table(table).map(|t| t.title.clone()).unwrap_or_default()
    }

    /// Buttons are enabled until told otherwise
    pub fn is_button_enabled(&self, table: TableId, button: Button) -> bool {
        self.buttons.get(&(table, button)).copied().unwrap_or(true)
    }

    /// Types `text` into a cell. Read-only or missing cells ignore the edit.
    pub fn edit_cell(&mut self, table: TableId, row: usize, column: usize, text: &str) -> Option<TableEvent> {
        let cell = self.cell_mut(table, row, column)?;
        if !cell.editable {
            return None;
        }
        cell.text = text.to_string();
        Some(TableEvent::CellChanged { table, row, column })
    }

    /// Clicks a cell, making its row current
    pub fn click(&mut self, table: TableId, row: usize, column: usize) -> Vec<TableEvent> {
        let grid = self.table_mut(table);
        if row >= grid.rows.len() {
            return Vec::new();
        }
        let mut events = vec![TableEvent::CellClicked { table, row, column }];
        if grid.current != Some(row) {
            grid.current = Some(row);
            events.push(TableEvent::SelectionChanged(table));
        }
        events
    }

    /// Presses a button; disabled buttons do nothing
    pub fn press(&self, table: TableId, button: Button) -> Option<TableEvent> {
        self.is_button_enabled(table, button)
            .then_some(TableEvent::ButtonActivated { table, button })
    }
}

impl GridView for InMemoryGrid {
    fn insert_row(&mut self, table: TableId, row: usize) {
        let columns = table.column_count();
        let grid = self.table_mut(table);
        let row = row.min(grid.rows.len());
        grid.rows.insert(row, vec![Cell::default(); columns]);
        if let Some(current) = grid.current.filter(|c| *c >= row) {
            grid.current = Some(current + 1);
        }
    }

    fn remove_row(&mut self, table: TableId, row: usize) {
        let grid = self.table_mut(table);
        if row >= grid.rows.len() {
            return;
        }
        grid.rows.remove(row);
        grid.current = match grid.current {
            Some(current) if current == row => None,
            Some(current) if current > row => Some(current - 1),
            other => other,
        };
    }

    fn clear(&mut self, table: TableId) {
        let grid = self.table_mut(table);
        grid.rows.clear();
        grid.current = None;
        grid.scrolled_to = None;
    }

    fn row_count(&self, table: TableId) -> usize {
        self.table(table).map_or(0, |t| t.rows.len())
    }

    fn cell_text(&self, table: TableId, row: usize, column: usize) -> Option<String> {
        self.table(table)
            .and_then(|t| t.rows.get(row))
            .and_then(|r| r.get(column))
            .map(|c| c.text.clone())
    }

    fn set_cell_text(&mut self, table: TableId, row: usize, column: usize, text: &str) {
        if let Some(cell) = self.cell_mut(table, row, column) {
            cell.text = text.to_string();
        }
    }

    fn set_cell_editable(&mut self, table: TableId, row: usize, column: usize, editable: bool) {
        if let Some(cell) = self.cell_mut(table, row, column) {
            cell.editable = editable;
        }
    }

    fn current_row(&self, table: TableId) -> Option<usize> {
        self.table(table).and_then(|t| t.current)
    }

    fn select_row(&mut self, table: TableId, row: Option<usize>) {
        let grid = self.table_mut(table);
        let len = grid.rows.len();
        grid.current = row.filter(|r| *r < len);
    }

    fn scroll_to_row(&mut self, table: TableId, row: usize) {
        self.table_mut(table).scrolled_to = Some(row);
    }

    fn set_button_enabled(&mut self, table: TableId, button: Button, enabled: bool) {
        self.buttons.insert((table, button), enabled);
    }

    fn set_title(&mut self, table: TableId, title: &str) {
        self.table_mut(table).title = title.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::point_columns;

    #[test]
    fn read_only_cells_swallow_edits() {
        let mut grid = InMemoryGrid::new();
        grid.insert_row(TableId::Entry, 0);
        grid.set_cell_editable(TableId::Entry, 0, point_columns::X, false);

        assert_eq!(grid.edit_cell(TableId::Entry, 0, point_columns::X, "4"), None);
        assert_eq!(
            grid.edit_cell(TableId::Entry, 0, point_columns::NAME, "E"),
            Some(TableEvent::CellChanged { table: TableId::Entry, row: 0, column: point_columns::NAME })
        );
    }

    #[test]
    fn removing_rows_keeps_current_row_on_the_same_item() {
        let mut grid = InMemoryGrid::new();
        for row in 0..3 {
            grid.insert_row(TableId::Target, row);
        }
        grid.select_row(TableId::Target, Some(2));
        grid.remove_row(TableId::Target, 0);
        assert_eq!(grid.current_row(TableId::Target), Some(1));
        grid.remove_row(TableId::Target, 1);
        assert_eq!(grid.current_row(TableId::Target), None);
    }

    #[test]
    fn clicking_the_current_row_only_reports_the_click() {
        let mut grid = InMemoryGrid::new();
        grid.insert_row(TableId::Trajectory, 0);
        assert_eq!(grid.click(TableId::Trajectory, 0, 0).len(), 2);
        assert_eq!(grid.click(TableId::Trajectory, 0, 1).len(), 1);
        assert!(grid.click(TableId::Trajectory, 5, 0).is_empty());
    }
}
