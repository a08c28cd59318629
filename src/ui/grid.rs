use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

pub const HORIZONTAL_MARGIN: u16 = 5;
pub const VERTICAL_MARGIN: u16 = 1;

/// Regions of the running screen. The renderer and the click handler both
/// derive cell positions from this, so they can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningLayout {
    pub header: Rect,
    pub board: Rect,
    pub toast: Rect,
    pub legend: Rect,
}

pub fn running_layout(area: Rect) -> RunningLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // stage + trial progress
            Constraint::Min(3),    // board
            Constraint::Length(1), // toast
            Constraint::Length(1), // legend
        ])
        .split(area);

    RunningLayout {
        header: chunks[0],
        board: chunks[1],
        toast: chunks[2],
        legend: chunks[3],
    }
}

/// Smallest cell that still shows a bordered slot with its label
pub const MIN_CELL_WIDTH: u16 = 3;
pub const MIN_CELL_HEIGHT: u16 = 3;

/// Split `board` into `rows * cols` cells, row-major. Empty when the grid
/// does not fit the board at [`MIN_CELL_WIDTH`] x [`MIN_CELL_HEIGHT`].
pub fn cell_rects(board: Rect, rows: usize, cols: usize) -> Vec<Rect> {
    split_cells(board, rows, cols).unwrap_or_default()
}

/// Whether every cell of the grid gets drawn at least at the minimum size.
pub fn grid_fits(board: Rect, rows: usize, cols: usize) -> bool {
    split_cells(board, rows, cols).is_some()
}

fn split_cells(board: Rect, rows: usize, cols: usize) -> Option<Vec<Rect>> {
    let room = |count: usize, span: u16, min: u16| count > 0 && count <= usize::from(span / min);
    if !room(rows, board.height, MIN_CELL_HEIGHT) || !room(cols, board.width, MIN_CELL_WIDTH) {
        return None;
    }
    let (row_ratio, col_ratio) = (u32::try_from(rows).ok()?, u32::try_from(cols).ok()?);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_ratio); rows])
        .split(board);

    let cells: Vec<Rect> = row_areas
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, col_ratio); cols])
                .split(*row)
                .to_vec()
        })
        .collect();

    // rounding inside the solver can still leave a sliver
    let drawable = cells
        .iter()
        .all(|cell| cell.width >= MIN_CELL_WIDTH && cell.height >= MIN_CELL_HEIGHT);
    drawable.then_some(cells)
}

/// Slot under a terminal cell, if any
pub fn slot_at(board: Rect, rows: usize, cols: usize, column: u16, row: u16) -> Option<usize> {
    let pos = Position::new(column, row);
    cell_rects(board, rows, cols)
        .iter()
        .position(|cell| cell.contains(pos))
}

/// Move a row-major cursor one step, clamped to the grid edges.
pub fn step_cursor(cursor: usize, rows: usize, cols: usize, dr: isize, dc: isize) -> usize {
    if rows == 0 || cols == 0 {
        return 0;
    }
    let (r, c) = (cursor / cols, cursor % cols);
    let r = (r as isize + dr).clamp(0, rows as isize - 1) as usize;
    let c = (c as isize + dc).clamp(0, cols as isize - 1) as usize;
    r * cols + c
}
