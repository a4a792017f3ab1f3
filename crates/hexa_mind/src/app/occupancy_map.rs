use mind_engine::{GridCoord, GridOccupancy};

const EMPTY_CELL: char = '.';

/// Text dump of the grid, top row first. Occupied cells show the owning mind
/// id in base 36.
pub(crate) fn render_occupancy_map(grid: &GridOccupancy) -> String {
    let mut out = format!(
        "{}x{} grid, {} empty\n",
        grid.cols(),
        grid.rows(),
        grid.empty_cell_count()
    );
    for row in (0..grid.rows()).rev() {
        let line = (0..grid.cols())
            .map(|col| cell_glyph(grid, GridCoord::new(col as i32, row as i32)))
            .collect::<String>();
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn cell_glyph(grid: &GridOccupancy, coord: GridCoord) -> char {
    match grid.owner_of(coord) {
        Some(mind) => char::from_digit((mind.0 % 36) as u32, 36).unwrap_or('?'),
        None => EMPTY_CELL,
    }
}
