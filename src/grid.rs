//! Rectangular hull builder.
//!
//! Lays out a `cols x rows` lattice of points and joins it with structural
//! springs (horizontal, vertical), both cell diagonals, and two triangles
//! per cell split along the top-left/bottom-right diagonal.

use crate::element::{ElementCount, ElementIndex};
use crate::error::PhysicsError;
use crate::flags::Characteristics;
use crate::material::MaterialId;
use crate::ship::Ship;
use crate::vec::Vec2f;
use alloc::vec::Vec as AllocVec;

/// Configuration for a rectangular hull.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HullGridConfig {
    pub cols: usize,
    pub rows: usize,
    pub spacing: f32,
    pub material: MaterialId,
}

impl HullGridConfig {
    pub fn point_count(&self) -> ElementCount {
        (self.cols * self.rows) as ElementCount
    }

    pub fn spring_count(&self) -> ElementCount {
        let (cols, rows) = (self.cols, self.rows);
        let cells = cols.saturating_sub(1) * rows.saturating_sub(1);
        (rows * cols.saturating_sub(1) + rows.saturating_sub(1) * cols + 2 * cells) as ElementCount
    }

    pub fn triangle_count(&self) -> ElementCount {
        (2 * self.cols.saturating_sub(1) * self.rows.saturating_sub(1)) as ElementCount
    }
}

/// Point indices of a built grid, row-major.
#[derive(Clone, Debug)]
pub struct HullGrid {
    points: AllocVec<ElementIndex>,
    cols: usize,
    rows: usize,
}

impl HullGrid {
    /// Point at (col, row). Row 0 is the bottom edge.
    pub fn index(&self, col: usize, row: usize) -> ElementIndex {
        self.points[row * self.cols + col]
    }

    pub fn points(&self) -> &[ElementIndex] {
        &self.points
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Build the grid into `ship`, with its bottom-left point at `origin`.
///
/// The grid extends in positive X (columns) and positive Y (rows).
pub fn build_grid(ship: &mut Ship, origin: Vec2f, config: &HullGridConfig) -> Result<HullGrid, PhysicsError> {
    let cols = config.cols.max(1);
    let rows = config.rows.max(1);
    let spacing = config.spacing;

    let mut points = AllocVec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let position = Vec2f::new(
                origin.x + col as f32 * spacing,
                origin.y + row as f32 * spacing,
            );
            points.push(ship.add_point(position, config.material, None)?);
        }
    }
    let at = |col: usize, row: usize| points[row * cols + col];

    // Structural: horizontal (col, col+1), indexed [row][col]
    let mut horizontal = AllocVec::with_capacity(rows * (cols - 1));
    for row in 0..rows {
        for col in 0..(cols - 1) {
            horizontal.push(connect(ship, at(col, row), at(col + 1, row))?);
        }
    }

    // Structural: vertical (row, row+1)
    let mut vertical = AllocVec::with_capacity((rows - 1) * cols);
    for row in 0..(rows - 1) {
        for col in 0..cols {
            vertical.push(connect(ship, at(col, row), at(col, row + 1))?);
        }
    }

    for row in 0..(rows - 1) {
        for col in 0..(cols - 1) {
            let bl = at(col, row);
            let br = at(col + 1, row);
            let tl = at(col, row + 1);
            let tr = at(col + 1, row + 1);

            let diagonal = connect(ship, tl, br)?;
            connect(ship, tr, bl)?;

            let top = horizontal[(row + 1) * (cols - 1) + col];
            let bottom = horizontal[row * (cols - 1) + col];
            let left = vertical[row * cols + col];
            let right = vertical[row * cols + col + 1];

            ship.add_triangle([tl, tr, br], [top, right, diagonal])?;
            ship.add_triangle([tl, br, bl], [diagonal, bottom, left])?;
        }
    }

    log::debug!(
        "built {}x{} hull grid: {} points, {} springs, {} triangles",
        cols,
        rows,
        config.point_count(),
        config.spring_count(),
        config.triangle_count()
    );

    Ok(HullGrid { points, cols, rows })
}

fn connect(ship: &mut Ship, a: ElementIndex, b: ElementIndex) -> Result<ElementIndex, PhysicsError> {
    let characteristics = if ship.points().is_hull(a) || ship.points().is_hull(b) {
        Characteristics::HULL
    } else {
        Characteristics::empty()
    };
    ship.add_spring(a, b, characteristics)
}
