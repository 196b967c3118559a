//! Pip layouts for each die face, built once at startup.

use dieroll_core::FaceId;
use dieroll_core::face::FACE_COUNT;

/// 3x3 pip grid, row-major, `true` where a pip sits.
pub(crate) type PipGrid = [[bool; 3]; 3];

const X: bool = true;
const O: bool = false;

/// Immutable table from face to artwork.
#[derive(Debug, Clone)]
pub(crate) struct FaceAssets {
    grids: [PipGrid; FACE_COUNT as usize],
}

impl FaceAssets {
    pub(crate) fn load() -> Self {
        Self {
            grids: [
                [[O, O, O], [O, X, O], [O, O, O]],
                [[O, O, X], [O, O, O], [X, O, O]],
                [[O, O, X], [O, X, O], [X, O, O]],
                [[X, O, X], [O, O, O], [X, O, X]],
                [[X, O, X], [O, X, O], [X, O, X]],
                [[X, O, X], [X, O, X], [X, O, X]],
            ],
        }
    }

    pub(crate) fn grid(&self, face: FaceId) -> &PipGrid {
        &self.grids[face.index()]
    }

    /// Grid as seen after `quarter_turns` clockwise quarter turns.
    pub(crate) fn rotated_grid(&self, face: FaceId, quarter_turns: u8) -> PipGrid {
        let mut grid = *self.grid(face);
        for _ in 0..quarter_turns % 4 {
            grid = rotate_clockwise(&grid);
        }
        grid
    }
}

/// Unicode die glyph for compact output.
pub(crate) fn face_glyph(face: FaceId) -> char {
    const GLYPHS: [char; FACE_COUNT as usize] = ['⚀', '⚁', '⚂', '⚃', '⚄', '⚅'];
    GLYPHS[face.index()]
}

fn rotate_clockwise(grid: &PipGrid) -> PipGrid {
    let mut out = [[false; 3]; 3];
    for (row, cells) in out.iter_mut().enumerate() {
        for (col, cell) in cells.iter_mut().enumerate() {
            *cell = grid[2 - col][row];
        }
    }
    out
}
