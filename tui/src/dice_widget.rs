use dieroll_core::FaceId;
use dieroll_core::rotation::rotation_degrees;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;

use crate::faces::FaceAssets;
use crate::style::die_style;

/// Outer size of the die, border included. Terminal cells are roughly twice
/// as tall as they are wide, so this reads as a square.
pub(crate) const DIE_WIDTH: u16 = 11;
pub(crate) const DIE_HEIGHT: u16 = 5;

const PIP: &str = "●";
/// Column of each pip inside the border.
const PIP_COLUMNS: [u16; 3] = [1, 4, 7];

/// Die face drawn through the rotation transform.
///
/// A terminal cannot rotate glyphs freely, so the pips snap to the nearest
/// quarter turn and the border switches style while the die is on its edge.
pub(crate) struct DiceWidget<'a> {
    assets: &'a FaceAssets,
    face: FaceId,
    degrees: f64,
}

impl<'a> DiceWidget<'a> {
    pub(crate) fn new(assets: &'a FaceAssets, face: FaceId, rotation_progress: f64) -> Self {
        Self {
            assets,
            face,
            degrees: rotation_degrees(rotation_progress),
        }
    }
}

/// Nearest clockwise quarter turn for an angle in degrees.
pub(crate) fn quarter_turns(degrees: f64) -> u8 {
    ((degrees / 90.0).round() as i64).rem_euclid(4) as u8
}

/// Double border while the die is closer to a diagonal than to upright.
pub(crate) fn border_type(degrees: f64) -> BorderType {
    let within_quarter = degrees.rem_euclid(90.0);
    if (22.5..67.5).contains(&within_quarter) {
        BorderType::Double
    } else {
        BorderType::Rounded
    }
}

impl WidgetRef for DiceWidget<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.width < DIE_WIDTH || area.height < DIE_HEIGHT {
            return;
        }
        let die = Rect::new(
            area.x + (area.width - DIE_WIDTH) / 2,
            area.y + (area.height - DIE_HEIGHT) / 2,
            DIE_WIDTH,
            DIE_HEIGHT,
        );

        let block = Block::bordered()
            .border_type(border_type(self.degrees))
            .style(die_style());
        let inner = block.inner(die);
        block.render(die, buf);

        let grid = self
            .assets
            .rotated_grid(self.face, quarter_turns(self.degrees));
        for (row, cells) in (0u16..).zip(grid.iter()) {
            for (col, pip) in PIP_COLUMNS.iter().zip(cells.iter()) {
                if !pip {
                    continue;
                }
                if let Some(cell) = buf.cell_mut((inner.x + col, inner.y + row)) {
                    cell.set_symbol(PIP);
                }
            }
        }
    }
}
