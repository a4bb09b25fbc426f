//! Small geometry and collision helpers shared by the games.

use ratatui::layout::Rect;

/// Integer grid position used by the grid-based games.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }
}

pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

/// Strictly inside: a point exactly on the rim does not count.
pub fn point_in_circle(px: f32, py: f32, cx: f32, cy: f32, radius: f32) -> bool {
    distance(px, py, cx, cy) < radius
}

/// Closed-interval overlap of `[a, a + a_len]` and `[b, b + b_len]`.
pub fn spans_overlap(a: f32, a_len: f32, b: f32, b_len: f32) -> bool {
    a + a_len >= b && a <= b + b_len
}

/// Maps a terminal cell inside `viewport` onto a board of the given size,
/// using the cell centre. Cells outside the viewport map to `None`.
pub fn cell_to_board(viewport: Rect, column: u16, row: u16, board_w: f32, board_h: f32) -> Option<(f32, f32)> {
    if viewport.width == 0 || viewport.height == 0 {
        return None;
    }
    if column < viewport.x
        || row < viewport.y
        || column >= viewport.x + viewport.width
        || row >= viewport.y + viewport.height
    {
        return None;
    }
    let fx = (column - viewport.x) as f32 + 0.5;
    let fy = (row - viewport.y) as f32 + 0.5;
    Some((
        fx / viewport.width as f32 * board_w,
        fy / viewport.height as f32 * board_h,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_bounds() {
        assert!(Cell::new(0, 0).in_bounds(20, 20));
        assert!(Cell::new(19, 19).in_bounds(20, 20));
        assert!(!Cell::new(20, 5).in_bounds(20, 20));
        assert!(!Cell::new(3, -1).in_bounds(20, 20));
    }

    #[test]
    fn circle_rim_is_outside() {
        assert!(point_in_circle(3.0, 0.0, 0.0, 0.0, 3.1));
        assert!(!point_in_circle(3.0, 4.0, 0.0, 0.0, 5.0));
    }

    #[test]
    fn touching_spans_overlap() {
        assert!(spans_overlap(0.0, 10.0, 10.0, 80.0));
        assert!(spans_overlap(90.0, 10.0, 10.0, 80.0));
        assert!(!spans_overlap(91.0, 10.0, 10.0, 80.0));
    }

    #[test]
    fn viewport_mapping_scales_proportionally() {
        let vp = Rect::new(10, 5, 80, 20);
        let (x, y) = cell_to_board(vp, 10, 5, 800.0, 400.0).unwrap();
        assert!((x - 5.0).abs() < 1e-3);
        assert!((y - 10.0).abs() < 1e-3);
        let (x, y) = cell_to_board(vp, 89, 24, 800.0, 400.0).unwrap();
        assert!((x - 795.0).abs() < 1e-3);
        assert!((y - 390.0).abs() < 1e-3);
        assert!(cell_to_board(vp, 90, 10, 800.0, 400.0).is_none());
        assert!(cell_to_board(vp, 9, 10, 800.0, 400.0).is_none());
    }
}
