/// Axis-aligned rectangle in frame space, stored as two corners.
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right one.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Returns the rectangle shifted by `(dx, dy)`.
    #[inline]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translated_moves_both_corners() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0).translated(10.0, -1.0);
        assert_eq!(r, Rect::new(11.0, 1.0, 13.0, 3.0));
    }
}
