/// A rectangle in texel coordinates. `right` and `bottom` are exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(self) -> i32 {
        self.right - self.left
    }

    pub fn height(self) -> i32 {
        self.bottom - self.top
    }

    /// Align the rectangle outward to a block grid. `bs` must be a power of
    /// two in both dimensions.
    pub fn align_outside(self, bs: (i32, i32)) -> Self {
        Self {
            left: self.left & !(bs.0 - 1),
            top: self.top & !(bs.1 - 1),
            right: (self.right + bs.0 - 1) & !(bs.0 - 1),
            bottom: (self.bottom + bs.1 - 1) & !(bs.1 - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align() {
        let r = Rect::new(3, 5, 17, 9).align_outside((8, 8));
        assert_eq!(r, Rect::new(0, 0, 24, 16));

        // Already aligned rectangles stay put.
        let r = Rect::new(0, 0, 32, 16).align_outside((16, 8));
        assert_eq!(r, Rect::new(0, 0, 32, 16));
    }
}
