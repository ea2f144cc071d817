//! Rectangles and regions.
//!
//! Window and client rectangles are cached per window in absolute
//! desktop coordinates. A [`Region`] is a plain list of non-overlapping
//! rectangles, which is all the reconciler needs to describe the area a
//! window vacated.

use serde::{Deserialize, Serialize};

/// Geometry of a rectangular region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from edge coordinates. Inverted edges yield an empty rectangle.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(
            left,
            top,
            right.saturating_sub(left).max(0) as u32,
            bottom.saturating_sub(top).max(0) as u32,
        )
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Same rectangle moved by `(dx, dy)`.
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// The parts of `self` not covered by `other`.
    ///
    /// Produces at most four bands: full-width strips above and below the
    /// overlap, then the left and right remainders beside it.
    pub fn subtract(&self, other: &Self) -> Vec<Self> {
        if self.is_empty() {
            return Vec::new();
        }
        if !self.intersects(other) {
            return vec![*self];
        }

        let mut parts = Vec::with_capacity(4);
        let top = self.y.max(other.y);
        let bottom = self.bottom().min(other.bottom());

        if other.y > self.y {
            parts.push(Self::from_edges(self.x, self.y, self.right(), other.y));
        }
        if other.bottom() < self.bottom() {
            parts.push(Self::from_edges(
                self.x,
                other.bottom(),
                self.right(),
                self.bottom(),
            ));
        }
        if other.x > self.x {
            parts.push(Self::from_edges(self.x, top, other.x, bottom));
        }
        if other.right() < self.right() {
            parts.push(Self::from_edges(other.right(), top, self.right(), bottom));
        }

        parts.retain(|r| !r.is_empty());
        parts
    }
}

/// A set of non-overlapping rectangles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    rects: Vec<Geometry>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: Geometry) -> Self {
        let mut region = Self::new();
        if !rect.is_empty() {
            region.rects.push(rect);
        }
        region
    }

    /// `self` minus `rect`.
    pub fn difference(&self, rect: &Geometry) -> Self {
        Self {
            rects: self.rects.iter().flat_map(|r| r.subtract(rect)).collect(),
        }
    }

    pub fn rects(&self) -> &[Geometry] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Total covered area in pixels.
    pub fn area(&self) -> u64 {
        self.rects
            .iter()
            .map(|r| u64::from(r.width) * u64::from(r.height))
            .sum()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subtract_disjoint_keeps_original() {
        let a = Geometry::new(0, 0, 10, 10);
        let b = Geometry::new(20, 20, 5, 5);
        assert_eq!(a.subtract(&b), vec![a]);
    }

    #[test]
    fn test_subtract_covered_is_empty() {
        let a = Geometry::new(5, 5, 10, 10);
        let b = Geometry::new(0, 0, 100, 100);
        assert!(a.subtract(&b).is_empty());
    }

    #[test]
    fn test_subtract_move_right_leaves_left_strip() {
        let old = Geometry::new(0, 0, 100, 50);
        let new = Geometry::new(30, 0, 100, 50);
        assert_eq!(old.subtract(&new), vec![Geometry::new(0, 0, 30, 50)]);
    }

    #[test]
    fn test_subtract_hole_in_middle() {
        let outer = Geometry::new(0, 0, 30, 30);
        let inner = Geometry::new(10, 10, 10, 10);
        let region = Region::from_rect(outer).difference(&inner);
        assert_eq!(region.rects().len(), 4);
        assert_eq!(region.area(), 900 - 100);
        assert!(!region.contains(15, 15));
        assert!(region.contains(5, 15));
        assert!(region.contains(25, 25));
    }

    #[test]
    fn test_from_edges_clamps_inverted() {
        let g = Geometry::from_edges(10, 10, 5, 20);
        assert!(g.is_empty());
        assert_eq!(g.height, 10);
    }
}
