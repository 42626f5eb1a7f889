use serde::{Deserialize, Serialize};
use std::ops::Add;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Vector from `other` to `self`.
    pub fn offset_from(&self, other: &Point2D) -> Vector2D {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    /// Whether both coordinates are within `epsilon` of `other`.
    pub fn approx_eq(&self, other: &Point2D, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add<Vector2D> for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Vector2D) -> Point2D {
        Point2D::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

/// A 2D displacement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2D {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn zero() -> Self {
        Self { dx: 0.0, dy: 0.0 }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }
}

/// A 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// Scale both dimensions so that the width equals `width`.
    /// A zero-width size only has its width replaced.
    pub fn fit_width(&self, width: f64) -> Size2D {
        if self.width == 0.0 {
            return Size2D::new(width, self.height);
        }
        let factor = width / self.width;
        Size2D::new(width, self.height * factor)
    }

    /// A usable layout size: finite and non-negative on both axes.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// An axis-aligned rectangle in frame space. `origin` is the top-left corner;
/// y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point2D,
    pub size: Size2D,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point2D::new(x, y),
            size: Size2D::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point2D, size: Size2D) -> Self {
        Self { origin, size }
    }

    /// A zero-size rectangle sitting on a point.
    pub fn at_point(point: Point2D) -> Self {
        Self {
            origin: point,
            size: Size2D::zero(),
        }
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Both corners are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.origin.is_finite() && self.right().is_finite() && self.bottom().is_finite()
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Union of every rectangle in the iterator, or `None` when it is empty.
    pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, r| match acc {
                Some(u) => Some(u.union(r)),
                None => Some(*r),
            })
    }

    /// Whether the interiors of the two rectangles overlap.
    /// Rectangles that merely touch along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn translate(&self, by: Vector2D) -> Rect {
        Rect {
            origin: self.origin + by,
            size: self.size,
        }
    }

    /// Grow the rectangle by `padding` on every side.
    pub fn inflate(&self, padding: f64) -> Rect {
        Rect::new(
            self.origin.x - padding,
            self.origin.y - padding,
            self.size.width + padding * 2.0,
            self.size.height + padding * 2.0,
        )
    }
}
