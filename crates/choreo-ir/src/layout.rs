use serde::{Deserialize, Serialize};

use choreo_core::{ChoreoError, ChoreoResult, Point2D, Rect, Size2D, Vector2D};

use crate::coords::CoordinateSystem;
use crate::element::ElementId;
use crate::registry::Registry;

/// What a constraint is placed relative to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// An element or a group (its union box).
    Element(ElementId),
    /// The whole frame rectangle.
    Frame,
    /// A zero-size box at a frame-space point.
    FramePoint(Point2D),
    /// A zero-size box at a data-space point, mapped through the coordinate system.
    DataPoint(Point2D),
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::Element(id) => write!(f, "'{}'", id),
            Anchor::Frame => write!(f, "frame"),
            Anchor::FramePoint(p) => write!(f, "frame point ({}, {})", p.x, p.y),
            Anchor::DataPoint(p) => write!(f, "data point ({}, {})", p.x, p.y),
        }
    }
}

/// An edge of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// A corner of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }
}

/// How the target box sits relative to the reference box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Outside, above the reference, horizontally centered.
    Above,
    /// Outside, below the reference, horizontally centered.
    Below,
    /// Outside, left of the reference, vertically centered.
    LeftOf,
    /// Outside, right of the reference, vertically centered.
    RightOf,
    /// Centered on the reference. The gap is ignored.
    CenterOf,
    /// Inside the reference's corner, inset by the gap on both axes.
    Corner(Corner),
    /// Inside against one edge, inset by the gap, centered on the other axis.
    InsideEdge(Edge),
    /// Outside the reference's corner, diagonally separated by the gap.
    OutsideCorner(Corner),
}

/// A relative-placement rule. The target is supplied by the step that uses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorConstraint {
    pub reference: Anchor,
    pub relation: Relation,
    #[serde(default)]
    pub gap: f64,
    /// Final nudge applied after resolution.
    #[serde(default, skip_serializing_if = "Vector2D::is_zero")]
    pub offset: Vector2D,
}

impl AnchorConstraint {
    pub fn new(reference: Anchor, relation: Relation, gap: f64) -> Self {
        Self {
            reference,
            relation,
            gap,
            offset: Vector2D::zero(),
        }
    }

    pub fn below(reference: impl Into<ElementId>, gap: f64) -> Self {
        Self::new(Anchor::Element(reference.into()), Relation::Below, gap)
    }

    pub fn above(reference: impl Into<ElementId>, gap: f64) -> Self {
        Self::new(Anchor::Element(reference.into()), Relation::Above, gap)
    }

    pub fn left_of(reference: impl Into<ElementId>, gap: f64) -> Self {
        Self::new(Anchor::Element(reference.into()), Relation::LeftOf, gap)
    }

    pub fn right_of(reference: impl Into<ElementId>, gap: f64) -> Self {
        Self::new(Anchor::Element(reference.into()), Relation::RightOf, gap)
    }

    pub fn center_of(reference: impl Into<ElementId>) -> Self {
        Self::new(Anchor::Element(reference.into()), Relation::CenterOf, 0.0)
    }

    /// Diagonal neighbour of an element, e.g. a label up and to the right of a dot.
    pub fn beside_corner(reference: impl Into<ElementId>, corner: Corner, gap: f64) -> Self {
        Self::new(
            Anchor::Element(reference.into()),
            Relation::OutsideCorner(corner),
            gap,
        )
    }

    /// Inside the frame against an edge.
    pub fn to_edge(edge: Edge, gap: f64) -> Self {
        Self::new(Anchor::Frame, Relation::InsideEdge(edge), gap)
    }

    /// Inside a frame corner.
    pub fn to_corner(corner: Corner, gap: f64) -> Self {
        Self::new(Anchor::Frame, Relation::Corner(corner), gap)
    }

    pub fn frame_center() -> Self {
        Self::new(Anchor::Frame, Relation::CenterOf, 0.0)
    }

    /// Top-left corner of the target exactly at a frame point.
    pub fn origin_at(point: Point2D) -> Self {
        Self::new(
            Anchor::FramePoint(point),
            Relation::Corner(Corner::TopLeft),
            0.0,
        )
    }

    /// Target centered on a frame point.
    pub fn centered_at(point: Point2D) -> Self {
        Self::new(Anchor::FramePoint(point), Relation::CenterOf, 0.0)
    }

    /// Target centered on a data-space point.
    pub fn at_data(point: Point2D) -> Self {
        Self::new(Anchor::DataPoint(point), Relation::CenterOf, 0.0)
    }

    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset = Vector2D::new(dx, dy);
        self
    }

    /// The element or group this constraint depends on, if any.
    pub fn reference_id(&self) -> Option<&ElementId> {
        match &self.reference {
            Anchor::Element(id) => Some(id),
            _ => None,
        }
    }

    /// Reject non-finite numbers before any geometry is computed.
    pub fn check(&self) -> ChoreoResult<()> {
        let point_ok = match &self.reference {
            Anchor::FramePoint(p) | Anchor::DataPoint(p) => p.is_finite(),
            _ => true,
        };
        if !self.gap.is_finite() || !self.offset.is_finite() || !point_ok {
            return Err(ChoreoError::InvalidArgument(format!(
                "constraint relative to {} has a non-finite gap, offset, or point",
                self.reference
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for AnchorConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {} (gap {})", self.relation, self.reference, self.gap)
    }
}

/// The frame rectangle and optional data mapping that anchors resolve against.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub frame: Rect,
    pub coordinates: Option<CoordinateSystem>,
}

impl Stage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            frame: Rect::new(0.0, 0.0, width, height),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, coordinates: CoordinateSystem) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// The frame-space box an anchor stands for.
    pub fn reference_box(&self, anchor: &Anchor, registry: &Registry) -> ChoreoResult<Rect> {
        match anchor {
            Anchor::Element(id) => registry.reference_bounds(id.as_str()),
            Anchor::Frame => Ok(self.frame),
            Anchor::FramePoint(p) => Ok(Rect::at_point(*p)),
            Anchor::DataPoint(p) => {
                let cs = self.coordinates.as_ref().ok_or_else(|| {
                    ChoreoError::Configuration(
                        "data-space anchor used but no coordinate system is configured".into(),
                    )
                })?;
                Ok(Rect::at_point(cs.to_frame(*p)))
            }
        }
    }
}

/// Compute the target origin (top-left) for a box of `target` size.
///
/// The reference must already be shown and positioned; anything else fails
/// with `UnresolvedReference`, which keeps resolution acyclic.
pub fn resolve(
    constraint: &AnchorConstraint,
    target: Size2D,
    registry: &Registry,
    stage: &Stage,
) -> ChoreoResult<Point2D> {
    constraint.check()?;
    let reference = stage.reference_box(&constraint.reference, registry)?;
    let origin = place(&reference, target, constraint.relation, constraint.gap) + constraint.offset;
    if !origin.is_finite() {
        return Err(ChoreoError::InvalidArgument(format!(
            "constraint {} resolves to a non-finite position",
            constraint
        )));
    }
    Ok(origin)
}

/// Pure placement math against a resolved reference box.
pub fn place(reference: &Rect, target: Size2D, relation: Relation, gap: f64) -> Point2D {
    let (w, h) = (target.width, target.height);
    let center = reference.center();
    let centered_x = center.x - w / 2.0;
    let centered_y = center.y - h / 2.0;

    match relation {
        Relation::Above => Point2D::new(centered_x, reference.top() - h - gap),
        Relation::Below => Point2D::new(centered_x, reference.bottom() + gap),
        Relation::LeftOf => Point2D::new(reference.left() - w - gap, centered_y),
        Relation::RightOf => Point2D::new(reference.right() + gap, centered_y),
        Relation::CenterOf => Point2D::new(centered_x, centered_y),
        Relation::Corner(corner) => {
            let x = if corner.is_left() {
                reference.left() + gap
            } else {
                reference.right() - w - gap
            };
            let y = if corner.is_top() {
                reference.top() + gap
            } else {
                reference.bottom() - h - gap
            };
            Point2D::new(x, y)
        }
        Relation::InsideEdge(edge) => match edge {
            Edge::Top => Point2D::new(centered_x, reference.top() + gap),
            Edge::Bottom => Point2D::new(centered_x, reference.bottom() - h - gap),
            Edge::Left => Point2D::new(reference.left() + gap, centered_y),
            Edge::Right => Point2D::new(reference.right() - w - gap, centered_y),
        },
        Relation::OutsideCorner(corner) => {
            let x = if corner.is_left() {
                reference.left() - w - gap
            } else {
                reference.right() + gap
            };
            let y = if corner.is_top() {
                reference.top() - h - gap
            } else {
                reference.bottom() + gap
            };
            Point2D::new(x, y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::DataBounds;
    use crate::element::ElementKind;

    fn stage() -> Stage {
        Stage::new(1920.0, 1080.0)
    }

    fn with_a() -> Registry {
        let mut reg = Registry::new();
        reg.create(ElementId::new("a"), ElementKind::Text, "A", Size2D::new(100.0, 40.0))
            .unwrap();
        reg.set_position("a", Point2D::new(0.0, 0.0)).unwrap();
        reg
    }

    #[test]
    fn test_below_centers_horizontally() {
        let reg = with_a();
        let p = resolve(
            &AnchorConstraint::below("a", 10.0),
            Size2D::new(60.0, 20.0),
            &reg,
            &stage(),
        )
        .unwrap();
        assert!((p.y - 50.0).abs() < 0.001);
        assert!((p.x - 20.0).abs() < 0.001); // 50 - 60/2
    }

    #[test]
    fn test_outside_relations_keep_exact_gap() {
        let reference = Rect::new(200.0, 300.0, 120.0, 80.0);
        let target = Size2D::new(50.0, 30.0);
        for gap in [0.0, 4.5, 25.0] {
            let above = Rect::from_origin_size(place(&reference, target, Relation::Above, gap), target);
            let below = Rect::from_origin_size(place(&reference, target, Relation::Below, gap), target);
            let left = Rect::from_origin_size(place(&reference, target, Relation::LeftOf, gap), target);
            let right = Rect::from_origin_size(place(&reference, target, Relation::RightOf, gap), target);
            for r in [above, below, left, right] {
                assert!(!r.intersects(&reference));
            }
            assert!((reference.top() - above.bottom() - gap).abs() < 1e-9);
            assert!((below.top() - reference.bottom() - gap).abs() < 1e-9);
            assert!((reference.left() - left.right() - gap).abs() < 1e-9);
            assert!((right.left() - reference.right() - gap).abs() < 1e-9);
        }
    }

    #[test]
    fn test_frame_corners() {
        let reg = Registry::new();
        let size = Size2D::new(100.0, 50.0);
        let tr = resolve(&AnchorConstraint::to_corner(Corner::TopRight, 20.0), size, &reg, &stage()).unwrap();
        assert_eq!(tr, Point2D::new(1800.0, 20.0));
        let bl = resolve(&AnchorConstraint::to_corner(Corner::BottomLeft, 20.0), size, &reg, &stage()).unwrap();
        assert_eq!(bl, Point2D::new(20.0, 1010.0));
    }

    #[test]
    fn test_to_edge_top() {
        let reg = Registry::new();
        let p = resolve(
            &AnchorConstraint::to_edge(Edge::Top, 30.0),
            Size2D::new(400.0, 60.0),
            &reg,
            &stage(),
        )
        .unwrap();
        assert_eq!(p, Point2D::new(760.0, 30.0));
    }

    #[test]
    fn test_outside_corner_is_diagonal() {
        let dot = Rect::new(100.0, 100.0, 10.0, 10.0);
        let p = place(&dot, Size2D::new(40.0, 20.0), Relation::OutsideCorner(Corner::TopRight), 5.0);
        assert_eq!(p, Point2D::new(115.0, 75.0));
        let q = place(&dot, Size2D::new(40.0, 20.0), Relation::OutsideCorner(Corner::BottomLeft), 5.0);
        assert_eq!(q, Point2D::new(55.0, 115.0));
    }

    #[test]
    fn test_origin_at_and_offset() {
        let reg = Registry::new();
        let c = AnchorConstraint::origin_at(Point2D::new(0.0, 0.0)).with_offset(5.0, -5.0);
        let p = resolve(&c, Size2D::new(100.0, 40.0), &reg, &stage()).unwrap();
        assert_eq!(p, Point2D::new(5.0, -5.0));
    }

    #[test]
    fn test_unplaced_reference_is_unresolved() {
        let mut reg = Registry::new();
        reg.create(ElementId::new("a"), ElementKind::Text, "A", Size2D::new(10.0, 10.0))
            .unwrap();
        let err = resolve(&AnchorConstraint::below("a", 1.0), Size2D::zero(), &reg, &stage())
            .unwrap_err();
        assert!(matches!(err, ChoreoError::UnresolvedReference { ref reference } if reference == "a"));
    }

    #[test]
    fn test_never_shown_reference_is_unresolved() {
        let reg = Registry::new();
        let err = resolve(&AnchorConstraint::below("nope", 1.0), Size2D::zero(), &reg, &stage())
            .unwrap_err();
        assert!(matches!(err, ChoreoError::UnresolvedReference { ref reference } if reference == "nope"));
    }

    #[test]
    fn test_overflowing_position_rejected() {
        let mut reg = Registry::new();
        reg.create(ElementId::new("far"), ElementKind::Shape, "", Size2D::new(1e307, 10.0))
            .unwrap();
        reg.set_position("far", Point2D::new(1e308, 0.0)).unwrap();
        let err = resolve(&AnchorConstraint::right_of("far", 1e308), Size2D::new(1.0, 1.0), &reg, &stage())
            .unwrap_err();
        assert!(matches!(err, ChoreoError::InvalidArgument(_)));
    }

    #[test]
    fn test_group_reference_uses_union_box() {
        let mut reg = with_a();
        reg.create(ElementId::new("b"), ElementKind::Text, "B", Size2D::new(100.0, 40.0))
            .unwrap();
        reg.set_position("b", Point2D::new(200.0, 100.0)).unwrap();
        reg.define_group(ElementId::new("g"), &[ElementId::new("a"), ElementId::new("b")])
            .unwrap();
        let p = resolve(
            &AnchorConstraint::below("g", 10.0),
            Size2D::new(100.0, 10.0),
            &reg,
            &stage(),
        )
        .unwrap();
        // union is (0,0)-(300,140)
        assert_eq!(p, Point2D::new(100.0, 150.0));
    }

    #[test]
    fn test_data_point_anchor() {
        let reg = Registry::new();
        let cs = CoordinateSystem::configure(
            DataBounds::new(0.0, 10.0, 0.0, 10.0),
            Rect::new(0.0, 0.0, 500.0, 500.0),
        )
        .unwrap();
        let stage = Stage::new(500.0, 500.0).with_coordinates(cs);
        let p = resolve(
            &AnchorConstraint::at_data(Point2D::new(5.0, 5.0)),
            Size2D::new(10.0, 10.0),
            &reg,
            &stage,
        )
        .unwrap();
        assert_eq!(p, Point2D::new(245.0, 245.0));
    }

    #[test]
    fn test_data_point_without_coordinates() {
        let reg = Registry::new();
        let err = resolve(
            &AnchorConstraint::at_data(Point2D::new(1.0, 1.0)),
            Size2D::zero(),
            &reg,
            &stage(),
        )
        .unwrap_err();
        assert!(matches!(err, ChoreoError::Configuration(_)));
    }

    #[test]
    fn test_non_finite_gap_rejected() {
        let reg = with_a();
        let err = resolve(
            &AnchorConstraint::below("a", f64::NAN),
            Size2D::zero(),
            &reg,
            &stage(),
        )
        .unwrap_err();
        assert!(matches!(err, ChoreoError::InvalidArgument(_)));
    }

    #[test]
    fn test_constraint_serde_shape() {
        let c: AnchorConstraint = serde_json::from_str(
            r#"{"reference": {"element": "title"}, "relation": "below", "gap": 12.0}"#,
        )
        .unwrap();
        assert_eq!(c, AnchorConstraint::below("title", 12.0));
        let corner: AnchorConstraint = serde_json::from_str(
            r#"{"reference": "frame", "relation": {"corner": "top_right"}, "gap": 0.3}"#,
        )
        .unwrap();
        assert_eq!(corner.relation, Relation::Corner(Corner::TopRight));
    }
}
