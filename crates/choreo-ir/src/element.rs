use serde::{Deserialize, Serialize};

use choreo_core::{Point2D, Rect, Size2D};

/// Unique identifier for an element or a group. Both share one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The kind of content an element holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Plain text.
    Text,
    /// A typeset formula.
    Formula,
    /// A geometric shape (rectangle, polygon, dot, axes).
    Shape,
    /// A line segment or arrow.
    Line,
    /// A composite of other elements. Only groups report this kind.
    Group,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Text => write!(f, "text"),
            ElementKind::Formula => write!(f, "formula"),
            ElementKind::Shape => write!(f, "shape"),
            ElementKind::Line => write!(f, "line"),
            ElementKind::Group => write!(f, "group"),
        }
    }
}

/// How a newly created element obtains its intrinsic size.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSpec {
    /// Ask the measure collaborator.
    #[default]
    Measured,
    /// Explicit size; the collaborator is not consulted.
    Fixed(Size2D),
    /// Measure, then scale proportionally to this width.
    FitWidth(f64),
    /// Enclose another element's (or group's) current box plus padding.
    Surround { reference: ElementId, padding: f64 },
}

/// Everything needed to create an element the first time it is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub kind: ElementKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub size: SizeSpec,
    /// The element this one is derived from; it joins that element's owning group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<ElementId>,
}

impl ElementSpec {
    pub fn new(kind: ElementKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            size: SizeSpec::Measured,
            derived_from: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ElementKind::Text, content)
    }

    pub fn formula(content: impl Into<String>) -> Self {
        Self::new(ElementKind::Formula, content)
    }

    pub fn shape(content: impl Into<String>, size: Size2D) -> Self {
        Self::new(ElementKind::Shape, content).with_size(SizeSpec::Fixed(size))
    }

    pub fn with_size(mut self, size: SizeSpec) -> Self {
        self.size = size;
        self
    }

    pub fn derived_from(mut self, parent: impl Into<ElementId>) -> Self {
        self.derived_from = Some(parent.into());
        self
    }
}

/// A placed (or not yet placed) visual element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualElement {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Opaque payload (text, formula source, shape descriptor).
    pub content: String,
    /// Intrinsic size in frame units.
    pub size: Size2D,
    /// Top-left corner in frame space; `None` until a step positions it.
    pub position: Option<Point2D>,
    pub visible: bool,
    /// Most recent group that took ownership of this element.
    pub group: Option<ElementId>,
    /// Element this one was derived from.
    pub parent: Option<ElementId>,
}

impl VisualElement {
    pub fn new(id: ElementId, kind: ElementKind, content: impl Into<String>, size: Size2D) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            size,
            position: None,
            visible: false,
            group: None,
            parent: None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// The element's frame-space box, once positioned.
    pub fn bounds(&self) -> Option<Rect> {
        self.position
            .map(|origin| Rect::from_origin_size(origin, self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_creation() {
        let el = VisualElement::new(
            ElementId::new("title"),
            ElementKind::Text,
            "Problem 174",
            Size2D::new(100.0, 40.0),
        );
        assert_eq!(el.id.as_str(), "title");
        assert!(!el.visible);
        assert!(!el.is_placed());
        assert!(el.bounds().is_none());
    }

    #[test]
    fn test_element_bounds() {
        let mut el = VisualElement::new(
            ElementId::new("box"),
            ElementKind::Shape,
            "rect",
            Size2D::new(20.0, 10.0),
        );
        el.position = Some(Point2D::new(5.0, 5.0));
        assert_eq!(el.bounds(), Some(Rect::new(5.0, 5.0, 20.0, 10.0)));
    }

    #[test]
    fn test_spec_serde_defaults() {
        let spec: ElementSpec = serde_json::from_str(r#"{"kind": "formula"}"#).unwrap();
        assert_eq!(spec.kind, ElementKind::Formula);
        assert_eq!(spec.size, SizeSpec::Measured);
        assert!(spec.content.is_empty());
        assert!(spec.derived_from.is_none());
    }

    #[test]
    fn test_element_id_serializes_as_string() {
        let json = serde_json::to_string(&ElementId::new("dot_a")).unwrap();
        assert_eq!(json, "\"dot_a\"");
    }
}
