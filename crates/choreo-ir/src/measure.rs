//! The measure collaborator: intrinsic sizes come from outside the engine.

use choreo_core::{MeasureConfig, Size2D};

use crate::element::ElementKind;

/// Reports the intrinsic frame-space size of a piece of content.
///
/// This is the only dependency injected into the engine. Real deployments
/// back it with font metrics or a typesetter; tests use closures.
pub trait Measure {
    fn measure(&self, kind: ElementKind, content: &str) -> Size2D;
}

impl<F> Measure for F
where
    F: Fn(ElementKind, &str) -> Size2D,
{
    fn measure(&self, kind: ElementKind, content: &str) -> Size2D {
        self(kind, content)
    }
}

/// Heuristic measurer: monospaced advance per character, one line box per
/// line of content.
#[derive(Debug, Clone)]
pub struct GlyphMeasure {
    config: MeasureConfig,
}

impl GlyphMeasure {
    pub fn new(config: MeasureConfig) -> Self {
        Self { config }
    }

    fn text_box(&self, content: &str, scale: f64) -> Size2D {
        let font = self.config.font_size * scale;
        let longest = content
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        let lines = content.lines().count().max(1);
        Size2D::new(
            longest as f64 * font * self.config.char_advance,
            lines as f64 * font * self.config.line_height,
        )
    }
}

impl Default for GlyphMeasure {
    fn default() -> Self {
        Self::new(MeasureConfig::default())
    }
}

impl Measure for GlyphMeasure {
    fn measure(&self, kind: ElementKind, content: &str) -> Size2D {
        match kind {
            ElementKind::Text => self.text_box(content, 1.0),
            ElementKind::Formula => self.text_box(content, self.config.formula_scale),
            // Shapes without an explicit size get a square one line tall.
            ElementKind::Shape | ElementKind::Group => {
                let side = self.config.font_size * self.config.line_height;
                Size2D::new(side, side)
            }
            ElementKind::Line => Size2D::new(
                self.config.font_size * self.config.line_height,
                self.config.line_thickness,
            ),
        }
    }
}
