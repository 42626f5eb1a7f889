use choreo_core::{Duration, Size2D};

use crate::element::{ElementId, ElementKind, ElementSpec, SizeSpec};
use crate::layout::AnchorConstraint;
use crate::script::SceneScript;
use crate::step::{HighlightStyle, Step};

/// A builder for writing scene scripts programmatically.
/// Useful for SDKs, generated lessons, and unit testing.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    steps: Vec<Step>,
    run_time: Option<Duration>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run time attached to every animated step added after this call.
    pub fn run_time(&mut self, seconds: f64) -> &mut Self {
        self.run_time = Some(Duration::from_seconds(seconds));
        self
    }

    fn show_spec(&mut self, id: &str, spec: ElementSpec, constraint: Option<AnchorConstraint>) -> &mut Self {
        self.steps.push(Step::Show {
            target: ElementId::new(id),
            element: Some(spec),
            constraint,
            run_time: self.run_time,
        });
        self
    }

    pub fn show_text(&mut self, id: &str, text: &str, constraint: AnchorConstraint) -> &mut Self {
        self.show_spec(id, ElementSpec::text(text), Some(constraint))
    }

    pub fn show_formula(&mut self, id: &str, formula: &str, constraint: AnchorConstraint) -> &mut Self {
        self.show_spec(id, ElementSpec::formula(formula), Some(constraint))
    }

    pub fn show_shape(&mut self, id: &str, shape: &str, size: Size2D, constraint: AnchorConstraint) -> &mut Self {
        self.show_spec(id, ElementSpec::shape(shape, size), Some(constraint))
    }

    /// A line of the given length.
    pub fn show_line(&mut self, id: &str, length: f64, constraint: AnchorConstraint) -> &mut Self {
        let spec = ElementSpec::new(ElementKind::Line, "line")
            .with_size(SizeSpec::Fixed(Size2D::new(length, 0.0)));
        self.show_spec(id, spec, Some(constraint))
    }

    /// A box drawn around an existing element or group.
    pub fn surround(&mut self, id: &str, reference: &str, padding: f64) -> &mut Self {
        let spec = ElementSpec::new(ElementKind::Shape, "surrounding_rectangle").with_size(
            SizeSpec::Surround {
                reference: ElementId::new(reference),
                padding,
            },
        );
        self.show_spec(id, spec, None)
    }

    /// Show an element created from an existing one; it joins that element's group.
    pub fn show_derived(&mut self, id: &str, parent: &str, spec: ElementSpec, constraint: AnchorConstraint) -> &mut Self {
        self.show_spec(id, spec.derived_from(parent), Some(constraint))
    }

    /// Reveal an element or group that already exists, optionally re-positioning it.
    pub fn reveal(&mut self, id: &str, constraint: Option<AnchorConstraint>) -> &mut Self {
        self.steps.push(Step::Show {
            target: ElementId::new(id),
            element: None,
            constraint,
            run_time: self.run_time,
        });
        self
    }

    pub fn transform(&mut self, id: &str, constraint: AnchorConstraint) -> &mut Self {
        self.steps.push(Step::Transform {
            target: ElementId::new(id),
            constraint: Some(constraint),
            content: None,
            run_time: self.run_time,
        });
        self
    }

    /// Replace an element's content in place, optionally re-positioning it.
    pub fn morph(&mut self, id: &str, content: &str, constraint: Option<AnchorConstraint>) -> &mut Self {
        self.steps.push(Step::Transform {
            target: ElementId::new(id),
            constraint,
            content: Some(content.to_string()),
            run_time: self.run_time,
        });
        self
    }

    pub fn highlight(&mut self, ids: &[&str], style: HighlightStyle) -> &mut Self {
        self.steps.push(Step::Highlight {
            targets: ids.iter().map(|id| ElementId::new(*id)).collect(),
            style,
            run_time: self.run_time,
        });
        self
    }

    pub fn hide(&mut self, ids: &[&str]) -> &mut Self {
        self.steps.push(Step::Hide {
            targets: ids.iter().map(|id| ElementId::new(*id)).collect(),
            run_time: self.run_time,
        });
        self
    }

    pub fn pause(&mut self, seconds: f64) -> &mut Self {
        self.steps.push(Step::pause(seconds));
        self
    }

    pub fn group(&mut self, id: &str, members: &[&str]) -> &mut Self {
        self.steps.push(Step::Group {
            id: ElementId::new(id),
            members: members.iter().map(|m| ElementId::new(*m)).collect(),
        });
        self
    }

    /// Append a prepared step as is.
    pub fn step(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn build(self) -> Vec<Step> {
        self.steps
    }

    pub fn build_script(self) -> SceneScript {
        SceneScript::new(self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Edge;

    #[test]
    fn test_builder_orders_steps() {
        let mut b = ScriptBuilder::new();
        b.show_text("title", "Problem", AnchorConstraint::to_edge(Edge::Top, 20.0))
            .show_formula("eq", "x + 1 = 3", AnchorConstraint::below("title", 10.0))
            .group("all", &["title", "eq"])
            .pause(1.0)
            .hide(&["all"]);
        let ops: Vec<&str> = b.steps.iter().map(|s| s.op_name()).collect();
        assert_eq!(ops, vec!["show", "show", "group", "pause", "hide"]);
        assert_eq!(b.len(), 5);
    }

    #[test]
    fn test_run_time_applies_to_later_animated_steps() {
        let mut b = ScriptBuilder::new();
        b.show_text("a", "a", AnchorConstraint::frame_center())
            .run_time(0.25)
            .morph("a", "b", None)
            .pause(2.0);
        let steps = b.build();
        assert_eq!(steps[0].run_time(), None);
        assert_eq!(steps[1].run_time(), Some(Duration::from_seconds(0.25)));
        assert_eq!(steps[2].run_time(), None);
    }

    #[test]
    fn test_surround_has_no_constraint() {
        let mut b = ScriptBuilder::new();
        b.surround("box", "answer", 8.0);
        match &b.build()[0] {
            Step::Show {
                element: Some(spec),
                constraint,
                ..
            } => {
                assert!(constraint.is_none());
                assert!(matches!(spec.size, SizeSpec::Surround { padding, .. } if padding == 8.0));
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_show_derived_records_parent() {
        let mut b = ScriptBuilder::new();
        b.show_derived(
            "eq2",
            "eq",
            ElementSpec::formula("x = 2"),
            AnchorConstraint::below("eq", 5.0),
        );
        match &b.build()[0] {
            Step::Show {
                element: Some(spec), ..
            } => assert_eq!(spec.derived_from, Some(ElementId::new("eq"))),
            other => panic!("unexpected step {:?}", other),
        }
    }
}
