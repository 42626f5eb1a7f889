use serde::{Deserialize, Serialize};

use choreo_core::{Color, Duration};

use crate::element::{ElementId, ElementSpec};
use crate::layout::AnchorConstraint;

/// Visual treatment requested by a highlight step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightEffect {
    /// Briefly scale and tint the target.
    #[default]
    Indicate,
    /// Trace a rectangle around the target.
    Circumscribe,
    /// Draw a line under the target.
    Underline,
    Flash,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightStyle {
    #[serde(default)]
    pub effect: HighlightEffect,
    #[serde(default)]
    pub color: Color,
    /// Space between the target box and the decoration.
    #[serde(default)]
    pub padding: f64,
}

impl HighlightStyle {
    pub fn new(effect: HighlightEffect, color: Color) -> Self {
        Self {
            effect,
            color,
            padding: 0.0,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::new(HighlightEffect::Indicate, Color::YELLOW)
    }
}

/// One timeline entry. Steps run strictly in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Position (when a constraint is given) and reveal an element or group.
    /// `element` creates the element on first use.
    Show {
        target: ElementId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<ElementSpec>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraint: Option<AnchorConstraint>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_time: Option<Duration>,
    },
    /// Re-position and/or replace content in place, preserving identity.
    Transform {
        target: ElementId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraint: Option<AnchorConstraint>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_time: Option<Duration>,
    },
    /// Decorate without touching layout.
    Highlight {
        targets: Vec<ElementId>,
        #[serde(default)]
        style: HighlightStyle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_time: Option<Duration>,
    },
    /// Hide elements or groups; records are kept.
    Hide {
        targets: Vec<ElementId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_time: Option<Duration>,
    },
    /// Advance the logical clock.
    Pause { duration: Duration },
    /// Define a named group from existing elements or groups.
    Group { id: ElementId, members: Vec<ElementId> },
}

impl Step {
    /// Short operation name used in logs and errors.
    pub fn op_name(&self) -> &'static str {
        match self {
            Step::Show { .. } => "show",
            Step::Transform { .. } => "transform",
            Step::Highlight { .. } => "highlight",
            Step::Hide { .. } => "hide",
            Step::Pause { .. } => "pause",
            Step::Group { .. } => "group",
        }
    }

    /// The constraint this step resolves, if any.
    pub fn constraint(&self) -> Option<&AnchorConstraint> {
        match self {
            Step::Show { constraint, .. } | Step::Transform { constraint, .. } => {
                constraint.as_ref()
            }
            _ => None,
        }
    }

    /// The run time the step asked for, if it is an animated step.
    pub fn run_time(&self) -> Option<Duration> {
        match self {
            Step::Show { run_time, .. }
            | Step::Transform { run_time, .. }
            | Step::Highlight { run_time, .. }
            | Step::Hide { run_time, .. } => *run_time,
            Step::Pause { .. } | Step::Group { .. } => None,
        }
    }

    /// Whether the step occupies animation time.
    pub fn is_animated(&self) -> bool {
        !matches!(self, Step::Pause { .. } | Step::Group { .. })
    }

    pub fn show(target: impl Into<ElementId>, element: ElementSpec, constraint: AnchorConstraint) -> Self {
        Step::Show {
            target: target.into(),
            element: Some(element),
            constraint: Some(constraint),
            run_time: None,
        }
    }

    /// Reveal an already registered element or group where it last was.
    pub fn reveal(target: impl Into<ElementId>) -> Self {
        Step::Show {
            target: target.into(),
            element: None,
            constraint: None,
            run_time: None,
        }
    }

    pub fn hide<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ElementId>,
    {
        Step::Hide {
            targets: targets.into_iter().map(Into::into).collect(),
            run_time: None,
        }
    }

    pub fn pause(seconds: f64) -> Self {
        Step::Pause {
            duration: Duration::from_seconds(seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn test_step_json_tagging() {
        let step: Step = serde_json::from_str(
            r#"{
                "op": "show",
                "target": "title",
                "element": {"kind": "text", "content": "Problem 174"},
                "constraint": {"reference": "frame", "relation": {"inside_edge": "top"}, "gap": 20.0},
                "run_time": 0.5
            }"#,
        )
        .unwrap();
        match &step {
            Step::Show {
                target,
                element,
                run_time,
                ..
            } => {
                assert_eq!(target.as_str(), "title");
                assert_eq!(element.as_ref().map(|e| e.kind), Some(ElementKind::Text));
                assert_eq!(*run_time, Some(Duration::from_seconds(0.5)));
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(step.op_name(), "show");
        assert!(step.constraint().is_some());
    }

    #[test]
    fn test_pause_and_group_are_not_animated() {
        assert!(!Step::pause(1.0).is_animated());
        let group = Step::Group {
            id: ElementId::new("g"),
            members: vec![ElementId::new("a")],
        };
        assert!(!group.is_animated());
        assert!(group.run_time().is_none());
        assert!(Step::hide(["a"]).is_animated());
    }

    #[test]
    fn test_highlight_style_defaults() {
        let step: Step =
            serde_json::from_str(r#"{"op": "highlight", "targets": ["answer"]}"#).unwrap();
        match step {
            Step::Highlight { style, .. } => {
                assert_eq!(style.effect, HighlightEffect::Indicate);
                assert_eq!(style.color, Color::YELLOW);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_negative_pause_rejected_by_serde() {
        let res = serde_json::from_str::<Step>(r#"{"op": "pause", "duration": -1.0}"#);
        assert!(res.is_err());
    }
}
