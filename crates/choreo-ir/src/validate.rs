use std::collections::{HashMap, HashSet};

use choreo_core::ChoreoError;

use crate::element::{ElementId, ElementKind, SizeSpec};
use crate::step::Step;

/// A problem found in a script before it runs.
#[derive(Debug, thiserror::Error)]
#[error("step {index}: {error}")]
pub struct ScriptIssue {
    pub index: usize,
    #[source]
    pub error: ChoreoError,
}

/// What the checker knows about one id at a point in the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Known {
    Element,
    Group,
}

/// Statically check a step list without laying anything out.
///
/// Tracks which ids exist after each step and reports references to ids not
/// yet introduced, duplicate group ids, empty target lists, and non-finite
/// numbers. Geometry (placement, unplaced references) is left to the sequencer.
pub fn validate_script(steps: &[Step]) -> Result<(), Vec<ScriptIssue>> {
    let mut known: HashMap<ElementId, Known> = HashMap::new();
    let mut errors = Vec::new();

    for (index, step) in steps.iter().enumerate() {
        let mut report = |error: ChoreoError| errors.push(ScriptIssue { index, error });

        let timing = match step {
            Step::Pause { duration } => Some(*duration),
            _ => step.run_time(),
        };
        if timing.is_some_and(|d| !d.as_seconds().is_finite()) {
            report(ChoreoError::InvalidArgument(format!(
                "{} duration must be finite",
                step.op_name()
            )));
        }

        if let Some(c) = step.constraint() {
            if let Err(e) = c.check() {
                report(e);
            }
            if let Some(reference) = c.reference_id() {
                if !known.contains_key(reference) {
                    report(ChoreoError::unresolved(reference.as_str()));
                }
            }
        }

        match step {
            Step::Show {
                target,
                element,
                constraint,
                ..
            } => match (known.get(target), element) {
                (None, Some(spec)) => {
                    if spec.kind == ElementKind::Group {
                        report(ChoreoError::InvalidArgument(format!(
                            "'{}': groups are defined with a group step",
                            target
                        )));
                    }
                    if let SizeSpec::Surround { reference, .. } = &spec.size {
                        if !known.contains_key(reference) {
                            report(ChoreoError::unresolved(reference.as_str()));
                        }
                    }
                    if let Some(parent) = &spec.derived_from {
                        if known.get(parent) != Some(&Known::Element) {
                            report(ChoreoError::UnknownElement(parent.to_string()));
                        }
                    }
                    known.insert(target.clone(), Known::Element);
                }
                (None, None) => report(ChoreoError::UnknownElement(target.to_string())),
                (Some(_), _) => {
                    if constraint.as_ref().and_then(|c| c.reference_id()) == Some(target) {
                        report(ChoreoError::InvalidArgument(format!(
                            "'{}' cannot be shown relative to itself",
                            target
                        )));
                    }
                }
            },
            Step::Transform {
                target, content, ..
            } => match known.get(target) {
                None => report(ChoreoError::UnknownElement(target.to_string())),
                Some(Known::Group) if content.is_some() => {
                    report(ChoreoError::InvalidArgument(format!(
                        "'{}' is a group; only its members carry content",
                        target
                    )))
                }
                Some(_) => {}
            },
            Step::Highlight { targets, style, .. } => {
                if targets.is_empty() {
                    report(ChoreoError::InvalidArgument(
                        "highlight needs at least one target".into(),
                    ));
                }
                if !style.padding.is_finite() {
                    report(ChoreoError::InvalidArgument(
                        "highlight padding must be finite".into(),
                    ));
                }
                for t in targets.iter().filter(|t| !known.contains_key(*t)) {
                    report(ChoreoError::UnknownElement(t.to_string()));
                }
            }
            Step::Hide { targets, .. } => {
                if targets.is_empty() {
                    report(ChoreoError::InvalidArgument(
                        "hide needs at least one target".into(),
                    ));
                }
                for t in targets.iter().filter(|t| !known.contains_key(*t)) {
                    report(ChoreoError::UnknownElement(t.to_string()));
                }
            }
            Step::Pause { .. } => {}
            Step::Group { id, members } => {
                if known.contains_key(id) {
                    report(ChoreoError::DuplicateId(id.to_string()));
                    continue;
                }
                if members.is_empty() {
                    report(ChoreoError::empty_group(id.as_str(), "no members given"));
                    continue;
                }
                let mut seen = HashSet::new();
                let mut ok = true;
                for m in members {
                    if m == id || !known.contains_key(m) {
                        report(ChoreoError::empty_group(
                            id.as_str(),
                            format!("unknown member '{}'", m),
                        ));
                        ok = false;
                    } else if !seen.insert(m) {
                        tracing::debug!("group '{}' lists '{}' twice", id, m);
                    }
                }
                if ok {
                    known.insert(id.clone(), Known::Group);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
