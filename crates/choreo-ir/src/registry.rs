use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use choreo_core::{ChoreoError, ChoreoResult, Point2D, Rect, Size2D};

use crate::element::{ElementId, ElementKind, VisualElement};
use crate::group::Group;

/// A change made to the registry, in the order it happened.
/// The sequencer turns these into render instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeRecord {
    /// First positioning of an element.
    Placed {
        id: ElementId,
        kind: ElementKind,
        content: String,
        rect: Rect,
    },
    Moved {
        id: ElementId,
        rect: Rect,
    },
    /// Content (and therefore size) replaced in place.
    Morphed {
        id: ElementId,
        content: String,
        rect: Rect,
    },
    Visibility {
        id: ElementId,
        visible: bool,
    },
}

/// Uniform read-only view of an element or a group.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementView {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Frame-space box; the union of member boxes for groups.
    pub bounds: Option<Rect>,
    /// For groups: whether any member is visible.
    pub visible: bool,
}

/// Owns every element and group of one scene.
///
/// Mutation is single-writer (the sequencer); every effective mutation is
/// journaled as a [`ChangeRecord`]. Writes that change nothing are not journaled.
#[derive(Debug, Default)]
pub struct Registry {
    elements: HashMap<ElementId, VisualElement>,
    order: Vec<ElementId>,
    pub(crate) groups: HashMap<ElementId, Group>,
    journal: Vec<ChangeRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, unplaced, invisible element.
    pub fn create(
        &mut self,
        id: ElementId,
        kind: ElementKind,
        content: impl Into<String>,
        size: Size2D,
    ) -> ChoreoResult<&VisualElement> {
        if self.contains(id.as_str()) {
            return Err(ChoreoError::DuplicateId(id.0));
        }
        if kind == ElementKind::Group {
            return Err(ChoreoError::InvalidArgument(format!(
                "'{}': groups are defined from existing elements, not created directly",
                id
            )));
        }
        check_size(&id, size)?;
        self.order.push(id.clone());
        let element = self
            .elements
            .entry(id.clone())
            .or_insert_with(|| VisualElement::new(id, kind, content, size));
        Ok(&*element)
    }

    /// Whether `id` names an element or a group.
    pub fn contains(&self, id: &str) -> bool {
        let key = ElementId::new(id);
        self.elements.contains_key(&key) || self.groups.contains_key(&key)
    }

    pub fn is_group(&self, id: &str) -> bool {
        self.groups.contains_key(&ElementId::new(id))
    }

    pub fn get(&self, id: &str) -> ChoreoResult<&VisualElement> {
        self.elements
            .get(&ElementId::new(id))
            .ok_or_else(|| ChoreoError::UnknownElement(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> ChoreoResult<&mut VisualElement> {
        self.elements
            .get_mut(&ElementId::new(id))
            .ok_or_else(|| ChoreoError::UnknownElement(id.to_string()))
    }

    /// Elements in creation order.
    pub fn elements(&self) -> impl Iterator<Item = &VisualElement> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn set_position(&mut self, id: &str, point: Point2D) -> ChoreoResult<()> {
        if !point.is_finite() {
            return Err(ChoreoError::InvalidArgument(format!(
                "'{}': position must be finite",
                id
            )));
        }
        let element = self.get_mut(id)?;
        let record = match element.position {
            Some(prev) if prev == point => None,
            Some(_) => {
                element.position = Some(point);
                Some(ChangeRecord::Moved {
                    id: element.id.clone(),
                    rect: Rect::from_origin_size(point, element.size),
                })
            }
            None => {
                element.position = Some(point);
                Some(ChangeRecord::Placed {
                    id: element.id.clone(),
                    kind: element.kind,
                    content: element.content.clone(),
                    rect: Rect::from_origin_size(point, element.size),
                })
            }
        };
        self.journal.extend(record);
        Ok(())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> ChoreoResult<()> {
        let element = self.get_mut(id)?;
        if element.visible == visible {
            return Ok(());
        }
        element.visible = visible;
        let record = ChangeRecord::Visibility {
            id: element.id.clone(),
            visible,
        };
        self.journal.push(record);
        Ok(())
    }

    /// Replace an element's content and intrinsic size in place, keeping its
    /// identity. Journals a single record carrying the final box.
    pub fn morph(
        &mut self,
        id: &str,
        content: impl Into<String>,
        size: Size2D,
        origin: Point2D,
    ) -> ChoreoResult<()> {
        if !origin.is_finite() {
            return Err(ChoreoError::InvalidArgument(format!(
                "'{}': position must be finite",
                id
            )));
        }
        let element = self.get_mut(id)?;
        check_size(&element.id, size)?;
        let was_placed = element.is_placed();
        element.content = content.into();
        element.size = size;
        element.position = Some(origin);
        let rect = Rect::from_origin_size(origin, size);
        let record = if was_placed {
            ChangeRecord::Morphed {
                id: element.id.clone(),
                content: element.content.clone(),
                rect,
            }
        } else {
            ChangeRecord::Placed {
                id: element.id.clone(),
                kind: element.kind,
                content: element.content.clone(),
                rect,
            }
        };
        self.journal.push(record);
        Ok(())
    }

    pub(crate) fn set_parent(&mut self, id: &str, parent: ElementId) -> ChoreoResult<()> {
        self.get_mut(id)?.parent = Some(parent);
        Ok(())
    }

    pub(crate) fn set_owner(&mut self, id: &ElementId, group: &ElementId) {
        if let Some(element) = self.elements.get_mut(id) {
            element.group = Some(group.clone());
        }
    }

    /// Frame-space box of an element, or the union box of a group.
    pub fn bounds(&self, id: &str) -> ChoreoResult<Rect> {
        if self.is_group(id) {
            return self.bounding_box(id);
        }
        self.get(id)?
            .bounds()
            .ok_or_else(|| ChoreoError::unresolved(id))
    }

    /// Box of an element or group used as an anchor. An id no step has shown
    /// yet is an unresolved reference, not an unknown target.
    pub fn reference_bounds(&self, id: &str) -> ChoreoResult<Rect> {
        if !self.contains(id) {
            return Err(ChoreoError::unresolved(id));
        }
        self.bounds(id)
    }

    /// The element ids a step targeting `id` applies to: the element itself,
    /// or every member of a group.
    pub fn expand(&self, id: &str) -> ChoreoResult<Vec<ElementId>> {
        if let Some(group) = self.groups.get(&ElementId::new(id)) {
            return Ok(group.members.clone());
        }
        Ok(vec![self.get(id)?.id.clone()])
    }

    pub fn view(&self, id: &str) -> ChoreoResult<ElementView> {
        if let Some(group) = self.groups.get(&ElementId::new(id)) {
            let visible = group
                .members
                .iter()
                .filter_map(|m| self.elements.get(m))
                .any(|e| e.visible);
            return Ok(ElementView {
                id: group.id.clone(),
                kind: ElementKind::Group,
                bounds: self.bounding_box(id).ok(),
                visible,
            });
        }
        let element = self.get(id)?;
        Ok(ElementView {
            id: element.id.clone(),
            kind: element.kind,
            bounds: element.bounds(),
            visible: element.visible,
        })
    }

    /// Drain the change journal.
    pub fn take_changes(&mut self) -> Vec<ChangeRecord> {
        std::mem::take(&mut self.journal)
    }
}

fn check_size(id: &ElementId, size: Size2D) -> ChoreoResult<()> {
    if !size.is_valid() {
        return Err(ChoreoError::InvalidArgument(format!(
            "'{}': size must be finite and non-negative (got {} x {})",
            id, size.width, size.height
        )));
    }
    Ok(())
}
