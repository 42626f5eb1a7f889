//! Group composition: named, ordered sets of elements that lay out and
//! show/hide as one composite.

use serde::{Deserialize, Serialize};

use choreo_core::{ChoreoError, ChoreoResult, Point2D, Rect, Vector2D};

use crate::element::ElementId;
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: ElementId,
    /// Members in definition order, without duplicates.
    pub members: Vec<ElementId>,
}

impl Registry {
    /// Define a group. Member ids naming another group are flattened into
    /// that group's members.
    pub fn define_group(&mut self, id: ElementId, member_ids: &[ElementId]) -> ChoreoResult<&Group> {
        if self.contains(id.as_str()) {
            return Err(ChoreoError::DuplicateId(id.0));
        }
        if member_ids.is_empty() {
            return Err(ChoreoError::empty_group(id.0, "no members given"));
        }

        let mut members: Vec<ElementId> = Vec::with_capacity(member_ids.len());
        for member in member_ids {
            if member == &id {
                return Err(ChoreoError::empty_group(id.0, "a group cannot contain itself"));
            }
            let expanded = self.expand(member.as_str()).map_err(|_| {
                ChoreoError::empty_group(id.0.clone(), format!("unknown member '{}'", member))
            })?;
            for m in expanded {
                if !members.contains(&m) {
                    members.push(m);
                }
            }
        }

        for m in &members {
            self.set_owner(m, &id);
        }
        let group = self
            .groups
            .entry(id.clone())
            .or_insert(Group { id, members });
        Ok(&*group)
    }

    pub fn group(&self, id: &str) -> ChoreoResult<&Group> {
        self.groups
            .get(&ElementId::new(id))
            .ok_or_else(|| ChoreoError::UnknownElement(id.to_string()))
    }

    /// Union of every member box, visible or not.
    pub fn bounding_box(&self, id: &str) -> ChoreoResult<Rect> {
        let group = self.group(id)?;
        let boxes = group
            .members
            .iter()
            .map(|m| {
                self.get(m.as_str())?
                    .bounds()
                    .ok_or_else(|| ChoreoError::unresolved(m.as_str()))
            })
            .collect::<ChoreoResult<Vec<Rect>>>()?;
        Rect::union_all(boxes.iter())
            .ok_or_else(|| ChoreoError::empty_group(id, "no members"))
    }

    /// Where every member lands when the group moves rigidly by `by`.
    /// Nothing is written; fails unless every member is placed.
    pub fn translated_members(&self, id: &str, by: Vector2D) -> ChoreoResult<Vec<(ElementId, Point2D)>> {
        self.group(id)?
            .members
            .iter()
            .map(|m| {
                let origin = self
                    .get(m.as_str())?
                    .position
                    .ok_or_else(|| ChoreoError::unresolved(m.as_str()))?;
                Ok((m.clone(), origin + by))
            })
            .collect()
    }

    /// Append an element to an existing group and make that group its owner.
    pub(crate) fn join_group(&mut self, group: &ElementId, id: &ElementId) -> ChoreoResult<()> {
        self.get(id.as_str())?;
        let entry = self
            .groups
            .get_mut(group)
            .ok_or_else(|| ChoreoError::UnknownElement(group.to_string()))?;
        if !entry.members.contains(id) {
            entry.members.push(id.clone());
        }
        self.set_owner(id, group);
        Ok(())
    }
}
