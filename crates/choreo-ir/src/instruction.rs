use serde::{Deserialize, Serialize};

use choreo_core::hash::{self, ContentHash};
use choreo_core::{ChoreoResult, Duration, Rect, Timestamp};

use crate::element::{ElementId, ElementKind};
use crate::registry::ChangeRecord;
use crate::step::HighlightStyle;

/// A directive for the external renderer, independent of how it draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstructionOp {
    PlaceElement {
        id: ElementId,
        element_kind: ElementKind,
        content: String,
        rect: Rect,
    },
    MoveElement {
        id: ElementId,
        rect: Rect,
    },
    MorphElement {
        id: ElementId,
        content: String,
        rect: Rect,
    },
    SetVisible {
        id: ElementId,
        visible: bool,
    },
    Decorate {
        id: ElementId,
        style: HighlightStyle,
        rect: Rect,
    },
    AdvanceClock {
        duration: Duration,
    },
}

impl From<ChangeRecord> for InstructionOp {
    fn from(record: ChangeRecord) -> Self {
        match record {
            ChangeRecord::Placed {
                id,
                kind,
                content,
                rect,
            } => InstructionOp::PlaceElement {
                id,
                element_kind: kind,
                content,
                rect,
            },
            ChangeRecord::Moved { id, rect } => InstructionOp::MoveElement { id, rect },
            ChangeRecord::Morphed { id, content, rect } => {
                InstructionOp::MorphElement { id, content, rect }
            }
            ChangeRecord::Visibility { id, visible } => InstructionOp::SetVisible { id, visible },
        }
    }
}

/// One timestamped entry of the output stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderInstruction {
    /// Index of the step that produced this instruction.
    pub step: usize,
    /// Logical clock time at which it takes effect.
    pub at: Timestamp,
    #[serde(flatten)]
    pub op: InstructionOp,
}

/// The ordered output of one scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructionStream {
    /// Random per-scene identifier; not part of the content hash.
    pub scene_id: String,
    pub fps: f64,
    pub instructions: Vec<RenderInstruction>,
}

impl InstructionStream {
    pub fn new(scene_id: impl Into<String>, fps: f64) -> Self {
        Self {
            scene_id: scene_id.into(),
            fps,
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: RenderInstruction) {
        self.instructions.push(instruction);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderInstruction> {
        self.instructions.iter()
    }

    /// Instructions produced by one step.
    pub fn for_step(&self, step: usize) -> impl Iterator<Item = &RenderInstruction> {
        self.instructions.iter().filter(move |i| i.step == step)
    }

    /// Sum of every clock advance.
    pub fn total_duration(&self) -> Duration {
        self.instructions
            .iter()
            .fold(Duration::zero(), |acc, i| match i.op {
                InstructionOp::AdvanceClock { duration } => acc + duration,
                _ => acc,
            })
    }

    pub fn frame_count(&self) -> u64 {
        self.total_duration().frame_count(self.fps)
    }

    /// SHA-256 over the canonical JSON of every instruction.
    pub fn content_hash(&self) -> ChoreoResult<ContentHash> {
        hash::hash_json(&self.instructions)
    }
}
