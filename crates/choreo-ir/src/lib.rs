//! # choreo-ir
//!
//! The Choreo engine: a registry of visual elements laid out relative to one
//! another, composed into groups, and driven by a deterministic step sequencer
//! that emits a render instruction stream for an external renderer.
//!
//! Scripts (JSON or built with [`ScriptBuilder`]) compile down to [`Step`]s
//! before anything is laid out.

pub mod builder;
pub mod coords;
pub mod element;
pub mod group;
pub mod instruction;
pub mod layout;
pub mod measure;
pub mod registry;
pub mod script;
pub mod sequencer;
pub mod step;
pub mod validate;

pub use builder::ScriptBuilder;
pub use coords::{CoordinateSystem, DataBounds};
pub use element::{ElementId, ElementKind, ElementSpec, SizeSpec, VisualElement};
pub use group::Group;
pub use instruction::{InstructionOp, InstructionStream, RenderInstruction};
pub use layout::{Anchor, AnchorConstraint, Corner, Edge, Relation, Stage};
pub use measure::{GlyphMeasure, Measure};
pub use registry::{ChangeRecord, ElementView, Registry};
pub use script::SceneScript;
pub use sequencer::{Sequencer, SequencerOptions, SequencerState, StepFailure, StepPhase};
pub use step::{HighlightEffect, HighlightStyle, Step};
pub use validate::{validate_script, ScriptIssue};
