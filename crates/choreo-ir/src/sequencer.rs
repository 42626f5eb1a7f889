//! The timeline: applies steps one at a time, in submission order, and emits
//! the render instruction stream.

use serde::Serialize;
use uuid::Uuid;

use choreo_core::{ChoreoConfig, ChoreoError, ChoreoResult, Duration, Point2D, Rect, Size2D, Timestamp};

use crate::coords::CoordinateSystem;
use crate::element::{ElementId, ElementKind, ElementSpec, SizeSpec};
use crate::instruction::{InstructionOp, InstructionStream, RenderInstruction};
use crate::layout::{self, AnchorConstraint, Relation, Stage};
use crate::measure::Measure;
use crate::registry::Registry;
use crate::step::{HighlightStyle, Step};

/// Progress of the step currently under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepPhase {
    Pending,
    Resolved,
    Applied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequencerState {
    /// No step has been processed yet.
    Idle,
    Running { step: usize, phase: StepPhase },
    /// Input closed and every step applied.
    Completed,
    /// A step failed; nothing further is processed or accepted.
    Halted { step: usize },
}

impl SequencerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SequencerState::Completed | SequencerState::Halted { .. })
    }
}

/// A step that could not be resolved or applied. Nothing was emitted for it.
#[derive(Debug, thiserror::Error)]
#[error("step {index} ({op}) failed: {error}")]
pub struct StepFailure {
    pub index: usize,
    pub op: &'static str,
    pub constraint: Option<AnchorConstraint>,
    #[source]
    pub error: ChoreoError,
}

#[derive(Debug, Clone, Copy)]
pub struct SequencerOptions {
    /// Time an animated step occupies when it sets none.
    pub default_run_time: Duration,
    pub fps: f64,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            default_run_time: Duration::from_seconds(1.0),
            fps: 30.0,
        }
    }
}

impl From<&ChoreoConfig> for SequencerOptions {
    fn from(config: &ChoreoConfig) -> Self {
        Self {
            default_run_time: Duration::from_seconds(config.timing.default_run_time),
            fps: config.stage.fps,
        }
    }
}

/// A new element, fully resolved but not yet registered.
#[derive(Debug)]
struct NewElement {
    id: ElementId,
    kind: ElementKind,
    content: String,
    size: Size2D,
    origin: Point2D,
    parent: Option<ElementId>,
    join: Option<ElementId>,
}

/// Everything a step will change, computed before anything is mutated.
#[derive(Debug, Default)]
struct Plan {
    create: Option<NewElement>,
    group: Option<(ElementId, Vec<ElementId>)>,
    morph: Option<(ElementId, String, Size2D, Point2D)>,
    moves: Vec<(ElementId, Point2D)>,
    visibility: Vec<(ElementId, bool)>,
    decorations: Vec<(ElementId, Rect, HighlightStyle)>,
    advance: Option<Duration>,
}

/// Scene-scoped engine state: registry, stage, step list, cursor, and clock.
pub struct Sequencer<M: Measure> {
    stage: Stage,
    registry: Registry,
    measure: M,
    options: SequencerOptions,
    steps: Vec<Step>,
    cursor: usize,
    clock: Timestamp,
    closed: bool,
    state: SequencerState,
    stream: InstructionStream,
}

impl<M: Measure> Sequencer<M> {
    pub fn new(stage: Stage, measure: M) -> Self {
        Self::with_options(stage, measure, SequencerOptions::default())
    }

    pub fn with_options(stage: Stage, measure: M, options: SequencerOptions) -> Self {
        Self {
            stage,
            registry: Registry::new(),
            measure,
            options,
            steps: Vec::new(),
            cursor: 0,
            clock: Timestamp::zero(),
            closed: false,
            state: SequencerState::Idle,
            stream: InstructionStream::new(Uuid::new_v4().to_string(), options.fps),
        }
    }

    /// Build the stage (frame and optional data mapping) from config.
    pub fn from_config(config: &ChoreoConfig, measure: M) -> ChoreoResult<Self> {
        config.check()?;
        let mut stage = Stage::new(config.stage.width, config.stage.height);
        if let Some(coords) = &config.coordinates {
            stage = stage.with_coordinates(CoordinateSystem::from_config(
                coords,
                config.stage.width,
                config.stage.height,
            )?);
        }
        Ok(Self::with_options(stage, measure, SequencerOptions::from(config)))
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    pub fn stream(&self) -> &InstructionStream {
        &self.stream
    }

    /// Hand the stream collected so far to the consumer, leaving an empty one.
    pub fn take_stream(&mut self) -> InstructionStream {
        let fresh = InstructionStream::new(self.stream.scene_id.clone(), self.stream.fps);
        std::mem::replace(&mut self.stream, fresh)
    }

    /// Steps submitted but not yet applied.
    pub fn pending(&self) -> usize {
        self.steps.len() - self.cursor
    }

    /// Queue a step; returns its index.
    pub fn submit(&mut self, step: Step) -> ChoreoResult<usize> {
        if self.closed || self.state.is_terminal() {
            return Err(ChoreoError::SequenceClosed);
        }
        self.steps.push(step);
        Ok(self.steps.len() - 1)
    }

    pub fn submit_all(&mut self, steps: impl IntoIterator<Item = Step>) -> ChoreoResult<()> {
        for step in steps {
            self.submit(step)?;
        }
        Ok(())
    }

    /// Mark the end of input. The sequence completes once every queued step applies.
    pub fn close(&mut self) {
        self.closed = true;
        self.settle();
    }

    /// Apply the next queued step. Returns `Ok(false)` when there is nothing
    /// to do (queue empty, or the sequence is terminal).
    pub fn advance(&mut self) -> Result<bool, StepFailure> {
        if self.state.is_terminal() || self.cursor >= self.steps.len() {
            return Ok(false);
        }
        let index = self.cursor;
        self.state = SequencerState::Running {
            step: index,
            phase: StepPhase::Pending,
        };

        let step = self.steps[index].clone();
        let outcome = self.resolve(&step).and_then(|plan| {
            self.state = SequencerState::Running {
                step: index,
                phase: StepPhase::Resolved,
            };
            tracing::debug!(step = index, op = step.op_name(), "resolved step");
            self.apply(index, plan)
        });

        if let Err(error) = outcome {
            // nothing from a failed step reaches the stream
            self.registry.take_changes();
            tracing::error!(step = index, op = step.op_name(), "step failed: {}", error);
            self.state = SequencerState::Halted { step: index };
            return Err(StepFailure {
                index,
                op: step.op_name(),
                constraint: step.constraint().cloned(),
                error,
            });
        }

        self.cursor += 1;
        self.state = SequencerState::Running {
            step: index,
            phase: StepPhase::Applied,
        };
        self.settle();
        Ok(true)
    }

    /// Apply every queued step, stopping at the first failure.
    pub fn run(&mut self) -> Result<(), StepFailure> {
        while self.advance()? {}
        Ok(())
    }

    /// Submit, close, and run a whole script.
    pub fn play(&mut self, steps: impl IntoIterator<Item = Step>) -> Result<(), StepFailure> {
        if let Err(error) = self.submit_all(steps) {
            return Err(StepFailure {
                index: self.steps.len(),
                op: "submit",
                constraint: None,
                error,
            });
        }
        self.close();
        self.run()
    }

    fn settle(&mut self) {
        if self.closed && self.cursor == self.steps.len() && !self.state.is_terminal() {
            self.state = SequencerState::Completed;
        }
    }

    fn run_time(&self, step: &Step) -> Duration {
        step.run_time().unwrap_or(self.options.default_run_time)
    }

    fn resolve(&self, step: &Step) -> ChoreoResult<Plan> {
        let mut plan = match step {
            Step::Show {
                target,
                element,
                constraint,
                ..
            } => self.resolve_show(target, element.as_ref(), constraint.as_ref())?,
            Step::Transform {
                target,
                constraint,
                content,
                ..
            } => self.resolve_transform(target, constraint.as_ref(), content.as_deref())?,
            Step::Highlight { targets, style, .. } => self.resolve_highlight(targets, style)?,
            Step::Hide { targets, .. } => {
                let mut plan = Plan::default();
                for id in self.expand_targets(targets, "hide")? {
                    plan.visibility.push((id, false));
                }
                plan
            }
            Step::Pause { duration } => Plan {
                advance: Some(*duration),
                ..Plan::default()
            },
            Step::Group { id, members } => {
                self.check_group(id, members)?;
                Plan {
                    group: Some((id.clone(), members.clone())),
                    ..Plan::default()
                }
            }
        };
        if step.is_animated() {
            let run_time = self.run_time(step);
            if !run_time.is_zero() {
                plan.advance = Some(run_time);
            }
        }
        if plan.advance.is_some_and(|d| !d.as_seconds().is_finite()) {
            return Err(ChoreoError::InvalidArgument(format!(
                "{} duration must be finite",
                step.op_name()
            )));
        }
        self.check_boxes(&plan)?;
        Ok(plan)
    }

    /// Every box the plan writes must stay finite, so `apply` cannot stop
    /// halfway through a step.
    fn check_boxes(&self, plan: &Plan) -> ChoreoResult<()> {
        let mut boxes: Vec<(&ElementId, Rect)> = Vec::new();
        if let Some(new) = &plan.create {
            boxes.push((&new.id, Rect::from_origin_size(new.origin, new.size)));
        }
        if let Some((id, _, size, origin)) = &plan.morph {
            boxes.push((id, Rect::from_origin_size(*origin, *size)));
        }
        for (id, origin) in &plan.moves {
            let size = self.registry.get(id.as_str())?.size;
            boxes.push((id, Rect::from_origin_size(*origin, size)));
        }
        match boxes.into_iter().find(|(_, rect)| !rect.is_finite()) {
            Some((id, rect)) => Err(ChoreoError::InvalidArgument(format!(
                "'{}' would be placed outside finite frame space (at {}, {})",
                id,
                rect.left(),
                rect.top()
            ))),
            None => Ok(()),
        }
    }

    fn resolve_show(
        &self,
        target: &ElementId,
        spec: Option<&ElementSpec>,
        constraint: Option<&AnchorConstraint>,
    ) -> ChoreoResult<Plan> {
        let mut plan = Plan::default();

        if !self.registry.contains(target.as_str()) {
            let spec = spec.ok_or_else(|| ChoreoError::UnknownElement(target.to_string()))?;
            let (size, natural_origin) = self.size_for(spec)?;
            let origin = match constraint {
                Some(c) => layout::resolve(c, size, &self.registry, &self.stage)?,
                None => natural_origin.unwrap_or_else(|| self.frame_center(size)),
            };
            let join = match &spec.derived_from {
                Some(parent) => self.registry.get(parent.as_str())?.group.clone(),
                None => None,
            };
            plan.create = Some(NewElement {
                id: target.clone(),
                kind: spec.kind,
                content: spec.content.clone(),
                size,
                origin,
                parent: spec.derived_from.clone(),
                join,
            });
            plan.visibility.push((target.clone(), true));
            return Ok(plan);
        }

        if spec.is_some() {
            tracing::warn!("'{}' is already registered; element spec ignored", target);
        }
        if let Some(c) = constraint {
            self.reject_self_reference(target, c)?;
        }

        if self.registry.is_group(target.as_str()) {
            if let Some(c) = constraint {
                plan.moves = self.group_moves(target, c)?;
            }
        } else {
            let element = self.registry.get(target.as_str())?;
            let origin = match constraint {
                Some(c) => Some(layout::resolve(c, element.size, &self.registry, &self.stage)?),
                None if !element.is_placed() => Some(self.frame_center(element.size)),
                None => None,
            };
            plan.moves.extend(origin.map(|o| (target.clone(), o)));
        }

        for id in self.registry.expand(target.as_str())? {
            plan.visibility.push((id, true));
        }
        Ok(plan)
    }

    fn resolve_transform(
        &self,
        target: &ElementId,
        constraint: Option<&AnchorConstraint>,
        content: Option<&str>,
    ) -> ChoreoResult<Plan> {
        let mut plan = Plan::default();

        if self.registry.is_group(target.as_str()) {
            if content.is_some() {
                return Err(ChoreoError::InvalidArgument(format!(
                    "'{}' is a group; only its members carry content",
                    target
                )));
            }
            if let Some(c) = constraint {
                plan.moves = self.group_moves(target, c)?;
            }
            return Ok(plan);
        }

        let element = self.registry.get(target.as_str())?;
        let size = match content {
            Some(text) => self.measured(element.kind, text)?,
            None => element.size,
        };
        // a constraint referencing the target itself resolves against its current box
        let origin = match constraint {
            Some(c) => layout::resolve(c, size, &self.registry, &self.stage)?,
            None => element
                .position
                .ok_or_else(|| ChoreoError::unresolved(target.as_str()))?,
        };
        match content {
            Some(text) => plan.morph = Some((target.clone(), text.to_string(), size, origin)),
            None => plan.moves.push((target.clone(), origin)),
        }
        Ok(plan)
    }

    fn resolve_highlight(&self, targets: &[ElementId], style: &HighlightStyle) -> ChoreoResult<Plan> {
        if targets.is_empty() {
            return Err(ChoreoError::InvalidArgument(
                "highlight needs at least one target".into(),
            ));
        }
        if !style.padding.is_finite() {
            return Err(ChoreoError::InvalidArgument(
                "highlight padding must be finite".into(),
            ));
        }
        let mut plan = Plan::default();
        for id in targets {
            let view = self.registry.view(id.as_str())?;
            let rect = self.registry.bounds(id.as_str())?;
            if !view.visible {
                tracing::warn!("highlighting '{}' while it is hidden", id);
            }
            plan.decorations.push((id.clone(), rect.inflate(style.padding), *style));
        }
        Ok(plan)
    }

    fn expand_targets(&self, targets: &[ElementId], op: &str) -> ChoreoResult<Vec<ElementId>> {
        if targets.is_empty() {
            return Err(ChoreoError::InvalidArgument(format!(
                "{op} needs at least one target"
            )));
        }
        let mut ids = Vec::new();
        for target in targets {
            for id in self.registry.expand(target.as_str())? {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    /// Member moves that rigidly carry a group to where the constraint puts
    /// its union box.
    fn group_moves(&self, group: &ElementId, c: &AnchorConstraint) -> ChoreoResult<Vec<(ElementId, Point2D)>> {
        let current = self.registry.bounding_box(group.as_str())?;
        let origin = layout::resolve(c, current.size, &self.registry, &self.stage)?;
        let delta = origin.offset_from(&current.origin);
        if delta.is_zero() {
            return Ok(Vec::new());
        }
        self.registry.translated_members(group.as_str(), delta)
    }

    /// A show may not anchor on anything it moves.
    fn reject_self_reference(&self, target: &ElementId, c: &AnchorConstraint) -> ChoreoResult<()> {
        let Some(reference) = c.reference_id() else {
            return Ok(());
        };
        let moved = self.registry.expand(target.as_str())?;
        let anchored = self.registry.expand(reference.as_str())?;
        if reference == target || anchored.iter().any(|id| moved.contains(id)) {
            return Err(ChoreoError::InvalidArgument(format!(
                "'{}' cannot be shown relative to '{}', which it contains or is",
                target, reference
            )));
        }
        Ok(())
    }

    fn check_group(&self, id: &ElementId, members: &[ElementId]) -> ChoreoResult<()> {
        if self.registry.contains(id.as_str()) {
            return Err(ChoreoError::DuplicateId(id.to_string()));
        }
        if members.is_empty() {
            return Err(ChoreoError::empty_group(id.as_str(), "no members given"));
        }
        for m in members {
            if m == id || !self.registry.contains(m.as_str()) {
                return Err(ChoreoError::empty_group(
                    id.as_str(),
                    format!("unknown member '{}'", m),
                ));
            }
        }
        Ok(())
    }

    fn frame_center(&self, size: Size2D) -> Point2D {
        layout::place(&self.stage.frame, size, Relation::CenterOf, 0.0)
    }

    fn measured(&self, kind: ElementKind, content: &str) -> ChoreoResult<Size2D> {
        let size = self.measure.measure(kind, content);
        if !size.is_valid() {
            return Err(ChoreoError::InvalidArgument(format!(
                "measured {} size must be finite and non-negative (got {} x {})",
                kind, size.width, size.height
            )));
        }
        Ok(size)
    }

    /// Intrinsic size for a new element, plus the origin it naturally takes
    /// when no constraint is given (surrounding boxes sit on their reference).
    fn size_for(&self, spec: &ElementSpec) -> ChoreoResult<(Size2D, Option<Point2D>)> {
        if spec.kind == ElementKind::Group {
            return Err(ChoreoError::InvalidArgument(
                "groups are defined with a group step".into(),
            ));
        }
        match &spec.size {
            SizeSpec::Measured => Ok((self.measured(spec.kind, &spec.content)?, None)),
            SizeSpec::Fixed(size) => {
                if !size.is_valid() {
                    return Err(ChoreoError::InvalidArgument(format!(
                        "fixed size must be finite and non-negative (got {} x {})",
                        size.width, size.height
                    )));
                }
                Ok((*size, None))
            }
            SizeSpec::FitWidth(width) => {
                if !width.is_finite() || *width < 0.0 {
                    return Err(ChoreoError::InvalidArgument(format!(
                        "fit width must be finite and non-negative (got {width})"
                    )));
                }
                let natural = self.measured(spec.kind, &spec.content)?;
                Ok((natural.fit_width(*width), None))
            }
            SizeSpec::Surround { reference, padding } => {
                if !padding.is_finite() {
                    return Err(ChoreoError::InvalidArgument(
                        "surround padding must be finite".into(),
                    ));
                }
                let area = self.registry.reference_bounds(reference.as_str())?.inflate(*padding);
                if !area.size.is_valid() {
                    return Err(ChoreoError::InvalidArgument(format!(
                        "padding {} collapses the box around '{}'",
                        padding, reference
                    )));
                }
                Ok((area.size, Some(area.origin)))
            }
        }
    }

    fn apply(&mut self, index: usize, plan: Plan) -> ChoreoResult<()> {
        if let Some(new) = plan.create {
            self.registry
                .create(new.id.clone(), new.kind, new.content, new.size)?;
            if let Some(parent) = new.parent {
                self.registry.set_parent(new.id.as_str(), parent)?;
            }
            self.registry.set_position(new.id.as_str(), new.origin)?;
            if let Some(group) = new.join {
                self.registry.join_group(&group, &new.id)?;
            }
        }
        if let Some((id, members)) = plan.group {
            self.registry.define_group(id, &members)?;
        }
        if let Some((id, content, size, origin)) = plan.morph {
            self.registry.morph(id.as_str(), content, size, origin)?;
        }
        for (id, origin) in plan.moves {
            self.registry.set_position(id.as_str(), origin)?;
        }
        for (id, visible) in plan.visibility {
            self.registry.set_visible(id.as_str(), visible)?;
        }

        let at = self.clock;
        let mut ops: Vec<InstructionOp> = self
            .registry
            .take_changes()
            .into_iter()
            .map(InstructionOp::from)
            .collect();
        ops.extend(
            plan.decorations
                .into_iter()
                .map(|(id, rect, style)| InstructionOp::Decorate { id, style, rect }),
        );
        if let Some(duration) = plan.advance {
            ops.push(InstructionOp::AdvanceClock { duration });
            self.clock += duration;
        }
        for op in ops {
            tracing::trace!(step = index, at = at.as_seconds(), "emit {:?}", op);
            self.stream.push(RenderInstruction { step: index, at, op });
        }
        Ok(())
    }
}
