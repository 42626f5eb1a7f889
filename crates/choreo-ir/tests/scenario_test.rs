//! End-to-end scenes played through the sequencer with the glyph measurer.

use choreo_core::{ChoreoConfig, ChoreoError, Color, Point2D, Rect};
use choreo_ir::{
    validate_script, AnchorConstraint, Corner, Edge, GlyphMeasure, HighlightEffect,
    HighlightStyle, InstructionOp, SceneScript, ScriptBuilder, Sequencer, SequencerState, Step,
};

const EPS: f64 = 1e-6;

fn lesson() -> Vec<Step> {
    let mut b = ScriptBuilder::new();
    b.run_time(0.5)
        .show_text("title", "Problem 174", AnchorConstraint::to_edge(Edge::Top, 40.0))
        .show_formula("eq", "2x + 3 = 7", AnchorConstraint::below("title", 30.0))
        .group("header", &["title", "eq"])
        .morph("eq", "2x = 4", Some(AnchorConstraint::below("title", 30.0)))
        .morph("eq", "x = 2", Some(AnchorConstraint::below("title", 30.0)))
        .surround("box", "eq", 8.0)
        .highlight(
            &["eq"],
            HighlightStyle::new(HighlightEffect::Circumscribe, Color::RED).with_padding(4.0),
        )
        .pause(1.0)
        .transform("header", AnchorConstraint::to_corner(Corner::TopLeft, 20.0))
        .hide(&["header", "box"]);
    b.build()
}

fn play(steps: Vec<Step>) -> Sequencer<GlyphMeasure> {
    let config = ChoreoConfig::default();
    let mut seq = Sequencer::from_config(&config, GlyphMeasure::new(config.measure.clone())).unwrap();
    seq.play(steps).unwrap();
    seq
}

fn bounds(seq: &Sequencer<GlyphMeasure>, id: &str) -> Rect {
    seq.registry().bounds(id).unwrap()
}

#[test]
fn test_lesson_plays_to_completion() {
    assert!(validate_script(&lesson()).is_ok());
    let seq = play(lesson());
    assert_eq!(seq.state(), SequencerState::Completed);

    // 8 animated steps at 0.5s plus a 1s pause
    assert!((seq.clock().as_seconds() - 5.0).abs() < EPS);
    assert_eq!(seq.stream().frame_count(), 150);

    let reg = seq.registry();
    assert_eq!(reg.len(), 3);
    assert_eq!(reg.get("eq").unwrap().content, "x = 2");
    assert!(reg.elements().all(|e| !e.visible));
}

#[test]
fn test_header_keeps_its_shape_when_moved() {
    let seq = play(lesson());
    let title = bounds(&seq, "title");
    let eq = bounds(&seq, "eq");

    // moved as a unit into the top-left corner
    let header = bounds(&seq, "header");
    assert!(header.origin.approx_eq(&Point2D::new(20.0, 20.0), EPS));
    assert!((eq.top() - title.bottom() - 30.0).abs() < EPS);
    assert!((eq.center().x - title.center().x).abs() < EPS);
}

#[test]
fn test_morph_keeps_identity_and_recenters() {
    let mut b = ScriptBuilder::new();
    b.show_text("title", "Problem 174", AnchorConstraint::to_edge(Edge::Top, 40.0))
        .show_formula("eq", "2x + 3 = 7", AnchorConstraint::below("title", 30.0))
        .morph("eq", "x = 2", Some(AnchorConstraint::below("title", 30.0)));
    let seq = play(b.build());

    let title = bounds(&seq, "title");
    let eq = bounds(&seq, "eq");
    assert!((eq.center().x - title.center().x).abs() < EPS);
    assert!(eq.width() < title.width());

    let morphs: Vec<_> = seq
        .stream()
        .for_step(2)
        .filter(|i| matches!(i.op, InstructionOp::MorphElement { .. }))
        .collect();
    assert_eq!(morphs.len(), 1);
    assert_eq!(seq.registry().len(), 2);
}

#[test]
fn test_surround_and_highlight_boxes() {
    let seq = play(lesson());
    let stream = seq.stream();

    let surround = stream
        .for_step(5)
        .find_map(|i| match &i.op {
            InstructionOp::PlaceElement { id, rect, .. } if id.as_str() == "box" => Some(*rect),
            _ => None,
        })
        .unwrap();
    let decorate = stream
        .for_step(6)
        .find_map(|i| match &i.op {
            InstructionOp::Decorate { rect, .. } => Some(*rect),
            _ => None,
        })
        .unwrap();
    // the decoration hugs eq with 4 units; the box with 8
    assert!((decorate.left() - surround.left() - 4.0).abs() < EPS);
    assert!((surround.bottom() - decorate.bottom() - 4.0).abs() < EPS);
}

#[test]
fn test_same_script_same_stream() {
    let first = play(lesson());
    let second = play(lesson());
    assert_ne!(first.stream().scene_id, second.stream().scene_id);
    assert_eq!(first.stream().instructions, second.stream().instructions);
    assert_eq!(
        first.stream().content_hash().unwrap(),
        second.stream().content_hash().unwrap()
    );
}

#[test]
fn test_instructions_are_time_ordered() {
    let seq = play(lesson());
    let times: Vec<f64> = seq.stream().iter().map(|i| i.at.as_seconds()).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    let steps: Vec<usize> = seq.stream().iter().map(|i| i.step).collect();
    assert!(steps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_failure_stops_the_scene() {
    let mut steps = lesson();
    steps.insert(
        2,
        Step::show(
            "note",
            choreo_ir::ElementSpec::text("see below"),
            AnchorConstraint::right_of("answer", 10.0),
        ),
    );
    assert!(validate_script(&steps).is_err());

    let config = ChoreoConfig::default();
    let mut seq = Sequencer::from_config(&config, GlyphMeasure::default()).unwrap();
    let failure = seq.play(steps).unwrap_err();
    assert_eq!(failure.index, 2);
    assert!(matches!(
        failure.error,
        ChoreoError::UnresolvedReference { ref reference } if reference == "answer"
    ));
    assert_eq!(seq.state(), SequencerState::Halted { step: 2 });
    assert!(seq.stream().iter().all(|i| i.step < 2));
    assert!(!seq.registry().is_group("header"));
}

#[test]
fn test_json_script_with_data_coordinates() {
    let script = SceneScript::from_json_str(
        r#"{
            "config": {
                "stage": {"width": 800.0, "height": 600.0, "fps": 24.0},
                "coordinates": {"x_min": -4.0, "x_max": 4.0, "y_min": -3.0, "y_max": 3.0},
                "timing": {"default_run_time": 0.0}
            },
            "steps": [
                {"op": "show", "target": "dot",
                 "element": {"kind": "shape", "content": "dot", "size": {"fixed": {"width": 10.0, "height": 10.0}}},
                 "constraint": {"reference": {"data_point": {"x": 2.0, "y": 1.5}}, "relation": "center_of"}},
                {"op": "show", "target": "label",
                 "element": {"kind": "text", "content": "P"},
                 "constraint": {"reference": {"element": "dot"}, "relation": {"outside_corner": "top_right"}, "gap": 4.0}}
            ]
        }"#,
    )
    .unwrap();
    let config = script.config.clone().unwrap();
    let mut seq = Sequencer::from_config(&config, GlyphMeasure::new(config.measure.clone())).unwrap();
    seq.play(script.steps).unwrap();

    // (2, 1.5) maps to (600, 150) with y flipped
    let dot = seq.registry().bounds("dot").unwrap();
    assert!(dot.center().approx_eq(&Point2D::new(600.0, 150.0), EPS));
    let label = seq.registry().bounds("label").unwrap();
    assert!((label.left() - dot.right() - 4.0).abs() < EPS);
    assert!((dot.top() - label.bottom() - 4.0).abs() < EPS);
    assert!(seq.stream().total_duration().is_zero());
}

#[test]
fn test_closed_sequence_rejects_steps() {
    let mut seq = play(lesson());
    let err = seq.submit(Step::pause(1.0)).unwrap_err();
    assert!(matches!(err, ChoreoError::SequenceClosed));
}
