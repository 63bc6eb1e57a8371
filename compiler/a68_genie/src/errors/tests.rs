use super::*;
use pretty_assertions::assert_eq;

#[test]
fn categories_split_internal_from_runtime() {
    assert_eq!(
        unknown_node_kind("separator").category(),
        FaultCategory::Internal
    );
    assert_eq!(missing_frame(3).category(), FaultCategory::Internal);
    assert_eq!(assertion_failed().category(), FaultCategory::Runtime);
    assert_eq!(
        integer_overflow("+").category(),
        FaultCategory::Runtime
    );
}

#[test]
fn display_comes_from_kind() {
    let fault = index_out_of_bounds(7, 1, 5).with_span(Span::new(3, 9));
    assert_eq!(fault.to_string(), "subscript 7 out of bounds [1:5]");
    assert_eq!(fault.span, Some(Span::new(3, 9)));
}

#[test]
fn faults_convert_into_control_actions() {
    let action: ControlAction = division_by_zero().into();
    assert_eq!(
        action.as_fault().map(|f| f.kind.clone()),
        Some(FaultKind::DivisionByZero)
    );
    let jump = ControlAction::Jump(JumpSignal {
        owner: NodeId::new(1),
        target: NodeId::new(2),
        frame: 4,
        baseline: 0,
    });
    assert!(jump.as_fault().is_none());
}

#[test]
fn value_mismatch_names_the_shape() {
    let fault = value_mismatch("INT", &Value::Bool(true));
    assert_eq!(fault.to_string(), "expected INT, found BOOL");
}

#[test]
fn trace_lists_innermost_first() {
    let bt = FaultTrace::new(vec![
        TraceFrame {
            routine: NodeId::new(9),
            call_span: Span::new(20, 24),
        },
        TraceFrame {
            routine: NodeId::new(4),
            call_span: Span::new(2, 6),
        },
    ]);
    let text = bt.to_string();
    assert!(text.starts_with("  0: routine NodeId(9) called at 20..24"));
    assert!(text.contains("  1: routine NodeId(4)"));
}
