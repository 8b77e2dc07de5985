use super::*;

#[test]
fn defaults_to_golden_ratio() {
    let layout = SplitLayout::new();
    assert!((layout.position() - DEFAULT_SPLIT_PERCENT).abs() < f64::EPSILON);
    assert!(!layout.is_dragging());
}

#[test]
fn drag_ignored_without_press() {
    let mut layout = SplitLayout::new();
    layout.drag(500.0, 1000.0);
    assert!((layout.position() - DEFAULT_SPLIT_PERCENT).abs() < f64::EPSILON);
}

#[test]
fn press_drag_release_cycle() {
    let mut layout = SplitLayout::new();
    layout.press();
    layout.drag(600.0, 1000.0);
    assert!((layout.position() - 60.0).abs() < f64::EPSILON);

    layout.release();
    layout.drag(300.0, 1000.0);
    assert!((layout.position() - 60.0).abs() < f64::EPSILON);
}

#[test]
fn position_clamped_to_bounds() {
    let mut layout = SplitLayout::new();
    layout.press();

    layout.drag(10.0, 1000.0);
    assert!((layout.position() - MIN_SPLIT_PERCENT).abs() < f64::EPSILON);

    layout.drag(990.0, 1000.0);
    assert!((layout.position() - MAX_SPLIT_PERCENT).abs() < f64::EPSILON);
}

#[test]
fn zero_width_container_ignored() {
    let mut layout = SplitLayout::new();
    layout.press();
    layout.drag(100.0, 0.0);
    assert!((layout.position() - DEFAULT_SPLIT_PERCENT).abs() < f64::EPSILON);
}
