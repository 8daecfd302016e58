use a11y_compressor::geometry::bbox::{
    estimate_screen_size, median, merge_close_boxes, union_all, BBox, ScreenSize, DEFAULT_SCREEN,
};

mod common;

use common::{build, row};

#[test]
fn edges_saturate_at_the_integer_limit() {
    let b = BBox::new(i32::MAX - 10, i32::MIN + 5, 100, -100);
    assert_eq!(b.right(), i32::MAX);
    assert_eq!(b.bottom(), i32::MIN);
    assert_eq!(b.center(), (i32::MAX, i32::MIN));

    let grown = BBox::new(i32::MIN, 0, i32::MAX, 10).expand(50, 50);
    assert_eq!(grown.x, i32::MIN);
    assert_eq!(grown.w, i32::MAX);

    let merged = BBox::new(i32::MIN, 0, 1, 1).merge(&BBox::new(i32::MAX - 1, 0, 1, 1));
    assert_eq!(merged.w, i32::MAX);
}

#[test]
fn center_and_edges() {
    let b = BBox::new(10, 20, 101, 51);
    assert_eq!(b.center(), (60, 45), "Integer division truncates");
    assert_eq!(b.right(), 111);
    assert_eq!(b.bottom(), 71);
    assert_eq!(b.area(), 101 * 51);
    assert!(b.contains_point(10, 71));
    assert!(!b.contains_point(9, 30));
}

#[test]
fn expand_and_merge() {
    let a = BBox::new(0, 0, 10, 10);
    assert_eq!(a.expand(5, 2), BBox::new(-5, -2, 20, 14));
    assert_eq!(a.merge(&BBox::new(20, 30, 5, 5)), BBox::new(0, 0, 25, 35));
}

#[test]
fn union_of_nothing_is_none() {
    assert_eq!(union_all(Vec::new()), None);
    assert_eq!(
        union_all(vec![BBox::new(5, 5, 1, 1), BBox::new(0, 10, 2, 2)]),
        Some(BBox::new(0, 5, 6, 7))
    );
}

#[test]
fn proximity_uses_tolerance_on_both_axes() {
    let a = BBox::new(0, 0, 100, 100);
    assert!(a.is_close_to(&BBox::new(150, 0, 10, 10), 50));
    assert!(!a.is_close_to(&BBox::new(151, 0, 10, 10), 50));
    assert!(!a.is_close_to(&BBox::new(120, 300, 10, 10), 50));
}

#[test]
fn close_boxes_merge_transitively() {
    let boxes = vec![
        BBox::new(0, 0, 10, 10),
        BBox::new(1000, 1000, 10, 10),
        BBox::new(15, 0, 10, 10),
        BBox::new(30, 0, 10, 10),
    ];
    let merged = merge_close_boxes(boxes, 5);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0], BBox::new(0, 0, 40, 10));
    assert_eq!(merged[1], BBox::new(1000, 1000, 10, 10));
}

#[test]
fn screen_size_from_extents() {
    let elements = build(&[
        row("label", "a", 0, 0, 100, 50),
        row("label", "b", 1800, 900, 120, 180),
    ]);
    assert_eq!(estimate_screen_size(&elements), ScreenSize::new(1920, 1080));
}

#[test]
fn screen_size_defaults_without_geometry() {
    assert_eq!(estimate_screen_size(&[]), DEFAULT_SCREEN);

    let elements = build(&["label\tNo geometry".to_string()]);
    assert_eq!(estimate_screen_size(&elements), DEFAULT_SCREEN);
}

#[test]
fn screen_fractions_truncate() {
    let screen = ScreenSize::new(1920, 1080);
    assert_eq!(screen.w_frac(0.035), 67);
    assert_eq!(screen.h_frac(0.65), 702);
}

#[test]
fn median_of_samples() {
    assert_eq!(median(&[]), None);
    assert_eq!(median(&[7, 1, 3]), Some(3));
    assert_eq!(median(&[1, 2, 3, 10]), Some(2));
}
