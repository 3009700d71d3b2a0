use acudb_core::filter::DatabaseFilter;
use acudb_core::geom::Vec2;
use acudb_core::point::{compare_ids, Color, Point, Position};
use std::cmp::Ordering;

fn point(id: &str, tags: &[&str]) -> Point {
    let mut p = Point::new(id);
    p.tags = tags.iter().map(|t| t.to_string()).collect();
    p
}

#[test]
fn numeric_suffixes_sort_by_value() {
    assert_eq!(Ordering::Less, compare_ids("LI4", "LI10"));
    assert_eq!(Ordering::Less, compare_ids("LI10", "LI11"));
    assert_eq!(Ordering::Greater, compare_ids("LI10", "LI4"));
    assert_eq!(Ordering::Less, compare_ids("KI27", "LI1"));
    assert_eq!(Ordering::Equal, compare_ids("ST36", "ST36"));

    let mut ids = vec!["LI11", "LI4", "ST36", "LI10", "GB20", "LI1"];
    ids.sort_by(|a, b| compare_ids(a, b));
    assert_eq!(vec!["GB20", "LI1", "LI4", "LI10", "LI11", "ST36"], ids);
}

#[test]
fn ids_without_suffix_compare_as_whole_prefix() {
    // "ST36a" has no trailing digits, so its prefix is the full id and
    // "ST" < "ST36a".
    assert_eq!(Ordering::Less, compare_ids("ST36", "ST36a"));
    assert_eq!(Ordering::Less, compare_ids("Yintang", "Yuyao"));
}

#[test]
fn leading_zeros_tie_break_lexicographically() {
    assert_eq!(Ordering::Less, compare_ids("LI04", "LI4"));
    assert_eq!(Ordering::Less, compare_ids("LI4", "LI005"));
}

#[test]
fn matches_id_or_tag_prefix_ignoring_case() {
    let p = point("LI4", &["hand", "yang"]);
    assert!(p.matches("li"));
    assert!(p.matches("yan"));
    assert!(p.matches("HAND"));
    assert!(!p.matches("foo"));
    assert!(!p.matches("and"));
    assert!(p.matches(""));
}

#[test]
fn filter_keeps_matching_points() {
    let points = vec![
        point("LI4", &["hand"]),
        point("ST36", &["leg"]),
        point("LV3", &["foot"]),
    ];
    let filter = DatabaseFilter::new("l");
    let ids: Vec<_> = filter.apply(&points).map(|p| p.id.as_str()).collect();
    assert_eq!(vec!["LI4", "ST36", "LV3"], ids);

    let filter = DatabaseFilter::new("li");
    let ids: Vec<_> = filter.apply(&points).map(|p| p.id.as_str()).collect();
    assert_eq!(vec!["LI4"], ids);

    assert_eq!(3, DatabaseFilter::default().apply(&points).count());
}

#[test]
fn set_position_replaces_per_image() {
    let mut p = Point::new("PC6");
    p.set_position(Position::new("front", Vec2::new(1.0, 2.0)));
    p.set_position(Position::new("side", Vec2::new(3.0, 4.0)));
    p.set_position(Position::new("front", Vec2::new(5.0, 6.0)));

    assert_eq!(2, p.positions.len());
    assert_eq!(Some(Vec2::new(5.0, 6.0)), p.position_in("front"));
    assert_eq!(None, p.position_in("back"));
}

#[test]
fn empty_id_is_the_invalid_sentinel() {
    assert!(!Point::default().is_valid());
    assert!(Point::new("GV20").is_valid());
}

#[test]
fn color_hex_includes_alpha_only_when_translucent() {
    assert_eq!("#ff8000", Color::rgb(255, 128, 0).to_hex());
    assert_eq!("#ff800080", Color::rgba(255, 128, 0, 128).to_hex());
}
