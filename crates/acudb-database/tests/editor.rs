mod common;

use acudb_core::geom::Vec2;
use acudb_core::point::Color;
use acudb_database::{Change, ImageLoader, ImageView, PointEditor};
use common::{loaded, record};
use std::sync::mpsc;
use std::time::Duration;

struct FakeView {
    active: Option<&'static str>,
    picks: Vec<Vec2>,
}

impl ImageView for FakeView {
    fn active_image(&self) -> Option<String> {
        self.active.map(str::to_string)
    }

    fn select_coordinate(&mut self) -> Option<Vec2> {
        self.picks.pop()
    }
}

#[test]
fn editor_commits_draft_through_set_point() {
    let mut db = loaded();
    db.select("LI11");
    let log = record(&mut db);

    let mut editor = PointEditor::open(&db, "LI11");
    assert!(!editor.is_modified(&db));
    editor.set_description("Pool at the Bend");
    editor.set_tags("arm, elbow ,, large intestine");
    editor.set_color(Color::rgb(9, 9, 9));

    let mut view = FakeView {
        active: Some("side"),
        picks: vec![Vec2::new(40.0, 50.0)],
    };
    assert!(editor.capture_position(&mut view));
    assert!(!editor.capture_position(&mut view), "no more picks");
    assert!(editor.is_modified(&db));

    editor.commit(&mut db);

    let stored = db.point("LI11");
    assert!(stored.selected);
    assert_eq!("Pool at the Bend", stored.description);
    assert_eq!(
        vec!["arm", "elbow", "large intestine"],
        stored.tags.iter().map(String::as_str).collect::<Vec<_>>()
    );
    assert_eq!(Some(Vec2::new(40.0, 50.0)), stored.position_in("side"));
    assert_eq!(vec![Change::Data], *log.borrow());
}

#[test]
fn capture_without_active_image_does_nothing() {
    let db = loaded();
    let mut editor = PointEditor::open(&db, "LI4");
    let mut view = FakeView {
        active: None,
        picks: vec![Vec2::new(1.0, 1.0)],
    };
    assert!(!editor.capture_position(&mut view));
    assert_eq!(1, view.picks.len());

    assert!(editor.remove_position("front"));
    assert!(!editor.remove_position("front"));
    assert!(editor.draft().positions.is_empty());
}

#[test]
fn image_loader_signals_completion_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("front.jpg");
    std::fs::write(&path, [0xff, 0xd8, 0xff, 0xe0]).unwrap();

    let (tx, rx) = mpsc::channel();
    let mut loader = ImageLoader::spawn_with(&path, move |p| {
        tx.send(p.to_path_buf()).unwrap();
    });

    let done = rx.recv_timeout(Duration::from_secs(5)).expect("completion");
    assert_eq!(path, done);
    assert!(loader.is_loaded());
    loader.wait();
    assert_eq!(Some(&[0xff, 0xd8, 0xff, 0xe0][..]), loader.bytes());
    assert!(loader.error().is_none());
    assert!(rx.try_recv().is_err());
}

#[test]
fn image_loader_reports_read_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = ImageLoader::spawn(dir.path().join("missing.png"));
    loader.wait();

    assert!(loader.is_loaded());
    assert!(loader.bytes().is_none());
    assert!(loader.error().is_some());
}
