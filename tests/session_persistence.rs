use std::rc::Rc;

use activity_timeline::clock::ManualClock;
use activity_timeline::config::TrackerConfig;
use activity_timeline::dom::Document;
use activity_timeline::page::Location;
use activity_timeline::session::{Event, SessionStore, SESSION_INACTIVITY_MS, STORAGE_KEY};
use activity_timeline::storage::{FileStorage, Storage};
use activity_timeline::tracker::{PageEvent, Tracker};
use tempfile::tempdir;

const T0: i64 = 1_700_000_000_000;

fn page_with_button() -> (Document, activity_timeline::dom::NodeId) {
    let mut doc = Document::new();
    let body = doc.body();
    let btn = doc.append_element(body, "button", &["btn-primary"], "Buy");
    (doc, btn)
}

fn load_page(
    dir: &std::path::Path,
    clock: &Rc<ManualClock>,
    path: &str,
) -> (
    Tracker<FileStorage, Rc<ManualClock>>,
    activity_timeline::dom::NodeId,
) {
    let config = TrackerConfig::default();
    let store = SessionStore::open(
        FileStorage::with_dir(dir),
        Rc::clone(clock),
        &config,
        &Location::new(path),
    );
    let (doc, btn) = page_with_button();
    (Tracker::attach(doc, store, &config), btn)
}

#[test]
fn session_carries_across_page_loads() {
    let dir = tempdir().unwrap();
    let clock = Rc::new(ManualClock::new(T0));

    let (mut first, btn) = load_page(dir.path(), &clock, "/index.html");
    clock.advance(2_000);
    first.dispatch(PageEvent::Click { target: btn });
    let id = first.widget().store().record().session_id.clone();
    drop(first);

    clock.advance(60_000);
    let (second, _) = load_page(dir.path(), &clock, "/products/shoes.html");
    let rec = second.widget().store().record();
    assert_eq!(rec.session_id, id);
    assert_eq!(rec.stats.pages_viewed, 2);
    assert_eq!(rec.stats.total_clicks, 1);
    assert!(matches!(
        rec.events.last(),
        Some(Event::Pageview { page, .. }) if page == "shoes.html"
    ));

    // History is rendered in insertion order on the new page
    let snap = second.widget().surface().snapshot().unwrap();
    let titles: Vec<&str> = snap.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["Page View", "Interaction", "Page View"]);
}

#[test]
fn idle_gap_starts_fresh_session() {
    let dir = tempdir().unwrap();
    let clock = Rc::new(ManualClock::new(T0));

    let (first, _) = load_page(dir.path(), &clock, "/");
    let id = first.widget().store().record().session_id.clone();
    drop(first);

    clock.advance(SESSION_INACTIVITY_MS + 1);
    let (second, _) = load_page(dir.path(), &clock, "/");
    let rec = second.widget().store().record();
    assert_ne!(rec.session_id, id);
    assert_eq!(rec.events.len(), 1);
    assert_eq!(rec.stats.pages_viewed, 1);
}

#[test]
fn corrupted_file_is_replaced() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::with_dir(dir.path());
    storage.set_item(STORAGE_KEY, "\u{0}garbage").unwrap();

    let clock = Rc::new(ManualClock::new(T0));
    let (tracker, _) = load_page(dir.path(), &clock, "/");
    let raw = storage.get_item(STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains(&tracker.widget().store().record().session_id));
}

#[test]
fn host_markup_survives_mount() {
    let dir = tempdir().unwrap();
    let clock = Rc::new(ManualClock::new(T0));
    let (tracker, btn) = load_page(dir.path(), &clock, "/");
    let doc = tracker.document();
    assert_eq!(doc.children(doc.body())[0], btn);
    assert_eq!(doc.text_content(btn), "Buy");
    assert_eq!(doc.children(doc.body()).len(), 2);
}
