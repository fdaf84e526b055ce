use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use activity_timeline::app::{App, AppAction};
use activity_timeline::clock::ManualClock;
use activity_timeline::config::TrackerConfig;
use activity_timeline::demo::storefront;
use activity_timeline::page::Location;
use activity_timeline::runtime::{ChannelEventSource, HostEvent, Runner};
use activity_timeline::session::SessionStore;
use activity_timeline::storage::MemoryStorage;
use activity_timeline::PanelState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const T0: i64 = 1_700_000_000_000;

fn key(code: KeyCode) -> HostEvent {
    HostEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Headless host loop: the same Runner the binary uses, fed from a channel.
#[test]
fn headless_host_records_scripted_session() {
    let config = TrackerConfig::default();
    let clock = Rc::new(ManualClock::new(T0));
    let store = SessionStore::open(
        MemoryStorage::new(),
        Rc::clone(&clock),
        &config,
        &Location::new("/index.html"),
    );
    let mut app = App::new(storefront(), store, &config);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    // Shop Now, Add to cart, Subscribe, open timeline, quit
    for ev in [
        key(KeyCode::Enter),
        key(KeyCode::Down),
        key(KeyCode::Enter),
        key(KeyCode::Down),
        key(KeyCode::Down),
        key(KeyCode::Enter),
        key(KeyCode::Char('t')),
        key(KeyCode::Char('q')),
    ] {
        tx.send(ev).unwrap();
    }

    let mut quit = false;
    for _ in 0..100u32 {
        match runner.step() {
            HostEvent::Key(k) => {
                clock.advance(1_000);
                if app.on_key(k) == AppAction::Quit {
                    quit = true;
                    break;
                }
            }
            HostEvent::Resize => {}
            HostEvent::Tick => app.on_tick(),
        }
    }
    assert!(quit, "host loop should quit on 'q'");

    let widget = app.tracker.widget();
    let rec = widget.store().record();
    let details: Vec<String> = rec.events.iter().map(|e| e.details_line()).collect();
    assert_eq!(
        details,
        vec![
            "Visited: index.html",
            "Clicked link: Shop Now",
            "Clicked button: Add to cart",
            "Form submitted",
        ]
    );
    assert_eq!(rec.stats.pages_viewed, 1);
    assert_eq!(rec.stats.total_clicks, 2);
    assert_eq!(rec.stats.forms_submitted, 1);
    assert_eq!(widget.panel(), PanelState::Expanded);

    let snap = widget.surface().snapshot().unwrap();
    assert!(snap.expanded);
    assert_eq!(snap.items.len(), 4);
}

#[test]
fn ticks_refresh_live_duration() {
    let config = TrackerConfig::default();
    let clock = Rc::new(ManualClock::new(T0));
    let store = SessionStore::open(
        MemoryStorage::new(),
        Rc::clone(&clock),
        &config,
        &Location::new("/"),
    );
    let mut app = App::new(storefront(), store, &config);

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

    clock.advance(3 * 60_000 + 5_000);
    if let HostEvent::Tick = runner.step() {
        app.on_tick();
    }

    let snap = app.tracker.widget().surface().snapshot().unwrap();
    assert_eq!(snap.stats[0].1, "3 min");
}
