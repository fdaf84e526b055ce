use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::demo::{Control, ControlAction, DemoPage};
use crate::dom::NodeId;
use crate::session::SessionStore;
use crate::storage::Storage;
use crate::tracker::{PageEvent, Tracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Terminal host: a demo page with the timeline widget mounted into it.
pub struct App<S: Storage, C: Clock> {
    pub tracker: Tracker<S, C>,
    pub heading: String,
    pub intro: String,
    pub controls: Vec<Control>,
    pub form: Option<NodeId>,
    pub focus: usize,
    pub scroll: u16,
    pub status: Option<String>,
}

impl<S: Storage, C: Clock> App<S, C> {
    pub fn new(page: DemoPage, store: SessionStore<S, C>, config: &TrackerConfig) -> Self {
        let tracker = Tracker::attach(page.document, store, config);
        Self {
            tracker,
            heading: page.heading,
            intro: page.intro,
            controls: page.controls,
            form: page.form,
            focus: 0,
            scroll: 0,
            status: None,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        if key.kind != KeyEventKind::Press {
            return AppAction::Continue;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return AppAction::Quit
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focus = self.focus.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.focus + 1 < self.controls.len() {
                    self.focus += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_focused(),
            KeyCode::Char('t') => {
                if let Some(toggle) = self.tracker.widget().surface().toggle_button() {
                    self.dispatch(PageEvent::Click { target: toggle });
                }
            }
            KeyCode::Char('s') => {
                if let Some(form) = self.form {
                    self.dispatch(PageEvent::Submit { form });
                }
            }
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(5),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(5),
            _ => {}
        }
        AppAction::Continue
    }

    pub fn on_tick(&mut self) {
        self.tracker.tick();
    }

    fn activate_focused(&mut self) {
        let Some(control) = self.controls.get(self.focus) else {
            return;
        };
        let (node, action) = (control.node, control.action);
        self.dispatch(PageEvent::Click { target: node });
        if let ControlAction::Submit { form } = action {
            self.dispatch(PageEvent::Submit { form });
        }
    }

    fn dispatch(&mut self, event: PageEvent) {
        let outcome = self.tracker.dispatch(event);
        if let Some(recorded) = &outcome.recorded {
            self.status = Some(format!("Recorded: {}", recorded.details_line()));
        } else if let Some(panel) = outcome.panel {
            self.status = Some(format!("Timeline {}", panel.to_string().to_lowercase()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::demo::storefront;
    use crate::page::Location;
    use crate::storage::MemoryStorage;
    use crate::widget::PanelState;
    use std::rc::Rc;

    fn app() -> App<MemoryStorage, Rc<ManualClock>> {
        let config = TrackerConfig::default();
        let store = SessionStore::open(
            MemoryStorage::new(),
            Rc::new(ManualClock::new(1_700_000_000_000)),
            &config,
            &Location::new("/index.html"),
        );
        App::new(storefront(), store, &config)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert_eq!(app.on_key(press(KeyCode::Esc)), AppAction::Quit);
        assert_eq!(app.on_key(press(KeyCode::Char('q'))), AppAction::Quit);
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppAction::Quit
        );
    }

    #[test]
    fn focus_is_clamped() {
        let mut app = app();
        app.on_key(press(KeyCode::Up));
        assert_eq!(app.focus, 0);
        for _ in 0..10 {
            app.on_key(press(KeyCode::Down));
        }
        assert_eq!(app.focus, app.controls.len() - 1);
    }

    #[test]
    fn enter_on_subscribe_records_submit_only() {
        let mut app = app();
        app.focus = 3;
        app.on_key(press(KeyCode::Enter));
        let stats = app.tracker.widget().store().record().stats;
        assert_eq!(stats.forms_submitted, 1);
        assert_eq!(stats.total_clicks, 0);
        assert_eq!(app.status.as_deref(), Some("Recorded: Form submitted"));
    }

    #[test]
    fn toggle_key_expands_panel() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('t')));
        assert_eq!(app.tracker.widget().panel(), PanelState::Expanded);
        assert_eq!(app.status.as_deref(), Some("Timeline expanded"));

        // Clicking a page control collapses it again
        app.on_key(press(KeyCode::Enter));
        assert_eq!(app.tracker.widget().panel(), PanelState::Collapsed);
        assert_eq!(
            app.status.as_deref(),
            Some("Recorded: Clicked link: Shop Now")
        );
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app();
        let mut key = press(KeyCode::Char('s'));
        key.kind = KeyEventKind::Release;
        app.on_key(key);
        assert_eq!(app.tracker.widget().store().record().stats.forms_submitted, 0);
    }
}
