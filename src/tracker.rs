//! Delegated, document-level event wiring.
//!
//! The tracker sees every dispatched page event before host handlers run and
//! regardless of whether they stop propagation, the way a capture-phase
//! listener on the document would.

use itertools::Itertools;
use tracing::debug;

use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::dom::{Document, NodeId};
use crate::session::{Event, Interaction, SessionStore};
use crate::storage::Storage;
use crate::widget::{DomSurface, PanelState, TimelineWidget};

/// An interaction dispatched on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Click { target: NodeId },
    Submit { form: NodeId },
}

/// What the tracker did with a dispatched event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub recorded: Option<Event>,
    pub panel: Option<PanelState>,
}

impl DispatchOutcome {
    pub fn is_ignored(&self) -> bool {
        self.recorded.is_none() && self.panel.is_none()
    }
}

/// Label a primary-action click from the element's tag and visible text.
pub fn classify_click(tag: Option<&str>, text: &str) -> Interaction {
    let text = text.split_whitespace().join(" ");
    if text.to_lowercase().contains("shop now") {
        Interaction::link_click("Shop Now")
    } else if tag == Some("a") {
        Interaction::link_click(&text)
    } else {
        Interaction::button_click(&text)
    }
}

pub struct Tracker<S: Storage, C: Clock> {
    widget: TimelineWidget<S, C, DomSurface>,
    marker: String,
}

impl<S: Storage, C: Clock> Tracker<S, C> {
    /// Mount the widget into `document` and record the page view.
    pub fn attach(document: Document, store: SessionStore<S, C>, config: &TrackerConfig) -> Self {
        let mut widget = TimelineWidget::new(store, DomSurface::new(document));
        widget.start();
        Self {
            widget,
            marker: config.primary_marker.clone(),
        }
    }

    pub fn dispatch(&mut self, event: PageEvent) -> DispatchOutcome {
        match event {
            PageEvent::Click { target } => self.on_click(target),
            PageEvent::Submit { form } => self.on_submit(form),
        }
    }

    fn on_click(&mut self, target: NodeId) -> DispatchOutcome {
        let surface = self.widget.surface();
        let doc = surface.document();
        let on_toggle = surface
            .toggle_button()
            .is_some_and(|toggle| doc.contains(toggle, target));
        let inside_widget = surface.root().is_some_and(|root| doc.contains(root, target));
        let action = doc
            .closest(target, &self.marker)
            .map(|el| classify_click(doc.tag(el), &doc.text_content(el)));

        let mut outcome = DispatchOutcome::default();
        if on_toggle {
            outcome.panel = Some(self.widget.toggle());
        } else if !inside_widget && self.widget.collapse() {
            outcome.panel = Some(PanelState::Collapsed);
        }
        if let Some(interaction) = action {
            outcome.recorded = Some(self.widget.track(interaction));
        } else {
            debug!(%target, "click outside primary actions");
        }
        outcome
    }

    fn on_submit(&mut self, form: NodeId) -> DispatchOutcome {
        debug!(%form, "form submitted");
        DispatchOutcome {
            recorded: Some(self.widget.track(Interaction::form_submit())),
            panel: None,
        }
    }

    /// Periodic refresh of the live duration display.
    pub fn tick(&mut self) {
        self.widget.refresh_stats();
    }

    pub fn document(&self) -> &Document {
        self.widget.surface().document()
    }

    pub fn widget(&self) -> &TimelineWidget<S, C, DomSurface> {
        &self.widget
    }
}
