//! Timeline widget: mirrors the session store into a rendering surface.

use crate::clock::{format_hhmmss, Clock};
use crate::dom::{Document, NodeId};
use crate::session::{Event, Interaction, SessionRecord, SessionStore};
use crate::storage::Storage;

pub const ROOT_CLASS: &str = "activity-tracker-widget";
pub const TOGGLE_CLASS: &str = "activity-tracker-button";
pub const PANEL_CLASS: &str = "activity-tracker-timeline";
pub const HEADER_CLASS: &str = "timeline-header";
pub const HEADER_INFO_CLASS: &str = "timeline-header-info";
pub const STATS_CLASS: &str = "session-stats";
pub const STAT_CLASS: &str = "stat";
pub const STAT_LABEL_CLASS: &str = "stat-label";
pub const STAT_VALUE_CLASS: &str = "stat-value";
pub const CONTENT_CLASS: &str = "timeline-content";
pub const LIST_CLASS: &str = "timeline-wrapper";
pub const ITEM_CLASS: &str = "timeline-item";
pub const EXPANDED_CLASS: &str = "expanded";

pub const PANEL_TITLE: &str = "Activity Timeline";
pub const STAT_LABELS: [&str; 4] = [
    "Session Duration",
    "Pages Viewed",
    "Total Clicks",
    "Forms Submitted",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub session_id: String,
    pub started_at: i64,
}

impl From<&SessionRecord> for Header {
    fn from(rec: &SessionRecord) -> Self {
        Self {
            session_id: rec.session_id.clone(),
            started_at: rec.started_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsView {
    pub duration_minutes: u64,
    pub pages_viewed: u64,
    pub total_clicks: u64,
    pub forms_submitted: u64,
}

impl StatsView {
    /// Display values in [`STAT_LABELS`] order.
    pub fn values(&self) -> [String; 4] {
        [
            format!("{} min", self.duration_minutes),
            self.pages_viewed.to_string(),
            self.total_clicks.to_string(),
            self.forms_submitted.to_string(),
        ]
    }
}

/// Where the widget draws itself. Every method must tolerate being called
/// before `mount` or after the host has removed parts of the structure.
pub trait TimelineSurface {
    fn mount(&mut self, header: &Header);
    fn clear_events(&mut self);
    fn append_event(&mut self, event: &Event);
    fn refresh_stats(&mut self, stats: &StatsView);
    fn set_expanded(&mut self, expanded: bool);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum PanelState {
    #[default]
    Collapsed,
    Expanded,
}

impl PanelState {
    pub fn toggled(self) -> Self {
        match self {
            PanelState::Collapsed => PanelState::Expanded,
            PanelState::Expanded => PanelState::Collapsed,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == PanelState::Expanded
    }
}

#[derive(Debug, Clone, Copy)]
struct MountedRefs {
    root: NodeId,
    toggle: NodeId,
    panel: NodeId,
    stats: NodeId,
    list: NodeId,
}

/// Renders the widget into a [`Document`] using the stable class-name markup.
#[derive(Debug)]
pub struct DomSurface {
    doc: Document,
    refs: Option<MountedRefs>,
}

impl DomSurface {
    pub fn new(doc: Document) -> Self {
        Self { doc, refs: None }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Host access to the page, e.g. to change its own markup.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn root(&self) -> Option<NodeId> {
        self.refs.map(|r| r.root)
    }

    pub fn toggle_button(&self) -> Option<NodeId> {
        self.refs.map(|r| r.toggle)
    }

    pub fn panel(&self) -> Option<NodeId> {
        self.refs.map(|r| r.panel)
    }

    fn render_header(&mut self, info: NodeId, header: &Header) {
        self.doc.remove_children(info);
        self.doc
            .append_element(info, "div", &[], &format!("Session ID: {}", header.session_id));
        self.doc.append_element(
            info,
            "div",
            &[],
            &format!("Started: {}", format_hhmmss(header.started_at)),
        );
    }

    /// Read the rendered panel back out of the markup.
    pub fn snapshot(&self) -> Option<PanelSnapshot> {
        let refs = self.refs?;
        let doc = &self.doc;
        let info = doc
            .query_selector(refs.panel, HEADER_INFO_CLASS)
            .map(|info| {
                doc.children(info)
                    .iter()
                    .map(|line| doc.text_content(*line))
                    .collect()
            })
            .unwrap_or_default();
        let stats = doc
            .query_selector_all(refs.stats, STAT_CLASS)
            .into_iter()
            .map(|stat| {
                let text_of = |class| {
                    doc.query_selector(stat, class)
                        .map(|n| doc.text_content(n))
                        .unwrap_or_default()
                };
                (text_of(STAT_LABEL_CLASS), text_of(STAT_VALUE_CLASS))
            })
            .collect();
        let items = doc
            .query_selector_all(refs.list, ITEM_CLASS)
            .into_iter()
            .map(|item| {
                let text_of = |class| {
                    doc.query_selector(item, class)
                        .map(|n| doc.text_content(n))
                        .unwrap_or_default()
                };
                SnapshotItem {
                    is_pageview: doc.has_class(item, "pageview"),
                    time: text_of("time"),
                    title: text_of("event-title"),
                    details: text_of("event-details"),
                }
            })
            .collect();
        Some(PanelSnapshot {
            expanded: doc.has_class(refs.panel, EXPANDED_CLASS),
            info,
            stats,
            items,
        })
    }
}

impl TimelineSurface for DomSurface {
    fn mount(&mut self, header: &Header) {
        if self.refs.is_some() {
            return;
        }
        let doc = &mut self.doc;
        let root = doc.create_element("div");
        doc.add_class(root, ROOT_CLASS);

        let toggle = doc.append_element(root, "button", &[TOGGLE_CLASS], "🕒");
        doc.set_attribute(toggle, "aria-label", "Open activity timeline");
        doc.set_attribute(toggle, "aria-expanded", "false");

        let panel = doc.append_element(root, "aside", &[PANEL_CLASS], "");
        let head = doc.append_element(panel, "header", &[HEADER_CLASS], "");
        doc.append_element(head, "h3", &[], PANEL_TITLE);
        let info = doc.append_element(head, "div", &[HEADER_INFO_CLASS], "");

        let stats = doc.append_element(panel, "section", &[STATS_CLASS], "");
        for label in STAT_LABELS {
            let stat = doc.append_element(stats, "div", &[STAT_CLASS], "");
            doc.append_element(stat, "div", &[STAT_LABEL_CLASS], label);
            doc.append_element(stat, "div", &[STAT_VALUE_CLASS], "");
        }

        let content = doc.append_element(panel, "div", &[CONTENT_CLASS], "");
        let list = doc.append_element(content, "div", &[LIST_CLASS], "");

        // Built detached, inserted as one new top-level node.
        let body = doc.body();
        doc.append_child(body, root);

        self.refs = Some(MountedRefs {
            root,
            toggle,
            panel,
            stats,
            list,
        });
        self.render_header(info, header);
    }

    fn clear_events(&mut self) {
        if let Some(refs) = self.refs {
            self.doc.remove_children(refs.list);
        }
    }

    fn append_event(&mut self, event: &Event) {
        let Some(refs) = self.refs else {
            return;
        };
        let doc = &mut self.doc;
        let item = doc.append_element(refs.list, "div", &[ITEM_CLASS, event.type_name()], "");
        doc.append_element(item, "div", &["time"], &format_hhmmss(event.time()));
        doc.append_element(item, "div", &["event-title"], event.title());
        doc.append_element(item, "div", &["event-details"], &event.details_line());
    }

    fn refresh_stats(&mut self, stats: &StatsView) {
        let Some(refs) = self.refs else {
            return;
        };
        let value_nodes = self.doc.query_selector_all(refs.stats, STAT_VALUE_CLASS);
        for (node, value) in value_nodes.into_iter().zip(stats.values()) {
            self.doc.set_text(node, &value);
        }
    }

    fn set_expanded(&mut self, expanded: bool) {
        let Some(refs) = self.refs else {
            return;
        };
        if expanded {
            self.doc.add_class(refs.panel, EXPANDED_CLASS);
        } else {
            self.doc.remove_class(refs.panel, EXPANDED_CLASS);
        }
        self.doc
            .set_attribute(refs.toggle, "aria-expanded", if expanded { "true" } else { "false" });
    }
}

/// Plain-data view of the rendered panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub expanded: bool,
    pub info: Vec<String>,
    pub stats: Vec<(String, String)>,
    pub items: Vec<SnapshotItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotItem {
    pub is_pageview: bool,
    pub time: String,
    pub title: String,
    pub details: String,
}

/// Owns the session store and the surface it is mirrored into.
pub struct TimelineWidget<S: Storage, C: Clock, V: TimelineSurface> {
    store: SessionStore<S, C>,
    surface: V,
    panel: PanelState,
    started: bool,
}

impl<S: Storage, C: Clock, V: TimelineSurface> TimelineWidget<S, C, V> {
    pub fn new(store: SessionStore<S, C>, surface: V) -> Self {
        Self {
            store,
            surface,
            panel: PanelState::default(),
            started: false,
        }
    }

    /// Mount, render stored history, then record this page view.
    /// Calling it again does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.surface.mount(&Header::from(self.store.record()));
        self.render_all();
        let event = self.store.record_page_view();
        self.surface.append_event(&event);
        self.refresh_stats();
        self.surface.set_expanded(self.panel.is_expanded());
    }

    /// Clear and re-render the full event list in insertion order.
    pub fn render_all(&mut self) {
        self.surface.clear_events();
        for event in &self.store.record().events {
            self.surface.append_event(event);
        }
    }

    pub fn track(&mut self, interaction: Interaction) -> Event {
        let event = self.store.record_interaction(interaction);
        self.surface.append_event(&event);
        self.refresh_stats();
        event
    }

    pub fn refresh_stats(&mut self) {
        let view = self.stats_view();
        self.surface.refresh_stats(&view);
    }

    pub fn stats_view(&self) -> StatsView {
        let stats = self.store.record().stats;
        StatsView {
            duration_minutes: self.store.duration_minutes(),
            pages_viewed: stats.pages_viewed,
            total_clicks: stats.total_clicks,
            forms_submitted: stats.forms_submitted,
        }
    }

    pub fn toggle(&mut self) -> PanelState {
        self.set_panel(self.panel.toggled());
        self.panel
    }

    /// Returns true if the panel was expanded.
    pub fn collapse(&mut self) -> bool {
        let was_expanded = self.panel.is_expanded();
        if was_expanded {
            self.set_panel(PanelState::Collapsed);
        }
        was_expanded
    }

    fn set_panel(&mut self, state: PanelState) {
        self.panel = state;
        self.surface.set_expanded(state.is_expanded());
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn store(&self) -> &SessionStore<S, C> {
        &self.store
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }
}
