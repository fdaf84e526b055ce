//! Per-browser session record and the store that owns it.
//!
//! The store decides when a stored session has expired, appends events and
//! keeps the counters in step with them. It knows nothing about rendering.

use chrono::{TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::error::StorageError;
use crate::page::Location;
use crate::storage::Storage;

pub const STORAGE_KEY: &str = "activity-tracker-data";
pub const SESSION_INACTIVITY_MS: i64 = 60 * 60 * 1000;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 6;
const FORM_SUBMITTED: &str = "Form submitted";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionStats {
    pub pages_viewed: u64,
    pub total_clicks: u64,
    pub forms_submitted: u64,
}

/// What kind of interaction was observed, decided where it was observed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InteractionKind {
    LinkClick,
    ButtonClick,
    FormSubmit,
}

impl SessionStats {
    /// Counters implied by an event list. Interactions stored without a kind
    /// count as clicks unless they are the fixed submit label.
    pub fn from_events(events: &[Event]) -> Self {
        let mut stats = Self::default();
        for event in events {
            match event {
                Event::Pageview { .. } => stats.pages_viewed += 1,
                Event::Interaction { kind, details, .. } => {
                    let kind = kind.unwrap_or(if details == FORM_SUBMITTED {
                        InteractionKind::FormSubmit
                    } else {
                        InteractionKind::ButtonClick
                    });
                    if kind.counts_as_click() {
                        stats.total_clicks += 1;
                    } else {
                        stats.forms_submitted += 1;
                    }
                }
            }
        }
        stats
    }
}

impl InteractionKind {
    /// Link and button clicks count as clicks; submits are counted separately.
    pub fn counts_as_click(self) -> bool {
        matches!(self, InteractionKind::LinkClick | InteractionKind::ButtonClick)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub details: String,
}

impl Interaction {
    pub fn link_click(label: &str) -> Self {
        let details = if label.is_empty() {
            "Clicked link".to_string()
        } else {
            format!("Clicked link: {label}")
        };
        Self {
            kind: InteractionKind::LinkClick,
            details,
        }
    }

    pub fn button_click(label: &str) -> Self {
        let details = if label.is_empty() {
            "Clicked button".to_string()
        } else {
            format!("Clicked button: {label}")
        };
        Self {
            kind: InteractionKind::ButtonClick,
            details,
        }
    }

    pub fn form_submit() -> Self {
        Self {
            kind: InteractionKind::FormSubmit,
            details: FORM_SUBMITTED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Pageview {
        page: String,
        time: i64,
    },
    Interaction {
        details: String,
        time: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<InteractionKind>,
    },
}

impl Event {
    pub fn time(&self) -> i64 {
        match self {
            Event::Pageview { time, .. } | Event::Interaction { time, .. } => *time,
        }
    }

    pub fn is_pageview(&self) -> bool {
        matches!(self, Event::Pageview { .. })
    }

    /// `pageview` or `interaction`
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::Pageview { .. } => "pageview",
            Event::Interaction { .. } => "interaction",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Event::Pageview { .. } => "Page View",
            Event::Interaction { .. } => "Interaction",
        }
    }

    pub fn details_line(&self) -> String {
        match self {
            Event::Pageview { page, .. } => format!("Visited: {page}"),
            Event::Interaction { details, .. } if details.is_empty() => {
                "User interaction".to_string()
            }
            Event::Interaction { details, .. } => details.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub started_at: i64,
    pub last_activity_at: i64,
    pub stats: SessionStats,
    pub events: Vec<Event>,
}

impl SessionRecord {
    pub fn new(session_id: String, now: i64) -> Self {
        Self {
            session_id,
            started_at: now,
            last_activity_at: now,
            stats: SessionStats::default(),
            events: Vec::new(),
        }
    }

    /// Parse a stored blob, substituting defaults for missing or malformed parts.
    /// Returns `None` when the blob is not a record at all.
    pub fn from_stored(raw: &str, now: i64) -> Option<Self> {
        let stored: StoredRecord = serde_json::from_str(raw).ok()?;
        let session_id = stored.session_id.filter(|id| !id.is_empty())?;
        // Timestamps outside chrono's range are corruption, not history.
        if [stored.started_at, stored.last_activity_at]
            .into_iter()
            .flatten()
            .any(|ms| Utc.timestamp_millis_opt(ms).single().is_none())
        {
            return None;
        }
        let started_at = stored.started_at.or(stored.last_activity_at).unwrap_or(now);
        let last_activity_at = stored
            .last_activity_at
            .unwrap_or(started_at)
            .max(started_at);
        let (events, dropped) = match stored.events {
            Some(serde_json::Value::Array(items)) => {
                let total = items.len();
                let events: Vec<Event> = items
                    .into_iter()
                    .filter_map(|v| serde_json::from_value(v).ok())
                    .collect();
                let dropped = total - events.len();
                (events, dropped)
            }
            _ => (Vec::new(), 0),
        };
        let stats = if dropped > 0 {
            SessionStats::from_events(&events)
        } else {
            stored
                .stats
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default()
        };
        Some(Self {
            session_id,
            started_at,
            last_activity_at,
            stats,
            events,
        })
    }
}

/// Loose shape of a persisted record; every field may be missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    session_id: Option<String>,
    started_at: Option<i64>,
    last_activity_at: Option<i64>,
    stats: Option<serde_json::Value>,
    events: Option<serde_json::Value>,
}

/// `session_<createdAtMs>_<6 base-36 chars>`
pub fn generate_session_id(now: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("session_{now}_{suffix}")
}

/// Owns the persisted session record for one storage key.
pub struct SessionStore<S: Storage, C: Clock> {
    storage: S,
    clock: C,
    key: String,
    inactivity_timeout_ms: i64,
    page: String,
    record: SessionRecord,
    last_persist_error: Option<StorageError>,
}

impl<S: Storage, C: Clock> SessionStore<S, C> {
    /// Open the store and load (or create) the current session.
    pub fn open(storage: S, clock: C, config: &TrackerConfig, location: &Location) -> Self {
        let now = clock.now_ms();
        let mut store = Self {
            storage,
            clock,
            key: config.storage_key.clone(),
            inactivity_timeout_ms: config.inactivity_timeout_ms,
            page: location.page_name(),
            record: SessionRecord::new(String::new(), now),
            last_persist_error: None,
        };
        store.load_or_create();
        store
    }

    /// Re-read the stored record, starting a fresh session if it is absent,
    /// unparsable or expired. The touch is persisted either way.
    pub fn load_or_create(&mut self) -> &SessionRecord {
        let now = self.clock.now_ms();
        self.record = match self.read_live(now) {
            Some(mut record) => {
                record.last_activity_at = now.max(record.started_at);
                info!(session_id = %record.session_id, events = record.events.len(), "resumed session");
                record
            }
            None => {
                let record = SessionRecord::new(generate_session_id(now), now);
                info!(session_id = %record.session_id, "started new session");
                record
            }
        };
        self.persist();
        &self.record
    }

    fn read_live(&self, now: i64) -> Option<SessionRecord> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "could not read stored session");
                return None;
            }
        };
        let Some(record) = SessionRecord::from_stored(&raw, now) else {
            warn!(key = %self.key, "discarding unparsable session record");
            return None;
        };
        let idle = now.saturating_sub(record.last_activity_at);
        if idle > self.inactivity_timeout_ms {
            debug!(session_id = %record.session_id, idle_ms = idle, "stored session expired");
            return None;
        }
        Some(record)
    }

    pub fn record_page_view(&mut self) -> Event {
        let time = self.stamp();
        self.record.stats.pages_viewed += 1;
        self.append(Event::Pageview {
            page: self.page.clone(),
            time,
        })
    }

    pub fn record_interaction(&mut self, interaction: Interaction) -> Event {
        let time = self.stamp();
        if interaction.kind.counts_as_click() {
            self.record.stats.total_clicks += 1;
        } else {
            self.record.stats.forms_submitted += 1;
        }
        self.append(Event::Interaction {
            details: interaction.details,
            time,
            kind: Some(interaction.kind),
        })
    }

    /// Whole minutes since the session started, never negative.
    pub fn duration_minutes(&self) -> u64 {
        let elapsed = self.clock.now_ms().saturating_sub(self.record.started_at);
        u64::try_from(elapsed / 60_000).unwrap_or(0)
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    /// Error from the most recent write, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&StorageError> {
        self.last_persist_error.as_ref()
    }

    // Event times never run behind the last recorded activity, so the
    // event list stays sorted even if the wall clock steps back.
    fn stamp(&self) -> i64 {
        self.clock.now_ms().max(self.record.last_activity_at)
    }

    fn append(&mut self, event: Event) -> Event {
        debug!(kind = event.type_name(), details = %event.details_line(), "recorded event");
        self.record.last_activity_at = event.time();
        self.record.events.push(event.clone());
        self.persist();
        event
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.record)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set_item(&self.key, &json));
        match result {
            Ok(()) => self.last_persist_error = None,
            Err(err) => {
                warn!(error = %err, "session not persisted; keeping in-memory record");
                self.last_persist_error = Some(err);
            }
        }
    }
}
