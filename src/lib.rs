//! Session activity tracking with a timeline widget.
//!
//! The session store and widget run headless; the terminal host in
//! `main.rs` is one consumer of them.

pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod demo;
pub mod dom;
pub mod error;
pub mod page;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod ui;
pub mod widget;

pub use error::StorageError;
pub use session::{Event, Interaction, InteractionKind, SessionRecord, SessionStats, SessionStore};
pub use tracker::{PageEvent, Tracker};
pub use widget::{DomSurface, PanelState, TimelineSurface, TimelineWidget};
