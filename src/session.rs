//! Per-session state shared by command handlers.
//!
//! Holds the configuration, the data store handle and the current ring and
//! subject selection. The evaluator owns one session and lends it to each
//! handler call, so independent sessions (and tests) never share state.

use crate::commands::format::LineFormatter;
use crate::commands::handlers::HandlerError;
use crate::config::Config;
use crate::persistence::{Ring, Store, Subject};
use sqlx::sqlite::SqlitePool;

/// Session context for one REPL.
pub struct Session {
    config: Config,
    store: Option<Store>,
    ring: Option<Ring>,
    subject: Option<Subject>,
    debug: bool,
    quit_requested: bool,
}

impl Session {
    /// Creates a session backed by a data store.
    pub fn new(config: Config, store: Store) -> Self {
        Self::build(config, Some(store))
    }

    /// Creates a session without a data store; storage commands fail with an
    /// internal error.
    pub fn detached(config: Config) -> Self {
        Self::build(config, None)
    }

    fn build(config: Config, store: Option<Store>) -> Self {
        let debug = config.debug;
        Self {
            config,
            store,
            ring: None,
            subject: None,
            debug,
            quit_requested: false,
        }
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the row formatter for the configured color and metadata options.
    pub fn formatter(&self) -> LineFormatter {
        LineFormatter::new(self.config.color, self.config.show_metadata)
    }

    /// Returns the data store.
    pub fn store(&self) -> Result<&Store, HandlerError> {
        self.store
            .as_ref()
            .ok_or_else(|| HandlerError::internal("no data store is open"))
    }

    /// Returns the data store's connection pool.
    pub fn pool(&self) -> Result<&SqlitePool, HandlerError> {
        self.store().map(Store::pool)
    }

    /// Returns the selected ring, if any.
    pub fn ring(&self) -> Option<&Ring> {
        self.ring.as_ref()
    }

    /// Returns the selected ring or a bad-request error naming the selector.
    pub fn require_ring(&self) -> Result<&Ring, HandlerError> {
        self.ring
            .as_ref()
            .ok_or_else(|| HandlerError::bad_request("no ring selected (use 'rs <id>')"))
    }

    /// Selects a ring. Changing ring always clears the subject selection.
    pub fn select_ring(&mut self, ring: Option<Ring>) {
        self.ring = ring;
        self.subject = None;
    }

    /// Replaces the selected ring's row after an update, keeping the subject.
    pub fn refresh_ring(&mut self, ring: Ring) {
        if self.ring.as_ref().is_some_and(|r| r.id == ring.id) {
            self.ring = Some(ring);
        }
    }

    /// Returns the selected subject, if any.
    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    /// Returns the selected subject or a bad-request error naming the selector.
    pub fn require_subject(&self) -> Result<&Subject, HandlerError> {
        self.subject
            .as_ref()
            .ok_or_else(|| HandlerError::bad_request("no subject selected (use 'ss <id>')"))
    }

    /// Selects a subject of the current ring.
    pub fn select_subject(&mut self, subject: Option<Subject>) {
        self.subject = subject;
    }

    /// Returns true when full failure traces should be printed.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Turns debug mode on or off.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Asks the REPL to stop after the current line.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Returns true once a quit has been requested.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Prompt text showing the current selection, e.g. `dossier berlin/WOLF> `.
    pub fn prompt(&self) -> String {
        match (&self.ring, &self.subject) {
            (Some(ring), Some(subject)) => format!("dossier {}/{}> ", ring.name, subject.codename),
            (Some(ring), None) => format!("dossier {}> ", ring.name),
            _ => "dossier> ".to_string(),
        }
    }
}
