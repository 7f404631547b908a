//! Seam between the controller and whatever actually plays audio

use crate::EngineResult;
use crossbeam_channel::Sender;
use std::fmt;
use storyspark_core::AudioRef;

/// Identifies one `load()`; events carry it so stale ones can be dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callbacks from the media runtime
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration is known; the source can play
    MetadataLoaded { duration: f64 },
    TimeUpdate { position: f64 },
    /// The runtime confirmed a play request
    PlaybackStarted,
    /// The runtime refused a play request after accepting it
    PlaybackRejected { reason: String },
    Ended,
    /// Load or decode fault
    Error { detail: String },
}

/// A [`MediaEvent`] with the session that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: MediaEvent,
}

/// Handed to the backend on bind; everything it emits is tagged with that
/// bind's session
#[derive(Debug, Clone)]
pub struct EventSink {
    session: SessionId,
    tx: Sender<SessionEvent>,
}

impl EventSink {
    pub(crate) fn new(session: SessionId, tx: Sender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Queues an event; silently dropped once the controller is gone
    pub fn emit(&self, event: MediaEvent) {
        let _ = self.tx.send(SessionEvent {
            session: self.session,
            event,
        });
    }
}

/// The media runtime as seen by [`PlaybackController`](crate::PlaybackController)
///
/// Calls are requests; outcomes come back through the [`EventSink`] given
/// to `bind`. Root-relative sources are resolved by the backend against
/// whatever origin it plays from.
pub trait MediaBackend: Send {
    fn bind(&mut self, source: &AudioRef, events: EventSink) -> EngineResult<()>;
    fn unbind(&mut self);
    fn play(&mut self) -> EngineResult<()>;
    fn pause(&mut self) -> EngineResult<()>;
    fn set_position(&mut self, seconds: f64) -> EngineResult<()>;
    fn set_volume(&mut self, volume: f64) -> EngineResult<()>;
}
