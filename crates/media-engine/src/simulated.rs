//! In-process backend that plays nothing but behaves like a media runtime
//!
//! Used by the CLI preview and by tests. Time only moves when the paired
//! [`SimulatedHandle`] says so.

use crate::backend::{EventSink, MediaBackend, MediaEvent};
use crate::{EngineError, EngineResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use storyspark_core::AudioRef;

#[derive(Debug)]
struct Inner {
    duration: f64,
    position: f64,
    volume: f64,
    playing: bool,
    source: Option<String>,
    sink: Option<EventSink>,
    defer_metadata: bool,
    fail_bind: Option<String>,
    reject_play: Option<String>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Backend half, owned by the controller
#[derive(Debug)]
pub struct SimulatedBackend {
    inner: Arc<Mutex<Inner>>,
}

/// Test/driver half: advances time and injects faults
#[derive(Debug, Clone)]
pub struct SimulatedHandle {
    inner: Arc<Mutex<Inner>>,
}

impl SimulatedBackend {
    /// Every bound source reports `duration` seconds
    pub fn new(duration: f64) -> (Self, SimulatedHandle) {
        let inner = Arc::new(Mutex::new(Inner {
            duration,
            position: 0.0,
            volume: 1.0,
            playing: false,
            source: None,
            sink: None,
            defer_metadata: false,
            fail_bind: None,
            reject_play: None,
        }));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            SimulatedHandle { inner },
        )
    }
}

impl MediaBackend for SimulatedBackend {
    fn bind(&mut self, source: &AudioRef, events: EventSink) -> EngineResult<()> {
        let mut inner = lock(&self.inner);
        if let Some(reason) = inner.fail_bind.take() {
            return Err(EngineError::BindFailed(reason));
        }
        inner.source = Some(source.as_str().to_string());
        inner.position = 0.0;
        inner.playing = false;
        if !inner.defer_metadata {
            events.emit(MediaEvent::MetadataLoaded {
                duration: inner.duration,
            });
        }
        inner.sink = Some(events);
        Ok(())
    }

    fn unbind(&mut self) {
        let mut inner = lock(&self.inner);
        inner.sink = None;
        inner.source = None;
        inner.playing = false;
    }

    fn play(&mut self) -> EngineResult<()> {
        let mut inner = lock(&self.inner);
        let sink = inner.sink.clone().ok_or(EngineError::NoSource)?;
        if let Some(reason) = inner.reject_play.take() {
            return Err(EngineError::Rejected(reason));
        }
        inner.playing = true;
        sink.emit(MediaEvent::PlaybackStarted);
        Ok(())
    }

    fn pause(&mut self) -> EngineResult<()> {
        lock(&self.inner).playing = false;
        Ok(())
    }

    fn set_position(&mut self, seconds: f64) -> EngineResult<()> {
        lock(&self.inner).position = seconds;
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> EngineResult<()> {
        lock(&self.inner).volume = volume;
        Ok(())
    }
}

impl SimulatedHandle {
    /// Moves the playhead forward while playing, emitting `TimeUpdate` and,
    /// at the end of the source, `Ended`
    pub fn advance(&self, seconds: f64) {
        let mut inner = lock(&self.inner);
        let Some(sink) = inner.sink.clone() else {
            return;
        };
        if !inner.playing {
            return;
        }

        inner.position += seconds;
        if inner.position >= inner.duration {
            inner.position = 0.0;
            inner.playing = false;
            sink.emit(MediaEvent::TimeUpdate {
                position: inner.duration,
            });
            sink.emit(MediaEvent::Ended);
        } else {
            sink.emit(MediaEvent::TimeUpdate {
                position: inner.position,
            });
        }
    }

    /// Holds back `MetadataLoaded` on the next binds until [`finish_loading`](Self::finish_loading)
    pub fn defer_metadata(&self, defer: bool) {
        lock(&self.inner).defer_metadata = defer;
    }

    pub fn finish_loading(&self) {
        let inner = lock(&self.inner);
        if let Some(sink) = &inner.sink {
            sink.emit(MediaEvent::MetadataLoaded {
                duration: inner.duration,
            });
        }
    }

    pub fn fail_next_bind(&self, reason: impl Into<String>) {
        lock(&self.inner).fail_bind = Some(reason.into());
    }

    pub fn reject_next_play(&self, reason: impl Into<String>) {
        lock(&self.inner).reject_play = Some(reason.into());
    }

    /// Emits a decode fault on the bound source
    pub fn fail(&self, detail: impl Into<String>) {
        if let Some(sink) = &lock(&self.inner).sink {
            sink.emit(MediaEvent::Error {
                detail: detail.into(),
            });
        }
    }

    /// Sink of the current binding, for replaying events by hand
    pub fn sink(&self) -> Option<EventSink> {
        lock(&self.inner).sink.clone()
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.inner).playing
    }

    pub fn position(&self) -> f64 {
        lock(&self.inner).position
    }

    pub fn volume(&self) -> f64 {
        lock(&self.inner).volume
    }

    pub fn source(&self) -> Option<String> {
        lock(&self.inner).source.clone()
    }
}
