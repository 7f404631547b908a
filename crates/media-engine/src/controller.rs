//! Playback state machine over a single bound source

use crate::backend::{EventSink, MediaBackend, MediaEvent, SessionEvent, SessionId};
use crate::state::{PlaybackPhase, PlaybackState};
use crate::time::format_time;
use crate::waveform::{render_split, AmplitudeSource, SyntheticAmplitudes, WaveformLayout, WaveformSplit};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use storyspark_config::PlayerConfig;
use storyspark_core::{AppError, AudioRef, Result};

/// What subscribers are told
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackNotification {
    PhaseChanged {
        from: PlaybackPhase,
        to: PlaybackPhase,
    },
    /// Fires on every time update and seek, with the split already recomputed
    TimeUpdated {
        current_time: f64,
        duration: f64,
        split: WaveformSplit,
    },
    Ended,
    Failed(AppError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&PlaybackNotification) + Send>;

/// Shared "is audio playing" flag other components can poll
#[derive(Debug, Clone, Default)]
pub struct PlaybackActivity(Arc<AtomicBool>);

impl PlaybackActivity {
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, active: bool) {
        self.0.store(active, Ordering::Release);
    }
}

/// Drives one [`MediaBackend`] through load, play, pause, seek and end
///
/// Runtime callbacks queue up as session-tagged events and are applied by
/// [`pump`](Self::pump) or [`handle_event`](Self::handle_event). Each
/// `load` starts a new session, so anything still in flight for an earlier
/// source is dropped.
pub struct PlaybackController {
    backend: Box<dyn MediaBackend>,
    amplitudes: Box<dyn AmplitudeSource>,
    settings: PlayerConfig,
    state: PlaybackState,
    source: Option<AudioRef>,
    session: Option<SessionId>,
    next_session: SessionId,
    bound: bool,
    play_requested: bool,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    waveform: Vec<f64>,
    split: WaveformSplit,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    on_complete: Option<Box<dyn FnMut() + Send>>,
    activity: PlaybackActivity,
    disposed: bool,
}

impl PlaybackController {
    pub fn new(backend: Box<dyn MediaBackend>) -> Self {
        Self::from_config(backend, &PlayerConfig::default())
    }

    pub fn from_config(backend: Box<dyn MediaBackend>, config: &PlayerConfig) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            backend,
            amplitudes: Box::new(SyntheticAmplitudes::from_entropy()),
            settings: config.clone(),
            state: PlaybackState::new(config.default_volume.clamp(0.0, 1.0)),
            source: None,
            session: None,
            next_session: SessionId::first(),
            bound: false,
            play_requested: false,
            events_tx,
            events_rx,
            waveform: Vec::new(),
            split: WaveformSplit::default(),
            listeners: Vec::new(),
            next_listener: 0,
            on_complete: None,
            activity: PlaybackActivity::default(),
            disposed: false,
        }
    }

    /// Replaces the waveform generator used on the next `Ready`
    pub fn with_amplitudes(mut self, source: impl AmplitudeSource + 'static) -> Self {
        self.amplitudes = Box::new(source);
        self
    }

    // ---- transport ---------------------------------------------------------

    /// Validates and binds a new source, restarting from `Loading`
    ///
    /// A malformed reference moves straight to `Error` without touching the
    /// backend.
    pub fn load(&mut self, reference: &str) -> Result<SessionId> {
        if self.disposed {
            return Err(AppError::PlaybackRejected {
                reason: "player has been disposed".to_string(),
            });
        }

        self.detach();
        let session = self.next_session;
        self.next_session = session.next();
        self.session = Some(session);

        let previous = self.state.phase;
        self.state.reset_for_load();
        self.waveform.clear();
        self.split = WaveformSplit::default();
        self.play_requested = false;
        self.source = None;
        self.announce_phase(previous);

        let source = match AudioRef::parse(reference) {
            Ok(source) => source,
            Err(e) => {
                let err = AppError::from(e);
                self.fail(err.clone());
                return Err(err);
            }
        };

        let sink = EventSink::new(session, self.events_tx.clone());
        if let Err(e) = self.backend.bind(&source, sink) {
            let err = e.into_app_error(source.as_str());
            self.fail(err.clone());
            return Err(err);
        }
        self.bound = true;
        if let Err(e) = self.backend.set_volume(self.state.volume) {
            log::warn!("Backend ignored initial volume: {}", e);
        }

        log::debug!("Loading {} as session {}", source, session);
        self.source = Some(source);
        Ok(session)
    }

    /// Requests playback from `Ready` or `Paused`; elsewhere a no-op
    ///
    /// The phase only becomes `Playing` once the runtime confirms.
    pub fn play(&mut self) -> Result<()> {
        if self.disposed || !matches!(self.state.phase, PlaybackPhase::Ready | PlaybackPhase::Paused) {
            log::debug!("play() ignored in phase {}", self.state.phase);
            return Ok(());
        }

        match self.backend.play() {
            Ok(()) => {
                self.play_requested = true;
                Ok(())
            }
            Err(e) => {
                let err = e.into_app_error(self.source_str());
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    /// Pauses from `Playing`; elsewhere a no-op
    pub fn pause(&mut self) -> Result<()> {
        if self.disposed || self.state.phase != PlaybackPhase::Playing {
            log::debug!("pause() ignored in phase {}", self.state.phase);
            return Ok(());
        }

        self.backend
            .pause()
            .map_err(|e| e.into_app_error(self.source_str()))?;
        self.play_requested = false;
        self.set_phase(PlaybackPhase::Paused);
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<()> {
        match self.state.phase {
            PlaybackPhase::Playing => self.pause(),
            PlaybackPhase::Ready | PlaybackPhase::Paused => self.play(),
            _ => Ok(()),
        }
    }

    /// Jumps to `seconds`, clamped to `[0, duration]`
    ///
    /// Does nothing until the duration is known.
    pub fn seek(&mut self, seconds: f64) {
        if self.disposed
            || !self.state.phase.has_metadata()
            || !(self.state.duration > 0.0)
            || seconds.is_nan()
        {
            return;
        }

        let target = seconds.clamp(0.0, self.state.duration);
        if let Err(e) = self.backend.set_position(target) {
            log::warn!("Seek to {:.1}s failed: {}", target, e);
            return;
        }
        self.state.current_time = target;
        self.refresh_split();
    }

    /// Seeks to a fraction of the duration
    pub fn seek_fraction(&mut self, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        self.seek(fraction.clamp(0.0, 1.0) * self.state.duration);
    }

    /// Seeks to where a click at `x` lands on a waveform drawn `width` wide
    pub fn seek_to_waveform_x(&mut self, x: f64, width: f64) {
        let fraction = WaveformLayout::new(width, self.settings.waveform_gap).fraction_at(x);
        self.seek_fraction(fraction);
    }

    pub fn skip(&mut self, delta_seconds: f64) {
        self.seek(self.state.current_time + delta_seconds);
    }

    pub fn skip_forward(&mut self) {
        self.skip(self.settings.skip_seconds);
    }

    pub fn skip_back(&mut self) {
        self.skip(-self.settings.skip_seconds);
    }

    /// Sets the volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() || self.disposed {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        if self.bound {
            if let Err(e) = self.backend.set_volume(volume) {
                log::warn!("Backend rejected volume {:.2}: {}", volume, e);
            }
        }
    }

    // ---- runtime events ----------------------------------------------------

    /// Applies every queued runtime event in arrival order
    ///
    /// Returns how many were applied rather than dropped as stale.
    pub fn pump(&mut self) -> usize {
        let pending: Vec<SessionEvent> = self.events_rx.try_iter().collect();
        let mut applied = 0;
        for event in pending {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Applies one runtime event; returns false if it was dropped
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        if self.disposed || Some(event.session) != self.session {
            log::debug!(
                "Dropping {:?} from stale session {}",
                event.event,
                event.session
            );
            return false;
        }
        if self.state.phase.is_terminal() {
            log::debug!("Dropping {:?} after {}", event.event, self.state.phase);
            return false;
        }

        match event.event {
            MediaEvent::MetadataLoaded { duration } => {
                if self.state.phase != PlaybackPhase::Loading {
                    return false;
                }
                self.state.duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    0.0
                };
                self.waveform = self.amplitudes.generate(self.settings.waveform_bars);
                self.set_phase(PlaybackPhase::Ready);
                self.refresh_split();
            }
            MediaEvent::TimeUpdate { position } => {
                if !self.state.phase.has_metadata() || position.is_nan() {
                    return false;
                }
                self.state.current_time = if self.state.duration > 0.0 {
                    position.clamp(0.0, self.state.duration)
                } else {
                    position.max(0.0)
                };
                self.refresh_split();
            }
            MediaEvent::PlaybackStarted => {
                if !self.play_requested
                    || !matches!(self.state.phase, PlaybackPhase::Ready | PlaybackPhase::Paused)
                {
                    return false;
                }
                self.play_requested = false;
                self.set_phase(PlaybackPhase::Playing);
            }
            MediaEvent::PlaybackRejected { reason } => {
                self.play_requested = false;
                self.fail(AppError::PlaybackRejected { reason });
            }
            MediaEvent::Ended => {
                if !self.state.phase.has_metadata() {
                    return false;
                }
                self.play_requested = false;
                self.state.current_time = 0.0;
                self.refresh_split();
                self.set_phase(PlaybackPhase::Ended);
                self.notify(PlaybackNotification::Ended);
                if let Some(callback) = self.on_complete.as_mut() {
                    callback();
                }
            }
            MediaEvent::Error { detail } => {
                let err = AppError::MediaLoadFailed {
                    reference: self.source_str().to_string(),
                    reason: detail,
                };
                self.fail(err);
            }
        }
        true
    }

    // ---- observers ---------------------------------------------------------

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&PlaybackNotification) + Send + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Called once each time a source plays to the end
    pub fn on_complete(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn activity(&self) -> PlaybackActivity {
        self.activity.clone()
    }

    /// Unbinds the backend and drops every listener; later events and
    /// commands are ignored
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.detach();
        self.session = None;
        self.listeners.clear();
        self.on_complete = None;
        self.play_requested = false;
        self.state.phase = PlaybackPhase::Idle;
        self.activity.set(false);
        self.disposed = true;
        log::debug!("Playback controller disposed");
    }

    // ---- accessors ---------------------------------------------------------

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    pub fn duration(&self) -> f64 {
        self.state.duration
    }

    pub fn volume(&self) -> f64 {
        self.state.volume
    }

    pub fn error(&self) -> Option<&AppError> {
        self.state.error.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn waveform(&self) -> &[f64] {
        &self.waveform
    }

    pub fn split(&self) -> WaveformSplit {
        self.split
    }

    pub fn time_label(&self) -> String {
        format_time(self.state.current_time)
    }

    pub fn duration_label(&self) -> String {
        format_time(self.state.duration)
    }

    // ---- internals ---------------------------------------------------------

    fn source_str(&self) -> &str {
        self.source.as_ref().map(AudioRef::as_str).unwrap_or_default()
    }

    fn detach(&mut self) {
        if self.bound {
            self.backend.unbind();
            self.bound = false;
        }
    }

    fn set_phase(&mut self, to: PlaybackPhase) {
        let from = self.state.phase;
        self.state.phase = to;
        self.announce_phase(from);
    }

    fn announce_phase(&mut self, from: PlaybackPhase) {
        let to = self.state.phase;
        self.activity.set(to == PlaybackPhase::Playing);
        if from != to {
            log::debug!("Playback {} -> {}", from, to);
            self.notify(PlaybackNotification::PhaseChanged { from, to });
        }
    }

    fn fail(&mut self, error: AppError) {
        log::warn!("Playback failed: {}", error);
        let from = self.state.phase;
        self.play_requested = false;
        self.state.fail(error.clone());
        self.announce_phase(from);
        self.notify(PlaybackNotification::Failed(error));
    }

    fn refresh_split(&mut self) {
        self.split = render_split(
            &self.waveform,
            self.state.current_time,
            self.state.duration,
            self.settings.waveform_width,
        );
        self.notify(PlaybackNotification::TimeUpdated {
            current_time: self.state.current_time,
            duration: self.state.duration,
            split: self.split,
        });
    }

    fn notify(&mut self, notification: PlaybackNotification) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&notification);
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.dispose();
    }
}
