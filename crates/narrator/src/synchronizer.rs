//! Narrator mood state machine

use crate::expression::{detect_mood, Expression};
use crate::scheduler::{TimerPeriods, TimerScheduler, TimerTask};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storyspark_config::NarratorConfig;

/// Reports whether audio is currently playing
pub type ActivitySignal = Arc<dyn Fn() -> bool + Send + Sync>;

/// Everything the renderer reads, taken in one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarratorSnapshot {
    pub expression: Expression,
    pub blinking: bool,
    /// Last detected mood, what speaking alternates with
    pub mood: Expression,
    pub active: bool,
}

/// Picks the narrator's face from the story text and playback activity
///
/// While active, three timers run: a mood refresh that may re-read the
/// story text, a speaking toggle that alternates "speaking" with the mood
/// while audio plays, and a blink check. All of them live in one
/// [`TimerScheduler`] and are driven through [`tick`](Self::tick).
pub struct ExpressionSynchronizer {
    config: NarratorConfig,
    scheduler: TimerScheduler,
    rng: Box<dyn RngCore + Send>,
    activity: Option<ActivitySignal>,
    active: bool,
    base_mood: Expression,
    text: String,
    expression: Expression,
    mood: Expression,
    blinking: bool,
    last_blink: Option<Instant>,
    last_toggle: Option<Instant>,
}

impl ExpressionSynchronizer {
    pub fn new(config: NarratorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: NarratorConfig, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            scheduler: TimerScheduler::new(TimerPeriods::from_config(&config)),
            config,
            rng: Box::new(rng),
            activity: None,
            active: false,
            base_mood: Expression::Neutral,
            text: String::new(),
            expression: Expression::Neutral,
            mood: Expression::Neutral,
            blinking: false,
            last_blink: None,
            last_toggle: None,
        }
    }

    /// Sets the fallback mood and the text moods are read from
    pub fn set_story(&mut self, base_mood: Expression, text: impl Into<String>) {
        self.base_mood = base_mood;
        self.text = text.into();
    }

    pub fn attach_activity(&mut self, signal: impl Fn() -> bool + Send + Sync + 'static) {
        self.activity = Some(Arc::new(signal));
    }

    pub fn detach_activity(&mut self) {
        self.activity = None;
    }

    pub fn set_active(&mut self, active: bool, now: Instant) {
        if active {
            self.activate(now);
        } else {
            self.deactivate();
        }
    }

    /// Starts all timers, showing the base mood
    pub fn activate(&mut self, now: Instant) {
        if self.active {
            return;
        }
        self.active = true;
        self.expression = self.base_mood;
        self.mood = self.base_mood;
        self.blinking = false;
        self.last_blink = Some(now);
        self.last_toggle = Some(now);
        self.scheduler.start(now);
        log::debug!("Narrator active as {}", self.expression);
    }

    /// Forces neutral, stops blinking and cancels every timer in one step
    pub fn deactivate(&mut self) {
        self.scheduler.dispose();
        self.expression = Expression::Neutral;
        self.blinking = false;
        if self.active {
            log::debug!("Narrator inactive");
        }
        self.active = false;
    }

    /// Deactivates and lets go of the activity signal
    pub fn dispose(&mut self) {
        self.deactivate();
        self.activity = None;
    }

    /// Runs whatever timers are due at `now` and returns the resulting state
    pub fn tick(&mut self, now: Instant) -> NarratorSnapshot {
        if self.active {
            for task in self.scheduler.poll(now) {
                match task {
                    TimerTask::MoodRefresh => self.refresh_mood(),
                    TimerTask::SpeakingToggle => self.toggle_speaking(now),
                    TimerTask::BlinkRelease => self.blinking = false,
                    TimerTask::BlinkCheck => self.check_blink(now),
                }
            }
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> NarratorSnapshot {
        NarratorSnapshot {
            expression: self.expression,
            blinking: self.blinking,
            mood: self.mood,
            active: self.active,
        }
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Earliest instant at which `tick` would change anything
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    fn refresh_mood(&mut self) {
        if self.rng.gen::<f64>() >= self.config.mood_change_probability {
            return;
        }
        let mood = if self.text.is_empty() {
            self.base_mood
        } else {
            detect_mood(&self.text, self.config.mood_sample_chars)
        };
        self.mood = mood;
        if self.expression != Expression::Speaking {
            self.expression = mood;
        }
        log::debug!("Narrator mood {}", mood);
    }

    fn toggle_speaking(&mut self, now: Instant) {
        let Some(signal) = &self.activity else {
            return;
        };
        if !signal() {
            self.expression = Expression::Neutral;
            return;
        }

        let debounce = Duration::from_millis(self.config.speaking_debounce_ms);
        let since = self
            .last_toggle
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::MAX);
        if since <= debounce {
            return;
        }

        self.expression = if self.expression == Expression::Speaking {
            self.mood
        } else {
            Expression::Speaking
        };
        self.last_toggle = Some(now);
    }

    fn check_blink(&mut self, now: Instant) {
        let gap = Duration::from_millis(self.config.blink_min_gap_ms);
        let since = self
            .last_blink
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::MAX);
        if since <= gap {
            return;
        }

        self.blinking = true;
        self.last_blink = Some(now);
        self.scheduler.schedule_once(
            TimerTask::BlinkRelease,
            now + Duration::from_millis(self.config.blink_hold_ms),
        );
    }
}

impl fmt::Debug for ExpressionSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionSynchronizer")
            .field("active", &self.active)
            .field("expression", &self.expression)
            .field("mood", &self.mood)
            .field("blinking", &self.blinking)
            .field("has_activity", &self.activity.is_some())
            .finish()
    }
}
