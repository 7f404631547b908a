//! The narrator's timers as one owned unit
//!
//! Three periodic tasks and one one-shot share a single scheduler. Nothing
//! here sleeps: callers feed in the current instant and get back whatever is
//! due, which keeps the timing testable and lets [`dispose`](TimerScheduler::dispose)
//! cancel everything in one step.

use std::time::{Duration, Instant};
use storyspark_config::NarratorConfig;

/// Named timed tasks, in the order `poll` reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTask {
    MoodRefresh,
    SpeakingToggle,
    BlinkRelease,
    BlinkCheck,
}

impl TimerTask {
    const ORDER: [TimerTask; 4] = [
        Self::MoodRefresh,
        Self::SpeakingToggle,
        Self::BlinkRelease,
        Self::BlinkCheck,
    ];

    fn slot(self) -> usize {
        match self {
            Self::MoodRefresh => 0,
            Self::SpeakingToggle => 1,
            Self::BlinkRelease => 2,
            Self::BlinkCheck => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPeriods {
    pub mood_refresh: Duration,
    pub speaking_toggle: Duration,
    pub blink_check: Duration,
}

impl TimerPeriods {
    pub fn from_config(config: &NarratorConfig) -> Self {
        Self {
            mood_refresh: Duration::from_millis(config.mood_interval_ms),
            speaking_toggle: Duration::from_millis(config.speaking_interval_ms),
            blink_check: Duration::from_millis(config.blink_check_interval_ms),
        }
    }

    /// `None` for one-shot tasks
    fn period(&self, task: TimerTask) -> Option<Duration> {
        match task {
            TimerTask::MoodRefresh => Some(self.mood_refresh),
            TimerTask::SpeakingToggle => Some(self.speaking_toggle),
            TimerTask::BlinkCheck => Some(self.blink_check),
            TimerTask::BlinkRelease => None,
        }
    }
}

impl Default for TimerPeriods {
    fn default() -> Self {
        Self::from_config(&NarratorConfig::default())
    }
}

#[derive(Debug)]
pub struct TimerScheduler {
    periods: TimerPeriods,
    due: [Option<Instant>; 4],
}

impl TimerScheduler {
    pub fn new(periods: TimerPeriods) -> Self {
        Self {
            periods,
            due: [None; 4],
        }
    }

    pub fn periods(&self) -> TimerPeriods {
        self.periods
    }

    /// Arms every periodic task one period after `now`; drops any pending one-shot
    pub fn start(&mut self, now: Instant) {
        for task in TimerTask::ORDER {
            self.due[task.slot()] = self.periods.period(task).map(|p| now + p);
        }
    }

    pub fn schedule_once(&mut self, task: TimerTask, at: Instant) {
        self.due[task.slot()] = Some(at);
    }

    pub fn cancel(&mut self, task: TimerTask) {
        self.due[task.slot()] = None;
    }

    pub fn is_armed(&self, task: TimerTask) -> bool {
        self.due[task.slot()].is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.due.iter().all(Option::is_none)
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.due.iter().flatten().min().copied()
    }

    /// Returns each task due at `now` once, in [`TimerTask`] order
    ///
    /// Periodic tasks are re-armed on their original cadence; ticks missed
    /// while nobody polled are skipped, not replayed.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerTask> {
        let mut fired = Vec::new();
        for task in TimerTask::ORDER {
            let slot = task.slot();
            let Some(due) = self.due[slot] else {
                continue;
            };
            if due > now {
                continue;
            }

            fired.push(task);
            self.due[slot] = match self.periods.period(task) {
                Some(period) if !period.is_zero() => {
                    let mut next = due + period;
                    while next <= now {
                        next += period;
                    }
                    Some(next)
                }
                Some(_) => Some(now),
                None => None,
            };
        }
        fired
    }

    /// Cancels all four tasks at once
    pub fn dispose(&mut self) {
        self.due = [None; 4];
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new(TimerPeriods::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_nothing_due_before_start() {
        let mut scheduler = TimerScheduler::default();
        assert!(scheduler.is_idle());
        assert!(scheduler.poll(Instant::now() + ms(10_000)).is_empty());
    }

    #[test]
    fn test_periodic_cadence() {
        let t0 = Instant::now();
        let mut scheduler = TimerScheduler::default();
        scheduler.start(t0);

        assert!(scheduler.poll(t0 + ms(199)).is_empty());
        assert_eq!(scheduler.poll(t0 + ms(200)), vec![TimerTask::BlinkCheck]);
        assert_eq!(scheduler.poll(t0 + ms(400)), vec![TimerTask::BlinkCheck]);
        assert_eq!(
            scheduler.poll(t0 + ms(500)),
            vec![TimerTask::SpeakingToggle]
        );
        assert_eq!(
            scheduler.poll(t0 + ms(4000)),
            vec![
                TimerTask::MoodRefresh,
                TimerTask::SpeakingToggle,
                TimerTask::BlinkCheck
            ]
        );
    }

    #[test]
    fn test_missed_ticks_are_skipped() {
        let t0 = Instant::now();
        let mut scheduler = TimerScheduler::default();
        scheduler.start(t0);

        let fired = scheduler.poll(t0 + ms(1_050));
        assert_eq!(fired.iter().filter(|t| **t == TimerTask::BlinkCheck).count(), 1);
        assert!(scheduler.poll(t0 + ms(1_150)).is_empty());
        assert_eq!(scheduler.poll(t0 + ms(1_200)), vec![TimerTask::BlinkCheck]);
    }

    #[test]
    fn test_one_shot_fires_once() {
        let t0 = Instant::now();
        let mut scheduler = TimerScheduler::default();
        scheduler.schedule_once(TimerTask::BlinkRelease, t0 + ms(200));

        assert_eq!(scheduler.poll(t0 + ms(250)), vec![TimerTask::BlinkRelease]);
        assert!(!scheduler.is_armed(TimerTask::BlinkRelease));
        assert!(scheduler.poll(t0 + ms(500)).is_empty());
    }

    #[test]
    fn test_dispose_cancels_everything() {
        let t0 = Instant::now();
        let mut scheduler = TimerScheduler::default();
        scheduler.start(t0);
        scheduler.schedule_once(TimerTask::BlinkRelease, t0 + ms(100));

        scheduler.dispose();
        assert!(scheduler.is_idle());
        assert!(scheduler.next_due().is_none());
        assert!(scheduler.poll(t0 + ms(60_000)).is_empty());
    }
}
