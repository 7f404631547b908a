//! StorySpark narrator
//!
//! An on-screen storyteller whose face follows the story: a mood read from
//! the text, a speaking animation while audio plays, and the occasional
//! blink. [`ExpressionSynchronizer`] is the state machine;
//! [`spawn_driver`] runs it on a tokio interval.

mod driver;
mod expression;
mod scheduler;
mod synchronizer;

pub use driver::{spawn_driver, DriverHandle, DEFAULT_TICK};
pub use expression::{detect_mood, Expression};
pub use scheduler::{TimerPeriods, TimerScheduler, TimerTask};
pub use synchronizer::{ActivitySignal, ExpressionSynchronizer, NarratorSnapshot};
