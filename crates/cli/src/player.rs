// FILE: crates/cli/src/player.rs

use crate::commands::{face, styled_waveform};
use anyhow::{anyhow, bail, Context, Result};
use console::{style, Term};
use media_engine::{PlaybackController, PlaybackPhase, SimulatedBackend};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;
use storyspark_config::Config;
use storyspark_core::Story;
use storyspark_library::StoryCatalogService;
use storyspark_narrator::{
    detect_mood, spawn_driver, ExpressionSynchronizer, NarratorSnapshot, DEFAULT_TICK,
};
use tokio::time::{interval, Instant};

const FRAME: StdDuration = StdDuration::from_millis(100);

/// Plays a story on the simulated backend with the narrator alongside
///
/// The audio source is the offline copy when one exists. Ctrl-C stops early.
pub async fn preview(
    config: &Config,
    catalog: &StoryCatalogService,
    story: &Story,
    seconds: f64,
    speed: f64,
) -> Result<()> {
    let reference = catalog
        .resolve_playback_ref(story)
        .ok_or_else(|| anyhow!("'{}' has no audio to play", story.title))?;
    let offline = catalog.downloads().is_downloaded(&story.id);

    let (backend, media) = SimulatedBackend::new(seconds.max(1.0));
    let mut player = PlaybackController::from_config(Box::new(backend), &config.player);
    player.load(&reference).context("Failed to load audio")?;
    player.pump();

    let mut narrator = ExpressionSynchronizer::new(config.narrator.clone());
    narrator.set_story(
        detect_mood(&story.text, config.narrator.mood_sample_chars),
        story.text.clone(),
    );
    let activity = player.activity();
    narrator.attach_activity(move || activity.is_active());
    narrator.activate(Instant::now().into_std());
    let narrator = Arc::new(Mutex::new(narrator));

    let finished = Arc::clone(&narrator);
    player.on_complete(move || {
        finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .deactivate()
    });
    let driver = spawn_driver(Arc::clone(&narrator), DEFAULT_TICK);
    let snapshots = driver.snapshots();

    println!("\n{} {}", style("▶").green().bold(), style(&story.title).bold());
    println!(
        "  Source: {}{}",
        reference,
        if offline { " (offline copy)" } else { "" }
    );

    player.play().context("Failed to start playback")?;
    player.pump();

    let term = Term::stdout();
    if term.hide_cursor().is_err() {
        log::debug!("Terminal does not support hiding the cursor");
    }

    let step = FRAME.as_secs_f64() * speed.max(0.1);
    let mut ticker = interval(FRAME);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                interrupted = true;
                break;
            }
        }

        media.advance(step);
        player.pump();

        let snapshot = *snapshots.borrow();
        term.clear_line()?;
        term.write_str(&frame_line(&player, snapshot))?;

        if player.phase().is_terminal() {
            break;
        }
    }

    term.write_line("")?;
    let _ = term.show_cursor();
    driver.stop();
    narrator
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .dispose();

    match player.phase() {
        PlaybackPhase::Ended => {
            println!("{} Finished: {}", style("✓").green().bold(), story.title);
        }
        PlaybackPhase::Error => {
            let message = player
                .error()
                .map(|e| e.user_message())
                .unwrap_or_else(|| "Playback failed".to_string());
            player.dispose();
            bail!(message);
        }
        _ if interrupted => {
            println!("Stopped at {}", player.time_label());
        }
        _ => {}
    }

    player.dispose();
    Ok(())
}

fn frame_line(player: &PlaybackController, snapshot: NarratorSnapshot) -> String {
    format!(
        "{} {} {} / {}",
        narrator_face(snapshot),
        styled_waveform(player.waveform(), player.split()),
        player.time_label(),
        player.duration_label()
    )
}

pub(crate) fn narrator_face(snapshot: NarratorSnapshot) -> &'static str {
    if snapshot.blinking {
        "(-_-)"
    } else {
        face(snapshot.expression)
    }
}
