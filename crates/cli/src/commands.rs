// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use console::{style, Term};
use media_engine::{format_time, render_split, AmplitudeSource, SyntheticAmplitudes, WaveformSplit};
use storyspark_config::{Config, ConfigManager};
use storyspark_core::{Story, StoryId};
use storyspark_library::StoryCatalogService;
use storyspark_narrator::{detect_mood, Expression};

const BAR_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// List the public catalog, falling back to the cached copy when offline
pub async fn list_catalog(catalog: &StoryCatalogService, offline: bool) -> Result<()> {
    let stories = if offline {
        catalog.cached_stories()
    } else {
        catalog.fetch_catalog().await
    };

    if stories.is_empty() {
        println!("No stories available. Connect to the server once to fill the offline cache.");
        return Ok(());
    }

    println!("\n{} Stories", style(stories.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for story in &stories {
        print_story_summary(story);
    }

    Ok(())
}

pub fn list_downloaded(catalog: &StoryCatalogService) -> Result<()> {
    let stories = catalog.downloaded_stories();
    if stories.is_empty() {
        println!("No stories saved for offline listening. Use 'download' to save one.");
        return Ok(());
    }

    println!("\n{} Offline Stories", style(stories.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for story in &stories {
        print_story_summary(story);
        if let Some(blob) = catalog.downloads().cached_ref(&story.id) {
            println!("  Audio: {}", style(blob).dim());
        }
    }

    Ok(())
}

/// Save a story's audio for offline listening
pub async fn download_story(catalog: &StoryCatalogService, id: &str) -> Result<()> {
    let story = find_story(catalog, id).await?;

    if story.audio_ref.as_deref().map_or(true, |r| r.trim().is_empty()) {
        bail!("'{}' has no audio to download", story.title);
    }

    println!("Downloading '{}'...", story.title);
    if !catalog.save_for_offline(&story).await {
        bail!("Failed to download '{}'. Check your connection and try again.", story.title);
    }

    println!("{} Saved for offline listening: {}", style("✓").green().bold(), story.title);
    if let Some(blob) = catalog.downloads().cached_ref(&story.id) {
        println!("  Audio: {}", blob);
    }

    Ok(())
}

pub fn remove_story(catalog: &StoryCatalogService, id: &str) -> Result<()> {
    let id = StoryId::from(id);
    let listed = catalog
        .cached_stories()
        .iter()
        .any(|s| s.id == id && s.is_downloaded);
    if !listed && !catalog.downloads().is_downloaded(&id) {
        println!("Story {} is not saved for offline listening.", id);
        return Ok(());
    }

    catalog.remove_offline(&id);
    println!("{} Removed offline audio for story {}", style("✓").green().bold(), id);

    Ok(())
}

/// List the signed-in user's own stories
pub async fn list_mine(catalog: &StoryCatalogService) -> Result<()> {
    let stories = catalog
        .list_user_stories()
        .await
        .context("Failed to list your stories")?;

    if stories.is_empty() {
        println!("You have no stories yet.");
        return Ok(());
    }

    println!("\n{} Your Stories", style(stories.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for story in &stories {
        print_story_summary(story);
    }

    Ok(())
}

/// Show detailed information about one of the user's stories
pub async fn show_story(catalog: &StoryCatalogService, id: &str) -> Result<()> {
    let story = catalog
        .get_user_story(&StoryId::from(id))
        .await
        .context("Failed to get story")?;

    println!("\n{}", style("Story Information").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID: {}", story.id);
    println!("Title: {}", style(&story.title).bold());
    if !story.theme.is_empty() {
        println!("Theme: {}", story.theme);
    }
    if !story.age_group.is_empty() {
        println!("Age Group: {}", story.age_group);
    }
    if !story.duration_label.is_empty() {
        println!("Duration: {}", story.duration_label);
    }
    if let Some(created) = story.created_at {
        println!("Created: {}", created.to_rfc3339());
    }
    match catalog.resolve_playback_ref(&story) {
        Some(audio) => println!("Audio: {}", audio),
        None => println!("Audio: {}", style("none").dim()),
    }
    if !story.text.is_empty() {
        println!("\n{}", story.text);
    }

    Ok(())
}

/// Delete one of the user's stories
pub async fn delete_story(catalog: &StoryCatalogService, id: &str, force: bool) -> Result<()> {
    let id = StoryId::from(id);

    if !force {
        let term = Term::stdout();
        term.write_line(&format!("Are you sure you want to delete story {}? (y/N)", id))?;
        let input = term.read_line().context("Failed to read input")?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    catalog
        .delete_story(&id)
        .await
        .context("Failed to delete story")?;

    println!("{} Story deleted: {}", style("✓").green().bold(), id);

    Ok(())
}

/// Looks a story up in the cached list, then the live catalog, then the
/// user's own stories
pub async fn find_story(catalog: &StoryCatalogService, id: &str) -> Result<Story> {
    let id = StoryId::from(id);

    if let Some(story) = find_by_id(catalog.cached_stories(), &id) {
        return Ok(story);
    }
    if let Some(story) = find_by_id(catalog.fetch_catalog().await, &id) {
        return Ok(story);
    }
    match catalog.get_user_story(&id).await {
        Ok(story) => Ok(story),
        Err(e) => {
            log::debug!("Story {} not found among user stories: {}", id, e);
            bail!("Story not found: {}", id)
        }
    }
}

pub fn show_mood(config: &Config, text: &str) {
    let mood = detect_mood(text, config.narrator.mood_sample_chars);
    println!("{} {}", face(mood), style(mood).bold().cyan());
}

pub fn show_waveform(config: &Config, position: f64, duration: f64, seed: Option<u64>) {
    let bars = config.player.waveform_bars;
    let samples = match seed {
        Some(seed) => SyntheticAmplitudes::seeded(seed).generate(bars),
        None => SyntheticAmplitudes::from_entropy().generate(bars),
    };
    let split = render_split(&samples, position, duration, config.player.waveform_width);

    println!("{}", styled_waveform(&samples, split));
    println!(
        "{} / {} ({:.0}%)",
        format_time(position),
        format_time(duration),
        split.progress_fraction * 100.0
    );
}

pub fn config_init(manager: &ConfigManager) -> Result<()> {
    let created = manager.initialize().context("Failed to write default configuration")?;
    if created {
        println!(
            "{} Wrote default configuration to {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!("Configuration already exists at {}", manager.config_path().display());
    }
    Ok(())
}

pub fn config_show(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}

/// Played bars highlighted, the rest dimmed
pub(crate) fn styled_waveform(samples: &[f64], split: WaveformSplit) -> String {
    let glyphs = waveform_glyphs(samples);
    let (played, rest) = glyphs.split_at(split.played_count.min(glyphs.len()));
    format!(
        "{}{}",
        style(played.iter().collect::<String>()).cyan(),
        style(rest.iter().collect::<String>()).dim()
    )
}

pub(crate) fn waveform_glyphs(samples: &[f64]) -> Vec<char> {
    samples.iter().map(|&a| bar_glyph(a)).collect()
}

/// Amplitudes span `[0.1, 0.9]`; anything outside lands on the end glyphs
pub(crate) fn bar_glyph(amplitude: f64) -> char {
    let scaled = ((amplitude - 0.1) / 0.8 * (BAR_GLYPHS.len() - 1) as f64).round();
    let index = if scaled.is_finite() {
        scaled.clamp(0.0, (BAR_GLYPHS.len() - 1) as f64) as usize
    } else {
        0
    };
    BAR_GLYPHS[index]
}

pub(crate) fn face(expression: Expression) -> &'static str {
    match expression {
        Expression::Neutral => "(•_•)",
        Expression::Happy => "(^‿^)",
        Expression::Excited => "(★o★)",
        Expression::Thinking => "(¬_¬)",
        Expression::Speaking => "(•o•)",
        Expression::Sad => "(╥_╥)",
        Expression::Scared => "(°□°)",
        Expression::Mysterious => "(¬‿¬)",
    }
}

fn find_by_id(stories: Vec<Story>, id: &StoryId) -> Option<Story> {
    stories.into_iter().find(|s| &s.id == id)
}

fn print_story_summary(story: &Story) {
    println!("\n{}", style(&story.title).bold());
    let mut details = vec![format!("ID: {}", truncate(story.id.as_str(), 12))];
    if !story.theme.is_empty() {
        details.push(format!("Theme: {}", story.theme));
    }
    if !story.age_group.is_empty() {
        details.push(format!("Ages: {}", story.age_group));
    }
    if !story.duration_label.is_empty() {
        details.push(format!("Duration: {}", story.duration_label));
    }
    println!("  {}", details.join(" | "));
    if story.is_downloaded {
        println!("  {}", style("⬇ Available offline").green());
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
