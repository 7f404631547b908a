// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use storyspark_config::{apply_env_overrides, Config, ConfigError, ConfigManager};

mod commands;
mod context;
mod player;

fn build_cli() -> Command {
    Command::new("storyspark")
        .version(env!("CARGO_PKG_VERSION"))
        .author("StorySpark Team")
        .about("Offline story library, audio playback and narrator preview")
        .arg(
            Arg::new("config-dir")
                .short('c')
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml (defaults to the platform config dir)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("TOKEN")
                .help("Session token for your own stories")
                .env("STORYSPARK_TOKEN")
                .hide_env_values(true)
                .global(true),
        )
        .subcommand(
            Command::new("catalog")
                .about("List the public story catalog")
                .arg(
                    Arg::new("offline")
                        .long("offline")
                        .help("Show the cached list without contacting the server")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("downloaded").about("List stories saved for offline listening"))
        .subcommand(
            Command::new("download")
                .about("Save a story's audio for offline listening")
                .arg(Arg::new("id").required(true).value_name("STORY_ID").help("Story ID")),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a story's offline audio")
                .arg(Arg::new("id").required(true).value_name("STORY_ID").help("Story ID")),
        )
        .subcommand(Command::new("mine").about("List your own stories (requires a token)"))
        .subcommand(
            Command::new("show")
                .about("Show one of your stories (requires a token)")
                .arg(Arg::new("id").required(true).value_name("STORY_ID").help("Story ID")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete one of your stories (requires a token)")
                .arg(Arg::new("id").required(true).value_name("STORY_ID").help("Story ID to delete"))
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Skip confirmation prompt")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("preview")
                .about("Play a story on the simulated player with the narrator")
                .arg(Arg::new("id").required(true).value_name("STORY_ID").help("Story ID"))
                .arg(
                    Arg::new("seconds")
                        .long("seconds")
                        .value_name("SECS")
                        .help("Length of the simulated audio")
                        .value_parser(value_parser!(f64))
                        .default_value("30"),
                )
                .arg(
                    Arg::new("speed")
                        .long("speed")
                        .value_name("FACTOR")
                        .help("How much faster than real time the preview runs")
                        .value_parser(value_parser!(f64))
                        .default_value("4"),
                ),
        )
        .subcommand(
            Command::new("mood")
                .about("Detect the narrator mood of a piece of text")
                .arg(Arg::new("text").required(true).num_args(1..).value_name("TEXT").help("Story text")),
        )
        .subcommand(
            Command::new("waveform")
                .about("Render a synthetic waveform with playback progress")
                .arg(
                    Arg::new("position")
                        .short('p')
                        .long("position")
                        .value_name("SECS")
                        .value_parser(value_parser!(f64))
                        .default_value("0"),
                )
                .arg(
                    Arg::new("duration")
                        .short('d')
                        .long("duration")
                        .value_name("SECS")
                        .value_parser(value_parser!(f64))
                        .default_value("60"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Fixed seed for a reproducible waveform")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("time")
                .about("Format a position in seconds as m:ss")
                .arg(
                    Arg::new("seconds")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_name("SECS")
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config.toml if none exists"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = match matches.get_one::<PathBuf>("config-dir") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new(),
    }
    .context("Failed to locate configuration directory")?;

    let (config, load_error) = load_config(&manager);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.effective_log_level().to_string()),
    )
    .init();

    if let Some(e) = load_error {
        log::warn!("Configuration not applied ({}); using defaults", e);
    }

    let token = matches.get_one::<String>("token").map(|s| s.as_str());

    match matches.subcommand() {
        Some(("catalog", sub_matches)) => {
            let catalog = context::build_catalog(&config, None)?;
            commands::list_catalog(&catalog, sub_matches.get_flag("offline")).await
        }
        Some(("downloaded", _)) => {
            let catalog = context::build_catalog(&config, None)?;
            commands::list_downloaded(&catalog)
        }
        Some(("download", sub_matches)) => {
            let catalog = context::build_catalog(&config, None)?;
            commands::download_story(&catalog, required(sub_matches, "id")?).await
        }
        Some(("remove", sub_matches)) => {
            let catalog = context::build_catalog(&config, None)?;
            commands::remove_story(&catalog, required(sub_matches, "id")?)
        }
        Some(("mine", _)) => {
            let catalog = context::build_catalog(&config, token)?;
            commands::list_mine(&catalog).await
        }
        Some(("show", sub_matches)) => {
            let catalog = context::build_catalog(&config, token)?;
            commands::show_story(&catalog, required(sub_matches, "id")?).await
        }
        Some(("delete", sub_matches)) => {
            let catalog = context::build_catalog(&config, token)?;
            commands::delete_story(&catalog, required(sub_matches, "id")?, sub_matches.get_flag("force"))
                .await
        }
        Some(("preview", sub_matches)) => {
            let catalog = context::build_catalog(&config, token)?;
            let story = commands::find_story(&catalog, required(sub_matches, "id")?).await?;
            let seconds = sub_matches.get_one::<f64>("seconds").copied().unwrap_or(30.0);
            let speed = sub_matches.get_one::<f64>("speed").copied().unwrap_or(4.0);
            player::preview(&config, &catalog, &story, seconds, speed).await
        }
        Some(("mood", sub_matches)) => {
            let text = sub_matches
                .get_many::<String>("text")
                .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            commands::show_mood(&config, &text);
            Ok(())
        }
        Some(("waveform", sub_matches)) => {
            let position = sub_matches.get_one::<f64>("position").copied().unwrap_or(0.0);
            let duration = sub_matches.get_one::<f64>("duration").copied().unwrap_or(60.0);
            let seed = sub_matches.get_one::<u64>("seed").copied();
            commands::show_waveform(&config, position, duration, seed);
            Ok(())
        }
        Some(("time", sub_matches)) => {
            let seconds = sub_matches
                .get_one::<f64>("seconds")
                .copied()
                .ok_or_else(|| anyhow::anyhow!("Seconds are required"))?;
            println!("{}", media_engine::format_time(seconds));
            Ok(())
        }
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("init", _)) => commands::config_init(&manager),
            Some(("show", _)) => commands::config_show(&config),
            Some(("path", _)) => {
                println!("{}", manager.config_path().display());
                Ok(())
            }
            _ => Ok(()),
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

/// Reads config.toml when present and layers environment overrides on top
fn load_config(manager: &ConfigManager) -> (Config, Option<ConfigError>) {
    if manager.config_path().exists() {
        return match manager.load_with_env_overrides() {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        };
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    match config.check() {
        Ok(()) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    }
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow::anyhow!("{} is required", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let manager = ConfigManager::with_directory(dir.path().to_path_buf()).unwrap();

        let (config, error) = load_config(&manager);
        assert!(error.is_none());
        assert_eq!(config.player, Config::default().player);
    }

    #[test]
    fn test_unreadable_config_file_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let manager = ConfigManager::with_directory(dir.path().to_path_buf()).unwrap();
        std::fs::write(manager.config_path(), "[player\nbroken").unwrap();

        let (config, error) = load_config(&manager);
        assert!(error.is_some());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_negative_time_is_accepted() {
        let matches = build_cli()
            .try_get_matches_from(["storyspark", "time", "-5"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<f64>("seconds"), Some(&-5.0));
    }

    #[test]
    fn test_global_config_dir_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["storyspark", "config", "path", "--config-dir", "/tmp/ss"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("config-dir"),
            Some(&PathBuf::from("/tmp/ss"))
        );
    }

    #[test]
    fn test_mood_joins_words() {
        let matches = build_cli()
            .try_get_matches_from(["storyspark", "mood", "a", "scary", "night"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let words: Vec<_> = sub.get_many::<String>("text").unwrap().collect();
        assert_eq!(words.len(), 3);
    }
}
