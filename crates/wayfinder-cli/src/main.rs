//! `wayctl` - CLI for wayfinder
//!
//! This binary drives the navigation pipeline from the terminal: browsing
//! the venue, managing preferences and policy acceptance, and walking
//! guided trips against the simulated positioning engine.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::debug;
use wayfinder::preferences::store::SqlitePreferenceStore;
use wayfinder::preferences::Preferences;
use wayfinder::screens::search::SearchModel;
use wayfinder::venue::display_level;
use wayfinder::{init_logging, Config, Engine, EngineEvent, NavigationSession, PreferenceAdapter};
use wayfinder_sim::{SimConfig, SimEngine};

use crate::cli::{
    Cli, Command, ConfigCommand, NavigateCommand, PoisCommand, PolicyCommand, PrefsCommand,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Initialize logging; explicit flags win over the configured default
    let verbosity = if cli.quiet || cli.verbose > 0 {
        cli.verbosity()
    } else {
        config.logging.verbosity
    };
    init_logging(verbosity);

    // Execute the command
    match cli.command {
        Command::Navigate(cmd) => handle_navigate(&config, &cmd).await,
        Command::Pois(cmd) => handle_pois(&config, &cmd).await,
        Command::Prefs(cmd) => handle_prefs(&config, cmd),
        Command::Policy(cmd) => handle_policy(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_adapter(config: &Config) -> Result<PreferenceAdapter> {
    let store = SqlitePreferenceStore::open(config.database_path())?;
    Ok(PreferenceAdapter::new(store))
}

async fn handle_navigate(config: &Config, cmd: &NavigateCommand) -> Result<()> {
    let adapter = open_adapter(config)?;
    if !adapter.policy_accepted() {
        bail!("privacy policy not accepted; run `wayctl policy accept` first");
    }

    let engine = Arc::new(SimEngine::with_config(SimConfig {
        tick: Duration::from_millis(cmd.tick_ms),
        stride_m: cmd.stride_m,
        ..SimConfig::default()
    }));

    if cmd.avoid_stairs {
        let prefs = adapter.load().set_avoid_stairs(true);
        adapter.save(&prefs, engine.as_ref())?;
    }
    if cmd.avoid_elevators {
        let prefs = adapter.load().set_avoid_elevators(true);
        adapter.save(&prefs, engine.as_ref())?;
    }

    let mut session = NavigationSession::start(config, engine, adapter).await?;
    let unit = session.preferences().load().distance_unit;

    println!("Finding route to {}...", cmd.destination);
    session.preview_route(&cmd.destination).await?;
    wait_for(&mut session, |s| {
        s.navigation().route().is_some() || s.navigation().has_terminal_banner()
    })
    .await?;

    let Some(route) = session.navigation().route() else {
        let text = session
            .navigation()
            .last_update()
            .map_or_else(|| "No route found.".to_string(), |u| u.text.clone());
        println!("{text}");
        return Ok(());
    };
    println!(
        "Route to {}: {}, about {} min",
        route.destination.title,
        route.distance_display(unit),
        route.duration_minutes(),
    );
    if cmd.steps {
        for step in &route.steps {
            println!("  {:>5.0} m  {}", step.distance_from_last_m, step.instruction);
        }
    }
    if cmd.preview {
        return Ok(());
    }

    session.start_navigation()?;
    println!("Starting guidance. Press Ctrl-C to cancel.");
    println!();

    // A far-future deadline keeps the timer branch inert when no
    // --cancel-after was given.
    let cancel_at = tokio::time::sleep(
        cmd.cancel_after
            .map_or(Duration::MAX, Duration::from_secs),
    );
    tokio::pin!(cancel_at);

    let mut timer_fired = false;
    let mut last_instruction = String::new();
    loop {
        tokio::select! {
            event = session.next_event() => {
                let Some(event) = event else {
                    bail!("engine event stream ended unexpectedly");
                };
                print_progress(&event);
                if let Some(text) = session.navigation().instruction() {
                    if text != last_instruction {
                        println!("> {text}");
                        last_instruction = text.to_string();
                    }
                }
                if session.navigation().has_terminal_banner() {
                    if let Some(update) = session.navigation().last_update() {
                        println!();
                        println!("{}", update.text);
                    }
                    break;
                }
            }
            () = &mut cancel_at, if !timer_fired => {
                timer_fired = true;
                println!("Cancel timer elapsed.");
                session.cancel_navigation()?;
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("Canceling...");
                session.cancel_navigation()?;
            }
        }
    }
    Ok(())
}

/// Print the progress events that are not part of the instruction stream.
fn print_progress(event: &EngineEvent) {
    match event {
        EngineEvent::FloorChanged(Some(floor)) => println!("- Now on {}", floor.name),
        EngineEvent::HazardEntered(feature) => println!("! Caution: {} ahead", feature.title),
        EngineEvent::SegmentEntered(feature) => println!("- Entering {}", feature.title),
        EngineEvent::SegmentExited(feature) => println!("- Leaving {}", feature.title),
        other => debug!(?other, "engine event"),
    }
}

/// Pump engine events into the session until `pred` holds.
async fn wait_for<F>(session: &mut NavigationSession, mut pred: F) -> Result<()>
where
    F: FnMut(&NavigationSession) -> bool,
{
    while !pred(session) {
        if session.next_event().await.is_none() {
            bail!("engine event stream ended unexpectedly");
        }
    }
    Ok(())
}

async fn handle_pois(config: &Config, cmd: &PoisCommand) -> Result<()> {
    // Browsing needs venue data but no navigation session, so the engine is
    // driven directly.
    let engine = SimEngine::new();
    engine.authorize(&config.venue.auth_token).await?;
    engine.start_sync().await?;

    let mut search = SearchModel::new();
    search.set_features(engine.features().await?);
    search.set_amenities(engine.amenities().await?);
    if let Some(query) = &cmd.query {
        search.set_query(query.clone());
    }
    if let Some(category) = &cmd.category {
        search.set_category(Some(category.clone()));
    }

    let results = search.results();
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No matching points of interest.");
        return Ok(());
    }
    for feature in results {
        println!(
            "{:<16} {:<20} floor {}",
            feature.id,
            feature.title,
            display_level(feature.level, &config.venue.level_overrides),
        );
    }
    Ok(())
}

fn handle_prefs(config: &Config, cmd: PrefsCommand) -> Result<()> {
    let adapter = open_adapter(config)?;
    match cmd {
        PrefsCommand::Show { json } => {
            let prefs = adapter.load();
            if json {
                println!("{}", serde_json::to_string_pretty(&prefs)?);
            } else {
                println!("Stored preferences");
                println!("------------------");
                for (key, value) in prefs.to_entries() {
                    println!("{key:<36} {value}");
                }
            }
        }
        PrefsCommand::Set { key, value } => {
            // Changed preferences are pushed to the engine on save; a
            // throwaway one stands in since no session is running.
            let engine = SimEngine::new();
            let updated = adapter.load().with_entry(&key, &value)?;
            adapter.save(&updated, &engine)?;
            println!("{key} = {value}");
        }
        PrefsCommand::Reset { yes } => {
            if yes {
                let engine = SimEngine::new();
                adapter.save(&Preferences::default(), &engine)?;
                println!("Preferences reset to defaults.");
            } else {
                println!("This will reset all preferences to defaults.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_policy(config: &Config, cmd: &PolicyCommand) -> Result<()> {
    let adapter = open_adapter(config)?;
    match cmd {
        PolicyCommand::Show => {
            if adapter.policy_accepted() {
                println!("Privacy policy: accepted");
            } else {
                println!("Privacy policy: not accepted");
                println!("Run `wayctl policy accept` to enable navigation.");
            }
        }
        PolicyCommand::Accept => {
            adapter.set_policy_accepted(true)?;
            println!("Privacy policy accepted.");
        }
        PolicyCommand::Revoke => {
            adapter.set_policy_accepted(false)?;
            println!("Privacy policy acceptance revoked.");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current configuration");
                println!("=====================");
                println!();
                println!("[Venue]");
                println!("  Auth token:         {}", config.venue.auth_token);
                println!("  Covered geofence:   {}", config.venue.covered_geofence_id);
                println!("  Default level:      {}", config.venue.default_level);
                println!();
                println!("[Routing]");
                println!(
                    "  Suppression window: {} ms",
                    config.routing.suppression_window_ms
                );
                println!(
                    "  Sync retry delay:   {} s",
                    config.routing.sync_retry_delay_secs
                );
                println!(
                    "  Reroute threshold:  {} m",
                    config.routing.reroute_threshold_m
                );
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Logging]");
                println!("  Verbosity:          {:?}", config.logging.verbosity);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)).and_then(|loaded| loaded.validate()) {
                Ok(()) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
