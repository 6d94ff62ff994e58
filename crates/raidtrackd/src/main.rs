//! raidtrackd - The raidtrack companion service
//!
//! This is the main entry point for the raidtrackd service.
//! It wires together all the components:
//! - Configuration loading (roster and schedules)
//! - Catalog and progress snapshots from the backend
//! - The tracker state container
//! - The detector's event feed on stdin

mod feed;
mod sources;

use anyhow::{Context, Result};
use clap::Parser;
use raidtrack_config::load_config;
use raidtrack_core::{CoreEvent, ProgressBook, ScheduleStatus, Tracker, TrackerSnapshot};
use raidtrack_util::{
    DayName, default_config_path, default_data_dir, format_seconds, is_mock_time_active,
};
use std::path::PathBuf;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::feed::EventFeed;
use crate::sources::{load_catalog, load_progress, progress_for, resolve_path};

/// raidtrackd - Dungeon rotation companion
#[derive(Parser, Debug)]
#[command(name = "raidtrackd")]
#[command(about = "Follows the game-state feed and recommends which character to play next", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/raidtrack/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory that relative snapshot paths resolve against
    /// (or set RAIDTRACK_DATA_DIR env var)
    #[arg(short, long, env = "RAIDTRACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Dungeon catalog override (or set RAIDTRACK_CATALOG env var)
    #[arg(long, env = "RAIDTRACK_CATALOG")]
    catalog: Option<PathBuf>,

    /// Progress aggregates override (or set RAIDTRACK_PROGRESS env var)
    #[arg(long, env = "RAIDTRACK_PROGRESS")]
    progress: Option<PathBuf>,

    /// Evaluate this day instead of today (e.g. "wed" or "Wednesday")
    #[arg(long)]
    day: Option<DayName>,

    /// Print a JSON snapshot to stdout after every accepted event
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    tracker: Tracker,
    progress_path: PathBuf,
    pinned_day: Option<DayName>,
    json: bool,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let config = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            characters = config.roster.len(),
            "Configuration loaded"
        );

        let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
        let catalog_path = resolve_path(
            &data_dir,
            args.catalog.as_ref().unwrap_or(&config.service.catalog_path),
        );
        let progress_path = resolve_path(
            &data_dir,
            args.progress.as_ref().unwrap_or(&config.service.progress_path),
        );

        let catalog = load_catalog(&catalog_path).context("Failed to load dungeon catalog")?;
        let aggregates = load_progress(&progress_path).context("Failed to load progress")?;

        let mut tracker = Tracker::new(catalog, config.roster);
        tracker.set_progress(ProgressBook::from_aggregates(&aggregates));

        info!(
            catalog_path = %catalog_path.display(),
            progress_path = %progress_path.display(),
            "Snapshots loaded"
        );

        Ok(Self {
            tracker,
            progress_path,
            pinned_day: args.day,
            json: args.json,
        })
    }

    fn day(&self) -> DayName {
        self.pinned_day
            .unwrap_or_else(|| DayName::of(&raidtrack_util::now()))
    }

    async fn run(mut self) -> Result<()> {
        let mut feed = EventFeed::new(tokio::io::stdin());

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        self.log_overview();
        self.report()?;

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }

                tick = feed.next_tick() => {
                    match tick.context("Failed to read event feed")? {
                        Some(lines) => self.handle_tick(&lines)?,
                        None => {
                            info!("Event feed closed");
                            break;
                        }
                    }
                }
            }
        }

        info!("Service stopped");
        Ok(())
    }

    fn handle_tick(&mut self, lines: &[String]) -> Result<()> {
        let events = self.tracker.handle_lines(lines);
        if events.is_empty() {
            return Ok(());
        }

        for event in &events {
            log_event(event);
        }

        if events.iter().any(CoreEvent::is_refetch) {
            self.refetch(&events);
        }

        self.report()
    }

    /// Reload progress for what the reducer flagged as stale. A failed reload
    /// keeps the cached progress.
    fn refetch(&mut self, events: &[CoreEvent]) {
        let aggregates = match load_progress(&self.progress_path) {
            Ok(aggregates) => aggregates,
            Err(e) => {
                warn!(error = %e, "Progress refetch failed, keeping cached progress");
                return;
            }
        };

        if events.contains(&CoreEvent::RefetchDayStatistics) {
            self.tracker
                .set_progress(ProgressBook::from_aggregates(&aggregates));
            info!(records = aggregates.len(), "Progress refetched");
            return;
        }

        for event in events {
            if let CoreEvent::RefetchProgress { character_id } = event {
                self.tracker.update_character_progress(
                    character_id,
                    progress_for(&aggregates, character_id),
                );
                info!(character_id = %character_id, "Character progress refetched");
            }
        }
    }

    fn report(&self) -> Result<()> {
        let snapshot = self.tracker.snapshot(self.day());
        log_snapshot(&snapshot);

        if self.json {
            let json = serde_json::to_string(&snapshot).context("Failed to encode snapshot")?;
            println!("{}", json);
        }

        Ok(())
    }

    fn log_overview(&self) {
        let now = raidtrack_util::now();
        let day = self.pinned_day.unwrap_or_else(|| DayName::of(&now));
        for evaluation in self.tracker.day_overview(day) {
            let status = match evaluation.status() {
                ScheduleStatus::NoSchedule => "no schedule",
                ScheduleStatus::Pending => "pending",
                ScheduleStatus::Cleared => "cleared",
            };
            let remaining: u32 = evaluation
                .dungeons
                .iter()
                .filter_map(|d| d.remaining)
                .sum();

            info!(
                day = %day,
                character_id = %evaluation.character_id,
                status,
                scheduled = evaluation.dungeons.len(),
                remaining_runs = remaining,
                etc = %format_seconds(evaluation.etc.total_seconds),
                "Day overview"
            );

            for status in evaluation.dungeons.iter().filter(|d| !d.is_complete) {
                if let Some(reset) = self.tracker.next_reset(&status.dungeon.id, now) {
                    info!(
                        character_id = %evaluation.character_id,
                        dungeon = status.dungeon.label(),
                        remaining_runs = ?status.remaining,
                        resets_at = %reset.format("%a %Y-%m-%d %H:%M"),
                        "Pending dungeon"
                    );
                }
            }
        }

        for dungeon in self.tracker.dungeon_overview() {
            info!(
                dungeon = dungeon.dungeon.label(),
                entries = dungeon.entries,
                capacity = dungeon.capacity,
                complete = dungeon.is_complete(),
                "Roster runs"
            );
        }
    }
}

fn log_event(event: &CoreEvent) {
    match event {
        CoreEvent::CharacterChanged { previous, current } => {
            info!(?previous, ?current, "Active character changed");
        }
        CoreEvent::DungeonEntered {
            character_id,
            dungeon_id,
        } => {
            info!(character_id = %character_id, dungeon_id = %dungeon_id, "Entered dungeon");
        }
        CoreEvent::DungeonLeft {
            character_id,
            dungeon_id,
            completed,
        } => {
            info!(
                character_id = %character_id,
                dungeon_id = %dungeon_id,
                completed,
                "Left dungeon"
            );
        }
        CoreEvent::RefetchProgress { character_id } => {
            debug!(character_id = %character_id, "Progress refetch requested");
        }
        CoreEvent::RefetchDayStatistics => {
            debug!("Day statistics refetch requested");
        }
    }
}

fn log_snapshot(snapshot: &TrackerSnapshot) {
    if let Some(active) = &snapshot.active {
        info!(
            character_id = %active.character_id,
            status = ?active.status(),
            etc = %format_seconds(active.etc.total_seconds),
            missing_data = active.etc.has_missing_data,
            "Active character"
        );
    }

    let recommendation = &snapshot.recommendation;
    match &recommendation.character_id {
        Some(next) => info!(character_id = %next, "Switch to next character"),
        None if recommendation.is_all_done => info!(day = %snapshot.day, "All characters done"),
        None => debug!("No recommendation while the active character has work left"),
    }

    info!(
        day = %snapshot.day,
        etc = %format_seconds(snapshot.day_etc.total_seconds),
        complete = snapshot.day_etc.is_complete,
        missing_data = snapshot.day_etc.has_missing_data,
        "Day estimate"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging. stdout is reserved for --json snapshots.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "raidtrackd starting");

    if is_mock_time_active() {
        warn!(now = %raidtrack_util::now(), "Mock time is active");
    }

    let service = Service::new(&args)?;
    service.run().await
}
