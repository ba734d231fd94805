//! Headless carrom match
//!
//! Plays scripted shots either hot-seat or as two online clients sharing an
//! in-memory store, logging every turn.
//!
//! Example:
//!   RUST_LOG=info cargo run --bin carrom-sim -- --turns 12
//!   RUST_LOG=debug cargo run --bin carrom-sim -- --local --config sim.ron
//!   cargo run --bin carrom-sim -- --print-config > sim.ron

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use carrom_client::sim::{finished, ready_to_shoot, take_shot, SimClock, DEFAULT_DRAGS, FRAME_DT, FRAME_MS};
use carrom_client::{App, UiHooks};
use carrom_core::{BodyKind, Config, PlayerNumber};
use clap::Parser;
use session_sync::{Environment, InMemoryStore, SharedStore};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play a scripted carrom match without a display", long_about = None)]
struct Args {
    /// RON file overriding game parameters
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of turns to play
    #[arg(long, default_value_t = 10)]
    turns: u32,
    /// Both seats on one client instead of two synced clients
    #[arg(long)]
    local: bool,
    #[arg(long, default_value = "Host")]
    host_name: String,
    #[arg(long, default_value = "Guest")]
    guest_name: String,
    /// Frames to wait for the board to settle before giving up
    #[arg(long, default_value_t = 3600)]
    max_frames: u32,
    /// Print the effective configuration as RON and exit
    #[arg(long)]
    print_config: bool,
}

/// Logs presentation callbacks instead of drawing them
struct LogHooks {
    label: &'static str,
    collisions: u32,
}

impl LogHooks {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            collisions: 0,
        }
    }
}

impl UiHooks for LogHooks {
    fn on_score_update(&mut self, kind: BodyKind) {
        log::info!("[{}] pocketed {}", self.label, kind.label());
    }

    fn on_turn_end(&mut self) {
        log::debug!("[{}] turn over", self.label);
    }

    fn on_collision(&mut self, impact_speed: f32) {
        self.collisions += 1;
        log::trace!("[{}] hit at {impact_speed:.1}", self.label);
    }

    fn on_game_over(&mut self, winner: Option<PlayerNumber>) {
        match winner {
            Some(player) => log::info!("[{}] player {player} wins", self.label),
            None => log::info!("[{}] game drawn", self.label),
        }
    }
}

fn load_config(path: &PathBuf) -> Result<Config> {
    let text = fs::read_to_string(path).with_context(|| format!("read config {path:?}"))?;
    ron::from_str(&text).with_context(|| format!("parse RON config {path:?}"))
}

fn report(app: &App<LogHooks>) {
    if let Some(game) = app.game() {
        log::info!(
            "[{}] {:?}: {} - {} ({} pieces left, {} loud collisions)",
            app.hooks().label,
            app.screen(),
            game.score(PlayerNumber::One),
            game.score(PlayerNumber::Two),
            game.physics().piece_count(),
            app.hooks().collisions
        );
    }
}

fn run_local(config: Config, args: &Args) -> Result<()> {
    let clock = Arc::new(SimClock::new(0));
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let env: Arc<dyn Environment> = clock.clone();
    let mut app = App::new(store, env, config, LogHooks::new("local"));
    app.start_local()?;

    for turn in 0..args.turns {
        if finished(&app) {
            break;
        }
        take_shot(&mut app, DEFAULT_DRAGS[turn as usize % DEFAULT_DRAGS.len()])?;
        let mut frames = 0;
        while !ready_to_shoot(&app) && !finished(&app) {
            anyhow::ensure!(frames < args.max_frames, "board never settled");
            clock.advance(FRAME_MS);
            app.frame(FRAME_DT)?;
            frames += 1;
        }
        report(&app);
    }

    app.leave()?;
    Ok(())
}

fn run_online(config: Config, args: &Args) -> Result<()> {
    let clock = Arc::new(SimClock::new(1_700_000_000_000));
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let env: Arc<dyn Environment> = clock.clone();
    let mut host = App::new(store.clone(), env.clone(), config.clone(), LogHooks::new("host"));
    let mut guest = App::new(store, env, config, LogHooks::new("guest"));

    let code = host.host(&args.host_name)?;
    log::info!("Session code {code}");
    guest.join(&code, &args.guest_name)?;

    let mut shots = 0;
    let mut frames = 0;
    while shots < args.turns && !finished(&host) && !finished(&guest) {
        clock.advance(FRAME_MS);
        host.frame(FRAME_DT)?;
        guest.frame(FRAME_DT)?;

        let shooter = if ready_to_shoot(&host) {
            Some(&mut host)
        } else if ready_to_shoot(&guest) {
            Some(&mut guest)
        } else {
            None
        };
        match shooter {
            Some(app) => {
                take_shot(app, DEFAULT_DRAGS[shots as usize % DEFAULT_DRAGS.len()])?;
                shots += 1;
                frames = 0;
            }
            None => {
                frames += 1;
                anyhow::ensure!(frames < args.max_frames, "no client became ready to shoot");
            }
        }
    }

    // Let the last shot play out on both sides
    for _ in 0..args.max_frames {
        if ready_to_shoot(&host) || ready_to_shoot(&guest) || finished(&host) {
            break;
        }
        clock.advance(FRAME_MS);
        host.frame(FRAME_DT)?;
        guest.frame(FRAME_DT)?;
    }

    report(&host);
    report(&guest);
    guest.leave()?;
    host.leave()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if args.print_config {
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default())
            .context("serialize config")?;
        println!("{text}");
        return Ok(());
    }
    if args.local {
        run_local(config, &args)
    } else {
        run_online(config, &args)
    }
}
