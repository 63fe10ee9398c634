//! Game simulator CLI - runs all-computer games against the in-memory transport.
//!
//! Uses the offline generator unless `MAFIA_PROVIDER_API_KEY` is set, in which
//! case every decision goes through the configured chat-completions provider.

mod metrics;

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use mafia_backend::domain::ids::{ChannelId, GuildId, PlayerId};
use mafia_backend::domain::roles::{Team, MAX_PLAYERS, MIN_PLAYERS};
use mafia_backend::domain::state::Participant;
use mafia_backend::services::game_registry::SharedGame;
use mafia_backend::{
    build_engine, create_generator, EngineConfig, GameTransition, MemoryTransport, NewGame,
    ProviderConfig, SchedulerConfig, TextGenerator, TransitionEvent,
};
use metrics::{GameRecord, Summary};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "game-simulator")]
#[command(about = "Runs computer-only Mafia games and reports the outcomes")]
struct Args {
    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Players per game
    #[arg(short, long, default_value = "7", value_parser = clap::value_parser!(u8).range(MIN_PLAYERS as i64..=MAX_PLAYERS as i64))]
    players: u8,

    /// Base seed; game `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,

    /// Length of every phase in milliseconds
    #[arg(long, default_value = "200")]
    phase_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let provider = ProviderConfig::from_env()?;
    // Real providers get the production pacing; offline runs go flat out.
    let scheduler_config = if provider.is_some() {
        SchedulerConfig::default()
    } else {
        SchedulerConfig::deterministic()
    };
    let generator = create_generator(provider)?;
    let base_config = EngineConfig::from_env()?.with_uniform_phases(Duration::from_millis(args.phase_ms));
    let base_seed = args.seed.unwrap_or_else(rand::random);
    info!(games = args.games, players = args.players, base_seed, "Starting simulation");

    let start = Instant::now();
    let mut records = Vec::new();
    for game_idx in 0..args.games {
        let seed = base_seed.wrapping_add(u64::from(game_idx));
        let config = base_config.clone().with_seed(seed);
        match run_game(config, scheduler_config.clone(), generator.clone(), args.players).await {
            Ok(record) => {
                println!("{}", serde_json::to_string(&record)?);
                records.push(record);
            }
            Err(e) => warn!(game = game_idx + 1, error = %e, "Game failed"),
        }
    }

    let summary = Summary::from_records(
        args.games,
        &records,
        start.elapsed().as_secs_f64() * 1000.0,
    );
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

/// Run one game on a fresh engine and wait for its verdict.
async fn run_game(
    config: EngineConfig,
    scheduler_config: SchedulerConfig,
    generator: Arc<dyn TextGenerator>,
    players: u8,
) -> Result<GameRecord, Box<dyn std::error::Error>> {
    let seed = config.seed.unwrap_or_default();
    let phase = config.night_duration.max(config.day_duration).max(config.vote_duration);
    let engine = build_engine()
        .with_config(config)
        .with_scheduler_config(scheduler_config)
        .with_transport(Arc::new(MemoryTransport::new()))
        .with_generator(generator)
        .build();

    let channel = ChannelId(seed);
    let participants: Vec<Participant> = (1..=u64::from(players))
        .map(|n| Participant {
            id: PlayerId(n),
            name: format!("Bot{n}"),
            is_computer: true,
        })
        .collect();
    let request = NewGame {
        channel,
        guild: GuildId(1),
        host: PlayerId(1),
        participants,
    };

    let mut rx = engine.subscribe();
    let game_start = Instant::now();
    engine.create_game(request).await?;
    // The registry drops the game once it ends; keep a handle for the record.
    let game: SharedGame = engine
        .registry()
        .get(channel)
        .ok_or("game ended before it could be observed")?;

    // Every round costs three phases and a round kills at least one player
    // unless the doctor saves or the vote ties; bound generously.
    let limit = phase * 3 * (u32::from(players) * 4) + Duration::from_secs(30);
    let winner = match tokio::time::timeout(limit, wait_for_end(&mut rx, channel)).await {
        Ok(winner) => winner,
        Err(_) => {
            warn!(?channel, "Game did not finish in time");
            None
        }
    };

    let duration_ms = game_start.elapsed().as_secs_f64() * 1000.0;
    let state = game.lock();
    Ok(GameRecord::from_state(&state, seed, winner, duration_ms))
}

async fn wait_for_end(rx: &mut broadcast::Receiver<TransitionEvent>, channel: ChannelId) -> Option<Team> {
    loop {
        match rx.recv().await {
            Ok(event) if event.channel_id == channel => match event.transition {
                GameTransition::GameEnded { winner } => return winner,
                GameTransition::GameCancelled => return None,
                _ => {}
            },
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
