//! Headless host for the billiards bot: runs AI matches and prints racks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use billiard_engine::{create_initial_ball_list, GameSettings, GameType};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "billiardbot", version, about = "8-ball self-play from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a full match between AI players.
    Play {
        #[arg(long, value_enum, default_value_t = Mode::Double)]
        mode: Mode,
        /// Seed for the rack shuffle.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Lookahead depth; overrides the settings file.
        #[arg(long)]
        depth: Option<u32>,
        /// JSON settings file. Missing fields keep their defaults.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print every game event as a JSON line on stdout.
        #[arg(long)]
        events: bool,
        /// Give up after this many ticks.
        #[arg(long, default_value_t = 500_000)]
        max_ticks: u64,
        /// Pace the match in real time at this speed multiplier.
        #[arg(long)]
        speed: Option<f32>,
    },
    /// Print a shuffled rack, apex first.
    Rack {
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// One AI clears the table alone.
    Single,
    /// Two AIs alternate.
    Double,
}

impl From<Mode> for GameType {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Single => GameType::SingleAi,
            Mode::Double => GameType::DoubleAi,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Play {
            mode,
            seed,
            depth,
            config,
            events,
            max_ticks,
            speed,
        } => {
            let mut settings = match &config {
                Some(path) => GameSettings::from_file(path)
                    .with_context(|| format!("loading settings from {}", path.display()))?,
                None => GameSettings::default(),
            };
            if let Some(depth) = depth {
                settings.planner.lookahead_depth = depth;
            }
            play::run(settings, mode.into(), seed, events, max_ticks, speed)
        }
        Command::Rack { seed } => {
            print_rack(seed);
            Ok(())
        }
    }
}

fn print_rack(seed: u64) {
    let list = create_initial_ball_list(&mut ChaCha8Rng::seed_from_u64(seed));
    let mut slots = list.iter();
    for row in 0..5 {
        let line: Vec<String> = slots
            .by_ref()
            .take(row + 1)
            .map(|b| format!("{:>2}", b.0))
            .collect();
        println!("{}{}", "  ".repeat(4 - row), line.join("  "));
    }
}

#[cfg(feature = "physics")]
mod play {
    use std::time::{Duration, Instant};

    use anyhow::{bail, Context, Result};
    use billiard_engine::{
        AiPlayer, GameEvent, GameLogic, GameOutcome, GameSettings, GameType, MatchRunner, Player,
        SimTable,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub fn run(
        settings: GameSettings,
        game_type: GameType,
        seed: u64,
        print_events: bool,
        max_ticks: u64,
        speed: Option<f32>,
    ) -> Result<()> {
        let Some(count) = game_type.player_count() else {
            bail!("{:?} needs caller-supplied players", game_type);
        };
        let depth = settings.planner.lookahead_depth;
        let players: Vec<Box<dyn Player>> = (0..count)
            .map(|i| Box::new(AiPlayer::new(format!("ai-{}", i + 1), &settings)) as Box<dyn Player>)
            .collect();

        let table = SimTable::racked(&settings, &mut ChaCha8Rng::seed_from_u64(seed));
        let game = GameLogic::new(table, players, settings).context("setting up the game")?;
        let mut runner = MatchRunner::new(game);
        log::info!("{:?} match, seed {}, lookahead depth {}", game_type, seed, depth);

        let emit = |event: GameEvent| {
            if print_events {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => log::warn!("could not encode {:?}: {}", event, e),
                }
            }
        };

        let outcome = match speed {
            Some(speed) if speed > 0.0 => run_paced(&mut runner, speed, max_ticks, emit),
            _ => runner.run_with(max_ticks, emit),
        };

        let game = runner.game();
        for player in 0..game.num_players() {
            log::info!(
                "{}: score {}, group {:?}",
                game.player_name(player).unwrap_or("?"),
                game.player_score(player),
                game.player_group(player)
            );
        }
        let summary = match outcome {
            GameOutcome::Won { winner } => {
                format!("{} wins", game.player_name(winner).unwrap_or("?"))
            }
            GameOutcome::Lost { loser } => {
                format!("{} loses", game.player_name(loser).unwrap_or("?"))
            }
            GameOutcome::Abandoned => "abandoned".to_string(),
        };
        log::info!(
            "{} after {} turns ({} ticks)",
            summary,
            game.turns_taken(),
            runner.ticks()
        );
        if !print_events {
            println!("{}", summary);
        }
        Ok(())
    }

    fn run_paced(
        runner: &mut MatchRunner<SimTable>,
        speed: f32,
        max_ticks: u64,
        mut emit: impl FnMut(GameEvent),
    ) -> GameOutcome {
        let frame = Duration::from_millis(16);
        let mut last = Instant::now();
        while !runner.game().is_over() && runner.ticks() < max_ticks {
            std::thread::sleep(frame);
            let now = Instant::now();
            runner.advance_by((now - last).as_secs_f32() * speed);
            last = now;
            for event in runner.drain_events() {
                emit(event);
            }
        }
        if !runner.game().is_over() {
            runner.game_mut().abandon();
            for event in runner.drain_events() {
                emit(event);
            }
        }
        runner.game().outcome().unwrap_or(GameOutcome::Abandoned)
    }
}

#[cfg(not(feature = "physics"))]
mod play {
    use anyhow::{bail, Result};
    use billiard_engine::{GameSettings, GameType};

    pub fn run(
        _settings: GameSettings,
        _game_type: GameType,
        _seed: u64,
        _print_events: bool,
        _max_ticks: u64,
        _speed: Option<f32>,
    ) -> Result<()> {
        bail!("built without the `physics` feature; no table to play on")
    }
}
