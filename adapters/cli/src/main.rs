#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates, plays and shops for Dungeon Snake
//! levels.

mod carryover_transfer;
mod render;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dungeon_snake_core::{Direction, ItemKind};
use dungeon_snake_system_bootstrap::{shop_stock, Bootstrap, Config, LevelOutcome, Session};
use dungeon_snake_system_turn::TurnStatus;
use dungeon_snake_world::{query, state::RunCarryover};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

/// Turn-based snake roguelike played from the terminal.
#[derive(Debug, Parser)]
#[command(name = "dungeon-snake", version, about)]
struct Cli {
    /// TOML file overriding the default tunables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run seed, taking precedence over the configuration file.
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Raises log verbosity; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generates a level and prints its map.
    Generate {
        /// Carryover string describing the run; a fresh run when absent.
        #[arg(long)]
        carryover: Option<String>,
    },
    /// Plays a level from a string of moves.
    Play {
        /// One character per turn: U, D, L or R to steer, `.` to keep going.
        moves: String,
        /// Carryover string describing the run; a fresh run when absent.
        #[arg(long)]
        carryover: Option<String>,
        /// Inventory slot to consume before the first turn. Repeatable.
        #[arg(long = "use")]
        use_items: Vec<usize>,
        /// Prints the map after every turn instead of only at the end.
        #[arg(long)]
        trace: bool,
    },
    /// Lists the shop or buys items into a carryover.
    Shop {
        /// Carryover string to spend from; a fresh run when absent.
        #[arg(long)]
        carryover: Option<String>,
        /// Item name to buy. Repeatable.
        #[arg(long)]
        buy: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let bootstrap = Bootstrap::new(config);

    match cli.command {
        Command::Generate { carryover } => {
            let carryover = resolve_carryover(&bootstrap, carryover.as_deref())?;
            generate(&bootstrap, &carryover);
            Ok(())
        }
        Command::Play {
            moves,
            carryover,
            use_items,
            trace,
        } => {
            let carryover = resolve_carryover(&bootstrap, carryover.as_deref())?;
            play(&bootstrap, &carryover, &moves, &use_items, trace)
        }
        Command::Shop { carryover, buy } => {
            let carryover = resolve_carryover(&bootstrap, carryover.as_deref())?;
            shop(carryover, &buy)
        }
    }
}

fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to initialise the terminal logger")
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn resolve_carryover(bootstrap: &Bootstrap, code: Option<&str>) -> Result<RunCarryover> {
    match code {
        Some(code) => carryover_transfer::decode(code).context("invalid carryover string"),
        None => Ok(bootstrap.new_run()),
    }
}

fn encode_carryover(carryover: &RunCarryover) -> Result<String> {
    carryover_transfer::encode(carryover).context("failed to encode carryover")
}

fn generate(bootstrap: &Bootstrap, carryover: &RunCarryover) {
    let session = bootstrap.start_level(carryover);
    let dungeon = query::dungeon(session.world());

    println!("{}", render::render_level(session.world(), Some(session.snake())));
    println!();
    for room in dungeon.rooms() {
        let mut marks = Vec::new();
        if room.is_start {
            marks.push("start");
        }
        if room.is_secret {
            marks.push("secret");
        }
        if room.has_exit {
            marks.push("exit");
        }
        println!(
            "room {:>2} {:<15} {:>2}x{:<2} at ({}, {}) depth {} {}",
            room.id.get(),
            room.kind.name(),
            room.width,
            room.height,
            room.x,
            room.y,
            room.depth,
            marks.join(" ")
        );
    }

    let unreachable = dungeon.unreachable_rooms();
    if unreachable.is_empty() {
        println!("every room is reachable from the start room");
    } else {
        let ids: Vec<String> = unreachable.iter().map(|id| id.get().to_string()).collect();
        println!("unreachable rooms: {}", ids.join(", "));
    }
}

fn parse_moves(moves: &str) -> Result<Vec<Option<Direction>>> {
    moves
        .chars()
        .filter(|symbol| !symbol.is_whitespace())
        .map(|symbol| match symbol {
            '.' => Ok(None),
            _ => match Direction::from_code(symbol) {
                Some(direction) => Ok(Some(direction)),
                None => bail!("'{symbol}' is not a move; use U, D, L, R or '.'"),
            },
        })
        .collect()
}

fn play(
    bootstrap: &Bootstrap,
    carryover: &RunCarryover,
    moves: &str,
    use_items: &[usize],
    trace: bool,
) -> Result<()> {
    let moves = parse_moves(moves)?;
    let mut session = bootstrap.start_level(carryover);

    for &slot in use_items {
        match session.use_item(slot) {
            Some(kind) => println!("used {kind}"),
            None => log::warn!("inventory slot {slot} holds nothing usable"),
        }
    }
    print_events(&mut session);

    for (turn, direction) in moves.into_iter().enumerate() {
        let Some(report) = session.turn(direction) else {
            break;
        };
        if report.status == TurnStatus::Skipped {
            log::warn!("turn {turn} was skipped");
        }
        print_events(&mut session);
        if trace {
            println!(
                "{}\n",
                render::render_level(session.world(), Some(session.snake()))
            );
        }
    }

    if !trace {
        println!("{}", render::render_level(session.world(), Some(session.snake())));
    }
    let state = query::state(session.world());
    println!(
        "health {}/{}  length {}  coins {}  score {}",
        state.health(),
        state.max_health(),
        session.snake().len(),
        state.coins(),
        state.score()
    );

    match session.outcome() {
        LevelOutcome::InProgress => println!("level {} in progress", state.level()),
        LevelOutcome::Died(reason) => println!("run over: {}", reason.label()),
        LevelOutcome::Completed => {
            if let Some(next) = session.next_carryover() {
                println!("next level: {}", encode_carryover(&next)?);
            }
        }
    }
    Ok(())
}

fn print_events(session: &mut Session) {
    for event in session.drain_events() {
        println!("  {}", render::describe(&event));
    }
}

fn shop(mut carryover: RunCarryover, purchases: &[String]) -> Result<()> {
    if purchases.is_empty() {
        println!("{} coins to spend", carryover.coins);
        for (kind, price) in shop_stock() {
            println!("{:<16} {price:>3}  {}", kind.name(), kind.properties().description);
        }
        return Ok(());
    }

    for name in purchases {
        let kind: ItemKind = name.parse()?;
        carryover
            .purchase(kind)
            .with_context(|| format!("could not buy {kind}"))?;
    }
    println!("{}", encode_carryover(&carryover)?);
    Ok(())
}
