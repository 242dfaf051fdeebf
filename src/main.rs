use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use searchclient::agents::{
    classic_agent, goal_recognition_agent, non_deterministic_agent, ServerConnection,
};
use searchclient::algorithms::SearchMonitor;
use searchclient::domain::{HeuristicName, Level, HOSPITAL_ACTION_LIBRARY};
use searchclient::frontiers::{BestFirstFrontier, StrategyName};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use tracing::error;

#[derive(Parser)]
#[command(version)]
/// Search client for the hospital domain level server. Reads the level
/// from the server on stdin and answers with one joint action per line.
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(
        long = "max-memory",
        id = "MAX_MEMORY",
        default_value = "4g",
        help = "The maximum memory allowed, e.g. 4g for 4 GB"
    )]
    max_memory: String,
    #[arg(
        long,
        id = "LEVEL",
        help = "Load the level from a file instead of the server"
    )]
    level: Option<PathBuf>,
    #[arg(
        long,
        id = "SEED",
        default_value_t = 0,
        help = "Seed for the tie-breaking shuffle of joint actions"
    )]
    seed: u64,
    #[arg(
        value_enum,
        long,
        id = "VERBOSITY",
        default_value_t = Verbosity::Normal,
        help = "The verbosity level"
    )]
    verbosity: Verbosity,
}

#[derive(Subcommand)]
enum Commands {
    /// Centralised deterministic planning with graph search.
    Classic {
        #[arg(value_enum, long, id = "STRATEGY", default_value_t = StrategyName::Bfs)]
        strategy: StrategyName,
        #[arg(
            value_enum,
            long,
            id = "HEURISTIC",
            help = "Only relevant for astar and greedy"
        )]
        heuristic: Option<HeuristicName>,
    },
    /// Strong planning against a broken actuator with AND-OR search.
    NonDeterministic {
        #[arg(long, id = "NO_ITERATIVE_DEEPENING")]
        no_iterative_deepening: bool,
        #[arg(long, id = "ALLOW_CYCLIC")]
        allow_cyclic: bool,
    },
    /// Helper planning against an actor with an unknown goal, using the
    /// solution graph of all the actor's optimal plans.
    GoalRecognition {
        #[arg(long, id = "NO_ITERATIVE_DEEPENING")]
        no_iterative_deepening: bool,
        #[arg(long, id = "ALLOW_CYCLIC")]
        allow_cyclic: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Silent,
    Normal,
    Verbose,
    Debug,
}

impl From<Verbosity> for tracing::Level {
    fn from(value: Verbosity) -> Self {
        match value {
            Verbosity::Silent => tracing::Level::ERROR,
            Verbosity::Normal => tracing::Level::INFO,
            Verbosity::Verbose => tracing::Level::DEBUG,
            Verbosity::Debug => tracing::Level::TRACE,
        }
    }
}

fn parse_max_memory(text: &str) -> Option<usize> {
    let gigabytes: usize = text.strip_suffix('g')?.parse().ok()?;
    Some(gigabytes * 1024)
}

fn value_name<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|possible| possible.get_name().to_string())
        .unwrap_or_default()
}

/// The name the client announces to the server before the level is sent.
fn client_name(command: &Commands) -> String {
    match command {
        Commands::Classic {
            strategy,
            heuristic,
        } => {
            let mut name = format!("classic {}", value_name(strategy));
            if let Some(heuristic) = heuristic {
                name.push(' ');
                name.push_str(&value_name(heuristic));
            }
            name
        }
        Commands::NonDeterministic { .. } => "non-deterministic".to_string(),
        Commands::GoalRecognition { .. } => "goal recognition".to_string(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level: tracing::Level = cli.verbosity.into();
    // The server owns stdout, so all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let memory_limit_mb = parse_max_memory(&cli.max_memory)
        .ok_or("invalid --max-memory value, use e.g. 4g for 4 GB")?;

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let mut connection = ServerConnection::new(stdin, stdout);
    connection.send_name(&client_name(&cli.command))?;

    let level = match &cli.level {
        Some(path) => Rc::new(Level::from_str(&std::fs::read_to_string(path)?)?),
        None => {
            let lines = connection.read_level_lines()?;
            let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
            Rc::new(Level::from_lines(&lines)?)
        }
    };

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut monitor = SearchMonitor::new(Some(memory_limit_mb));

    match cli.command {
        Commands::Classic {
            strategy,
            heuristic,
        } => {
            let heuristic = heuristic.map(|name| name.create());
            let mut frontier = strategy.create(heuristic)?;
            classic_agent(
                level,
                &HOSPITAL_ACTION_LIBRARY,
                frontier.as_mut(),
                &mut connection,
                &mut rng,
                &mut monitor,
            )?;
        }
        Commands::NonDeterministic {
            no_iterative_deepening,
            allow_cyclic,
        } => {
            non_deterministic_agent(
                level,
                &HOSPITAL_ACTION_LIBRARY,
                &mut connection,
                &mut rng,
                !no_iterative_deepening,
                allow_cyclic,
            )?;
        }
        Commands::GoalRecognition {
            no_iterative_deepening,
            allow_cyclic,
        } => {
            // The solution graph needs states popped in cost order.
            let mut frontier = BestFirstFrontier::uniform_cost();
            goal_recognition_agent(
                level,
                &HOSPITAL_ACTION_LIBRARY,
                &mut frontier,
                &mut connection,
                &mut rng,
                &mut monitor,
                !no_iterative_deepening,
                allow_cyclic,
            )?;
        }
    }
    Ok(())
}
