use anyhow::Result;
use atomize::cli::{
    Args, AtomizeConfig, ConfigDiscovery, Display, ExecutionMode, InteractiveSession,
};
use atomize::task::{PlanParser, TaskManager, local_today};
use atomize::{FileHistoryLog, FileSessionStore};
use rand::rngs::ThreadRng;
use std::io::{self, StdinLock, Stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

type TerminalSession = InteractiveSession<StdinLock<'static>, Stdout, ThreadRng>;

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("Starting atomize {}", env!("CARGO_PKG_VERSION"));

    let mode = args.mode();
    if let ExecutionMode::ShowConfig { init } = mode {
        if init {
            let path = ConfigDiscovery::create_default_user_config()?;
            println!("Default configuration: {:?}", path);
            println!();
        }
        ConfigDiscovery::show_discovery_info();
        return Ok(());
    }

    let config = ConfigDiscovery::load(args.config.as_deref())?;

    match mode {
        ExecutionMode::Parse { expression, json } => run_parse(&expression, json, &config),
        ExecutionMode::Menu => open_session(&args, &config)?.run_menu(),
        ExecutionMode::Plan(plan) => {
            open_session(&args, &config)?.plan_day(plan.expression, plan.overdue, plan.run)?;
            Ok(())
        }
        ExecutionMode::Continue => open_session(&args, &config)?.continue_day(),
        ExecutionMode::Summary => open_session(&args, &config)?.show_summary(),
        ExecutionMode::ShowConfig { .. } => Ok(()),
    }
}

fn open_session(args: &Args, config: &AtomizeConfig) -> Result<TerminalSession> {
    let data_dir = config.resolve_data_dir(args.data_dir.clone());
    info!("Using data directory: {:?}", data_dir);

    let store = FileSessionStore::new(&data_dir)?;
    let history = FileHistoryLog::new(&data_dir)?;
    let manager = TaskManager::open(
        Box::new(store),
        Box::new(history),
        config.scoring.clone(),
        local_today(),
    );

    Ok(InteractiveSession::new(
        manager,
        io::stdin().lock(),
        Display::new(io::stdout(), &config.display),
        rand::rng(),
    ))
}

/// Parse a plan without touching the session and print the tasks
fn run_parse(expression: &str, json: bool, config: &AtomizeConfig) -> Result<()> {
    let tasks = PlanParser::parse(expression)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        Display::new(io::stdout(), &config.display).show_plan(&tasks)?;
    }
    Ok(())
}
