use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::{LevelFilter, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;
use gear::backend::{DetachedGui, SystemShell, WebBackend};
use gear::dispatch::Dispatcher;
use gear::domain::{Goal, Task};
use gear::memory::Summarizer;
use gear::planner::{Checklist, GoalPlan, Planner, TaskSource};
use gear::runner::{AgentLoop, AgentLoopConfig, AgentState, RunReport};
use gear::storage::{EpisodicStore, KnowledgeStore};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gear")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("gear.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let from_env = std::env::var_os("RUST_LOG").is_some();
    let mut builder = if from_env {
        env_logger::Builder::from_default_env()
    } else {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(LevelFilter::Trace);
        builder
    };
    builder.target(env_logger::Target::Pipe(target)).init();

    // Without RUST_LOG the effective level comes from config, applied later
    if !from_env {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn apply_log_level(cli: &Cli, config: &Config) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let level = if cli.is_verbose() {
        LevelFilter::Debug
    } else {
        config
            .log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    };
    log::set_max_level(level);
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => handle_run_command(None, None, config).await,
        Some(Commands::Run {
            goal_file,
            max_iterations,
        }) => handle_run_command(goal_file.as_deref(), *max_iterations, config).await,
        Some(Commands::Todo { file }) => handle_todo_command(file.as_deref(), config).await,
        Some(Commands::Plan { goal }) => handle_plan_command(goal.as_deref(), config),
        Some(Commands::History) => handle_history_command(config),
        Some(Commands::Summarize) => handle_summarize_command(config),
        Some(Commands::Parse { task }) => handle_parse_command(task),
    }
}

fn web_backend(config: &Config) -> Arc<dyn WebBackend> {
    #[cfg(feature = "browser")]
    {
        Arc::new(gear::backend::ChromeWeb::new(std::time::Duration::from_millis(
            config.web.timeout_ms,
        )))
    }
    #[cfg(not(feature = "browser"))]
    {
        let _ = config;
        Arc::new(gear::backend::DetachedWeb)
    }
}

fn build_dispatcher(config: &Config) -> Dispatcher {
    Dispatcher::new(
        Arc::new(DetachedGui),
        web_backend(config),
        Arc::new(SystemShell::new(config.shell.shell_config())),
    )
}

fn knowledge_store(config: &Config) -> KnowledgeStore {
    KnowledgeStore::new(&config.memory.knowledge_path)
}

fn load_goal(path: &Path) -> Result<Option<Goal>> {
    Goal::load(path).context(format!("Failed to read goal file {}", path.display()))
}

async fn handle_run_command(goal_file: Option<&Path>, max_iterations: Option<u32>, config: &Config) -> Result<()> {
    let goal_path = goal_file.unwrap_or(config.goal_file.as_path());
    let Some(goal) = load_goal(goal_path)? else {
        println!(
            "{} Goal file {} is missing or empty. Please create it with your goal.",
            "Error:".red(),
            goal_path.display()
        );
        return Ok(());
    };

    println!("{} {}", "Goal:".green(), goal);
    let source = GoalPlan::new(goal, Planner::new(config.planner.planner_config()));

    let mut loop_config = config.agent.loop_config();
    if let Some(limit) = max_iterations {
        loop_config.max_iterations = limit;
    }
    drive(source, loop_config, config).await
}

async fn handle_todo_command(file: Option<&Path>, config: &Config) -> Result<()> {
    let path = file.unwrap_or(config.todo_file.as_path());
    println!("{} {}", "Checklist:".green(), path.display());
    drive(Checklist::new(path), config.agent.loop_config(), config).await
}

async fn drive<S: TaskSource>(source: S, loop_config: AgentLoopConfig, config: &Config) -> Result<()> {
    let mut agent = AgentLoop::with_config(source, build_dispatcher(config), knowledge_store(config), loop_config);
    let report = agent.run().await;
    print_report(&report);

    if config.memory.summarize_on_exit {
        summarize(config)?;
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for (index, step) in report.steps.iter().enumerate() {
        let status = if step.is_success() {
            step.status.to_string().green()
        } else {
            step.status.to_string().red()
        };
        println!("{:>3}. [{}] {}", index + 1, status, step.task);
        if !step.is_success() && !step.stderr.is_empty() {
            println!("     {}", step.stderr.red());
        }
    }

    match &report.state {
        AgentState::Done => println!("{}", "Goal complete.".green().bold()),
        AgentState::Stopped(reason) => println!("{} {}", "Stopped:".red().bold(), reason),
        other => println!("{} {:?}", "Unexpected state:".yellow(), other),
    }
}

fn handle_plan_command(goal: Option<&str>, config: &Config) -> Result<()> {
    let goal = match goal {
        Some(text) => Goal::new(text),
        None => load_goal(&config.goal_file)?,
    };
    let Some(goal) = goal else {
        return Err(eyre!("No goal given and {} is missing or empty", config.goal_file.display()));
    };

    let history = knowledge_store(config)
        .read_history()
        .context("Failed to read knowledge log")?;
    let planner = Planner::new(config.planner.planner_config());

    println!("{} {}", "Goal:".green(), goal);
    match planner.decide(goal.as_str(), &history) {
        Some(task) => println!("{} {}", "Next task:".cyan(), task),
        None => println!("{}", "Planner concludes the goal is complete.".yellow()),
    }
    Ok(())
}

fn handle_history_command(config: &Config) -> Result<()> {
    let store = knowledge_store(config);
    let history = store.read_history().context("Failed to read knowledge log")?;

    if history.is_empty() {
        println!("{} {}", "No history in".yellow(), store.path().display());
        return Ok(());
    }

    for entry in &history {
        let status = if entry.is_success() {
            entry.status.to_string().green()
        } else {
            entry.status.to_string().red()
        };
        println!(
            "{} [{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            status,
            entry.task
        );
        if !entry.learning.is_empty() {
            println!("    {}", entry.learning);
        }
        if !entry.is_success() && !entry.stderr.is_empty() {
            println!("    {}", entry.stderr.red());
        }
    }
    Ok(())
}

fn summarize(config: &Config) -> Result<()> {
    let summarizer = Summarizer::new(
        knowledge_store(config),
        EpisodicStore::new(&config.memory.episodic_path),
    );
    match summarizer.summarize().context("Failed to summarize history")? {
        Some(episode) => {
            println!("{} {}", "Episode:".cyan(), episode.narrative);
        }
        None => println!("{}", "No history to summarize.".yellow()),
    }
    Ok(())
}

fn handle_summarize_command(config: &Config) -> Result<()> {
    summarize(config)
}

fn handle_parse_command(text: &str) -> Result<()> {
    match Task::parse(text) {
        Ok(task) => {
            println!("{} {}", "Kind:".green(), task.kind());
            match &task {
                Task::Shell { command } => println!("{} {}", "Command:".green(), command),
                Task::Gui { action, params } | Task::Web { action, params } => {
                    println!("{} {}", "Action:".green(), action);
                    println!("{} {}", "Params:".green(), serde_json::Value::Object(params.clone()));
                }
            }
            println!("{} {}", "Canonical:".green(), task);
            Ok(())
        }
        Err(e) => Err(e).context(format!("Failed to parse task '{}'", text)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_log_level(&cli, &config);

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
