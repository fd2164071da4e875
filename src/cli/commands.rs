//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: goal-driven planner loop (default)
//! - todo: checklist-driven loop
//! - plan: dry-run the next planner decision
//! - history / summarize / parse: inspect and maintain memory

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// G.E.A.R. - a goal-driven desktop and browser automation agent
#[derive(Parser, Debug)]
#[command(name = "gear")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the agent loop against the goal file
    Run {
        /// Goal file (overrides config)
        #[arg(short, long)]
        goal_file: Option<PathBuf>,

        /// Iteration ceiling (overrides config)
        #[arg(short, long)]
        max_iterations: Option<u32>,
    },

    /// Execute the unchecked items of a Markdown checklist
    Todo {
        /// Checklist file (overrides config)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show the task the planner would run next, without running it
    Plan {
        /// Goal text (defaults to the goal file)
        #[arg(short, long)]
        goal: Option<String>,
    },

    /// Print the recorded task history
    History,

    /// Consolidate the task history into an episodic summary
    Summarize,

    /// Parse a task string and print the result
    Parse {
        /// Task text, e.g. 'web:navigate:{"url":"https://example.com"}'
        task: String,
    },
}
