//! CLI module for gear - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for running the agent,
//! checklist mode, dry-run planning and memory maintenance.

pub mod commands;

pub use commands::Cli;
