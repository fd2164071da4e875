//! Agent loop integration tests
//!
//! Drives the public API end-to-end with mock backends and a temp-dir store.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use gear::backend::mock::{Behaviour, MockGui, MockShell, MockWeb};
use gear::backend::{ShellConfig, SystemShell};
use gear::dispatch::{Dispatcher, TaskExecutor};
use gear::domain::{Goal, HistoryEntry, Task, TaskStatus};
use gear::error::Result;
use gear::memory::Summarizer;
use gear::planner::{Checklist, GoalPlan, Planner, TaskSource};
use gear::runner::{AgentLoop, AgentLoopConfig, AgentState, StopReason};
use gear::storage::{EpisodicStore, KnowledgeStore};
use tempfile::TempDir;

fn fast(max_iterations: u32) -> AgentLoopConfig {
    AgentLoopConfig {
        max_iterations,
        iteration_delay: Duration::ZERO,
    }
}

fn dispatcher(web: Arc<MockWeb>) -> Dispatcher {
    Dispatcher::new(Arc::new(MockGui::new()), web, Arc::new(MockShell::new()))
}

/// Integration test: the search goal runs launch, navigate, type, click, then completes
#[tokio::test]
async fn test_search_goal_end_to_end() -> Result<()> {
    let temp = TempDir::new()?;
    let knowledge = KnowledgeStore::new(temp.path().join("knowledge.jsonl"));
    let web = Arc::new(MockWeb::new());

    let goal = Goal::new("search google for rust ownership").unwrap();
    let source = GoalPlan::new(goal, Planner::default());
    let mut agent = AgentLoop::with_config(source, dispatcher(web.clone()), knowledge.clone(), fast(10));

    let report = agent.run().await;
    assert_eq!(report.state, AgentState::Done);
    assert_eq!(
        web.calls(),
        vec![
            "launch chromium headless=false",
            "navigate https://www.google.com",
            "type textarea[name=q] rust ownership",
            "click input[name=btnK]",
        ]
    );
    assert!(web.released());

    let history = knowledge.read_history()?;
    assert_eq!(history.len(), 4);
    assert!(history.iter().all(HistoryEntry::is_success));
    assert_eq!(history[0].command, "web:launch");
    assert_eq!(history[1].stdout, "Navigated successfully.");
    assert_eq!(history[3].learning, "Attempted to click web element.");
    Ok(())
}

/// Integration test: a restarted agent resumes from the recorded history
#[tokio::test]
async fn test_search_goal_resumes_from_history() -> Result<()> {
    let temp = TempDir::new()?;
    let knowledge = KnowledgeStore::new(temp.path().join("knowledge.jsonl"));
    let goal = "search google for rust ownership";

    knowledge.record(&HistoryEntry::new(
        goal,
        r#"web:launch:{"headless":false}"#,
        "web:launch",
        TaskStatus::Success,
    ))?;
    knowledge.record(&HistoryEntry::new(
        goal,
        r#"web:navigate:{"url":"https://www.google.com"}"#,
        "web:navigate",
        TaskStatus::Success,
    ))?;

    let web = Arc::new(MockWeb::new());
    let source = GoalPlan::new(Goal::new(goal).unwrap(), Planner::default());
    let mut agent = AgentLoop::with_config(source, dispatcher(web.clone()), knowledge.clone(), fast(10));

    let report = agent.run().await;
    assert_eq!(report.state, AgentState::Done);
    assert_eq!(web.calls(), vec!["type textarea[name=q] rust ownership", "click input[name=btnK]"]);
    assert_eq!(knowledge.read_history()?.len(), 4);
    Ok(())
}

/// Integration test: a failing step stops the run and the summary records the error
#[tokio::test]
async fn test_failure_then_summarize() -> Result<()> {
    let temp = TempDir::new()?;
    let knowledge = KnowledgeStore::new(temp.path().join("knowledge.jsonl"));
    let episodes = EpisodicStore::new(temp.path().join("episodic.jsonl"));
    let web = Arc::new(MockWeb::new().with("type", Behaviour::Panic));

    let goal = Goal::new("search google for rust ownership").unwrap();
    let source = GoalPlan::new(goal, Planner::default());
    let mut agent = AgentLoop::with_config(source, dispatcher(web.clone()), knowledge.clone(), fast(10));

    let report = agent.run().await;
    match &report.state {
        AgentState::Stopped(StopReason::TaskFailed { task, error }) => {
            assert!(task.starts_with("web:type:"));
            assert!(error.contains("panicked"));
        }
        other => panic!("Expected TaskFailed, got {:?}", other),
    }
    assert!(web.released());

    let summary = Summarizer::new(knowledge.clone(), episodes.clone())
        .summarize()?
        .unwrap();
    assert_eq!(summary.goal, "search google for rust ownership");
    assert_eq!(summary.outcome, TaskStatus::Failure);
    assert_eq!(summary.step_count, 3);
    assert!(summary.narrative.starts_with("The agent failed to complete the goal."));

    assert!(knowledge.read_history()?.is_empty());
    assert_eq!(episodes.episodes()?.len(), 1);
    Ok(())
}

/// Integration test: a source that never finishes halts at the ceiling
#[tokio::test]
async fn test_loop_limit_with_endless_source() -> Result<()> {
    struct Endless;

    impl TaskSource for Endless {
        fn goal(&self) -> &str {
            "forever"
        }

        fn next_task(&mut self, history: &[HistoryEntry]) -> Result<Option<String>> {
            Ok(Some(format!("shell:echo step {}", history.len())))
        }
    }

    let temp = TempDir::new()?;
    let knowledge = KnowledgeStore::new(temp.path().join("knowledge.jsonl"));
    let mut agent = AgentLoop::with_config(Endless, dispatcher(Arc::new(MockWeb::new())), knowledge.clone(), fast(5));

    let report = agent.run().await;
    assert_eq!(report.state, AgentState::Stopped(StopReason::LoopLimit(5)));
    assert_eq!(knowledge.read_history()?.len(), 5);
    Ok(())
}

/// Integration test: checklist mode runs real shell commands and ticks items
#[tokio::test]
async fn test_checklist_with_system_shell() -> Result<()> {
    let temp = TempDir::new()?;
    let todo = temp.path().join("ToDo.md");
    fs::write(&todo, "# Plan\n- [ ] shell:echo hello\n- [ ] shell:exit 3\n- [ ] shell:echo unreachable\n")?;

    let knowledge = KnowledgeStore::new(temp.path().join("knowledge.jsonl"));
    let executor = Dispatcher::new(
        Arc::new(MockGui::new()),
        Arc::new(MockWeb::new()),
        Arc::new(SystemShell::new(ShellConfig::default().timeout_ms(10_000))),
    );
    let mut agent = AgentLoop::with_config(Checklist::new(&todo), executor, knowledge.clone(), fast(10));

    let report = agent.run().await;
    assert!(matches!(report.state, AgentState::Stopped(StopReason::TaskFailed { .. })));

    let history = knowledge.read_history()?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].stdout, "hello");
    assert_eq!(history[1].status, TaskStatus::Failure);
    assert_eq!(history[1].stderr, "exit 3 failed without an error message");

    let content = fs::read_to_string(&todo)?;
    assert!(content.contains("- [x] shell:echo hello"));
    assert!(content.contains("- [ ] shell:exit 3"));
    Ok(())
}

/// Integration test: unknown web actions are reported, not raised
#[tokio::test]
async fn test_dispatch_unsupported_web_action() -> Result<()> {
    let web = Arc::new(MockWeb::new());
    let outcome = dispatcher(web.clone()).execute(&Task::parse("web:bogus:{}")?).await;

    assert!(!outcome.success);
    assert!(outcome.stderr.contains("Unsupported Web action: bogus"));
    assert!(web.calls().is_empty());
    Ok(())
}
