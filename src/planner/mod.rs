//! Planning - deciding the next task
//!
//! - Planner: closed rule table for "search google for <query>" goals
//! - TaskSource: the seam the agent loop pulls tasks through
//! - GoalPlan / Checklist: planner-driven and checklist-driven sources

mod search;
mod source;

pub use search::{
    DEFAULT_QUERY, Planner, PlannerConfig, SearchState, extract_query, is_search_goal, last_successful_task,
};
pub use source::{Checklist, GoalPlan, TaskSource, check_item, find_next_item};
