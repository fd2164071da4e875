//! Memory consolidation - working memory (knowledge log) to episodic memory.

mod summarizer;

pub use summarizer::{Summarizer, build_summary};
