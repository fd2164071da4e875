//! Storage layer for Gear - append-only JSONL stores.
//!
//! - KnowledgeStore: working memory, one record per executed task
//! - EpisodicStore: one summary per consolidated run
//!
//! Both sit on `JsonlLog`, which appends whole lines and skips malformed
//! lines on read instead of failing the read.

mod episodic;
mod jsonl;
mod knowledge;

pub use episodic::EpisodicStore;
pub use jsonl::JsonlLog;
pub use knowledge::KnowledgeStore;
