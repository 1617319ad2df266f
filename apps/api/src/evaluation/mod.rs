// Interview evaluation engine.
// Implements: rubrics, unsure-answer detection, resume skill matching,
// per-answer scoring, session aggregation, follow-up questions.
// All model calls go through llm_client via the `Scorer` trait.

pub mod answer;
pub mod follow_up;
pub mod prompts;
mod reply;
pub mod rubric;
pub mod scorer;
pub mod session;
pub mod skills;
pub mod unsure;
