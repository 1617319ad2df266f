//! Scorer: pluggable, trait-based evaluation of answers and sessions.
//!
//! `HeuristicScorer`: no model, length-based scores, templated narrative.
//! `ModelBackedScorer`: prompts a local chat model and degrades to fallbacks on any failure.
//!
//! One of the two is chosen once at startup (`select_scorer`) and carried in
//! `AppState` as `Arc<dyn Scorer>`. No method returns an error.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ScorerBackend};
use crate::evaluation::answer::{
    build_answer_prompt, fallback_score, heuristic_evaluation, parse_model_evaluation,
    AnswerEvaluation,
};
use crate::evaluation::follow_up::{build_follow_up_prompt, parse_follow_up};
use crate::evaluation::rubric::rubric_for;
use crate::evaluation::session::{
    aggregate_scores, build_session_prompt, parse_model_summary, SessionEvaluation,
};
use crate::evaluation::unsure::is_unsure_answer;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{ChatMessage, ChatModel, LlmClient};
use crate::models::session::AnswerRecord;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait Scorer: Send + Sync {
    async fn evaluate_answer(&self, question: &str, answer: &str, role: &str) -> AnswerEvaluation;

    async fn evaluate_session(&self, answers: &[AnswerRecord], role: &str) -> SessionEvaluation;

    /// One clarifying question, or "" when none can be produced.
    async fn follow_up(&self, question: &str, answer: &str, role: &str) -> String;

    /// "heuristic" or "model"; shown in logs and on the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Random source shared by a scorer's calls. Seedable for tests.
struct JitterSource(Mutex<StdRng>);

impl JitterSource {
    fn from_entropy() -> Self {
        Self(Mutex::new(StdRng::from_entropy()))
    }

    fn seeded(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct HeuristicScorer {
    rng: JitterSource,
}

impl HeuristicScorer {
    pub fn new() -> Self {
        Self {
            rng: JitterSource::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: JitterSource::seeded(seed),
        }
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scorer for HeuristicScorer {
    async fn evaluate_answer(&self, _question: &str, answer: &str, role: &str) -> AnswerEvaluation {
        if is_unsure_answer(answer) {
            return AnswerEvaluation::unsure();
        }
        let rubric = rubric_for(role);
        self.rng.with(|rng| heuristic_evaluation(rubric, answer, rng))
    }

    async fn evaluate_session(&self, answers: &[AnswerRecord], role: &str) -> SessionEvaluation {
        SessionEvaluation::heuristic(role, aggregate_scores(answers))
    }

    async fn follow_up(&self, _question: &str, _answer: &str, _role: &str) -> String {
        String::new()
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ModelBackedScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct ModelBackedScorer {
    model: Arc<dyn ChatModel>,
    rng: JitterSource,
}

impl ModelBackedScorer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            rng: JitterSource::from_entropy(),
        }
    }

    pub fn with_seed(model: Arc<dyn ChatModel>, seed: u64) -> Self {
        Self {
            model,
            rng: JitterSource::seeded(seed),
        }
    }

    async fn ask(&self, prompt: String) -> Result<String, crate::llm_client::LlmError> {
        let messages = [ChatMessage::system(JSON_ONLY_SYSTEM), ChatMessage::user(prompt)];
        let reply = self.model.chat(&messages).await?;
        debug!("Model reply ({} chars)", reply.len());
        Ok(reply)
    }
}

#[async_trait]
impl Scorer for ModelBackedScorer {
    async fn evaluate_answer(&self, question: &str, answer: &str, role: &str) -> AnswerEvaluation {
        if is_unsure_answer(answer) {
            return AnswerEvaluation::unsure();
        }
        let rubric = rubric_for(role);
        let prompt = build_answer_prompt(rubric, question, answer, role);

        match self.ask(prompt).await {
            Ok(reply) => self
                .rng
                .with(|rng| parse_model_evaluation(&reply, rubric, rng)),
            Err(e) => {
                warn!("Answer evaluation model call failed, using generic evaluation: {e}");
                let score = self.rng.with(fallback_score);
                AnswerEvaluation::generic(role, score)
            }
        }
    }

    async fn evaluate_session(&self, answers: &[AnswerRecord], role: &str) -> SessionEvaluation {
        let scores = aggregate_scores(answers);
        let prompt = build_session_prompt(answers, role, scores.overall_score);

        match self.ask(prompt).await {
            Ok(reply) => parse_model_summary(&reply, role, scores),
            Err(e) => {
                warn!("Session evaluation model call failed, using templated summary: {e}");
                SessionEvaluation::without_model_reply(role, scores)
            }
        }
    }

    async fn follow_up(&self, question: &str, answer: &str, role: &str) -> String {
        if answer.trim().is_empty() {
            return String::new();
        }
        match self.ask(build_follow_up_prompt(question, answer, role)).await {
            Ok(reply) => parse_follow_up(&reply),
            Err(e) => {
                warn!("Follow-up model call failed: {e}");
                String::new()
            }
        }
    }

    fn backend(&self) -> &'static str {
        "model"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Startup selection and request-level guards
// ────────────────────────────────────────────────────────────────────────────

/// Picks the scorer once for the process lifetime. `Auto` checks the model server is reachable.
pub async fn select_scorer(config: &Config) -> anyhow::Result<Arc<dyn Scorer>> {
    let use_model = match config.scorer_backend {
        ScorerBackend::Heuristic => false,
        ScorerBackend::Model => true,
        ScorerBackend::Auto => {
            let client = LlmClient::new(
                &config.ollama_url,
                &config.ollama_model,
                std::time::Duration::from_secs(5),
            )?;
            client.is_available().await
        }
    };

    if !use_model {
        info!("Scoring answers with the heuristic scorer");
        return Ok(Arc::new(HeuristicScorer::new()));
    }

    let llm = LlmClient::new(
        &config.ollama_url,
        &config.ollama_model,
        std::time::Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("Scoring answers with local model (model: {})", llm.model());
    Ok(Arc::new(ModelBackedScorer::new(Arc::new(llm))))
}

/// Runs `evaluate_answer` on its own task; if that task aborts, the caller
/// still receives a generic evaluation.
pub async fn evaluate_answer_guarded(
    scorer: Arc<dyn Scorer>,
    question: String,
    answer: String,
    role: String,
) -> AnswerEvaluation {
    let task_role = role.clone();
    let task =
        tokio::spawn(async move { scorer.evaluate_answer(&question, &answer, &task_role).await });
    match task.await {
        Ok(evaluation) => evaluation,
        Err(e) => {
            error!("Answer evaluation task aborted: {e}");
            let score = fallback_score(&mut StdRng::from_entropy());
            AnswerEvaluation::generic(&role, score)
        }
    }
}

/// Runs `evaluate_session` on its own task; an aborted task yields `SessionEvaluation::fallback`.
pub async fn evaluate_session_guarded(
    scorer: Arc<dyn Scorer>,
    answers: Vec<AnswerRecord>,
    role: String,
) -> SessionEvaluation {
    let answered = answers.len();
    let task = tokio::spawn(async move { scorer.evaluate_session(&answers, &role).await });
    match task.await {
        Ok(evaluation) => evaluation,
        Err(e) => {
            error!("Session evaluation task aborted: {e}");
            SessionEvaluation::fallback(answered)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
