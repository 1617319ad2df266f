//! Session-level aggregation: folds per-answer evaluations into one summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evaluation::prompts::{fill_template, SESSION_EVAL_PROMPT_TEMPLATE};
use crate::evaluation::reply::{string_list_field, text_field};
use crate::llm_client::prompts::INTERVIEWER_PERSONA;
use crate::llm_client::strip_json_fences;
use crate::models::session::AnswerRecord;

/// Characters of each answer quoted in the summary prompt.
const ANSWER_EXCERPT_CHARS: usize = 100;
/// Overall score reported when aggregation itself could not run.
pub const FALLBACK_OVERALL_SCORE: u32 = 75;

/// Summary of a completed interview. Created once, when the session completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvaluation {
    pub overall_score: u32,
    pub total_questions: usize,
    pub completed_questions: usize,
    pub feedback: String,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub criteria_averages: BTreeMap<String, u32>,
}

/// Numeric part of a session evaluation, independent of the narrative.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionScores {
    pub overall_score: u32,
    pub criteria_averages: BTreeMap<String, u32>,
    pub answered: usize,
}

/// Averages `weighted_score` over all answers and each criterion's score over
/// all answers. A criterion missing from some answers is not re-normalized:
/// its total is still divided by the full answer count. No answers → 0.
pub fn aggregate_scores(answers: &[AnswerRecord]) -> SessionScores {
    let divisor = answers.len().max(1) as f64;

    let total: f64 = answers
        .iter()
        .map(|a| a.feedback.weighted_score as f64)
        .sum();

    let mut criteria_totals: BTreeMap<String, f64> = BTreeMap::new();
    for answer in answers {
        for (name, criterion) in &answer.feedback.criteria {
            *criteria_totals.entry(name.clone()).or_default() += criterion.score as f64;
        }
    }

    SessionScores {
        overall_score: (total / divisor).round() as u32,
        criteria_averages: criteria_totals
            .into_iter()
            .map(|(name, sum)| (name, (sum / divisor).round() as u32))
            .collect(),
        answered: answers.len(),
    }
}

fn completion_sentence(role: &str, score: u32) -> String {
    format!(
        "You completed the {role} interview with an average score of {score}/100. \
        Your responses demonstrate good understanding of the role requirements."
    )
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_recommendations() -> Vec<String> {
    strings(&[
        "Practice more technical questions specific to your role",
        "Work on your communication skills",
        "Research industry best practices",
        "Prepare specific examples from your experience",
    ])
}

impl SessionEvaluation {
    fn with_narrative(scores: SessionScores, feedback: String, recommendations: Vec<String>) -> Self {
        Self {
            overall_score: scores.overall_score,
            total_questions: scores.answered,
            completed_questions: scores.answered,
            feedback,
            recommendations,
            criteria_averages: scores.criteria_averages,
        }
    }

    /// Templated summary used when no model is configured.
    pub fn heuristic(role: &str, scores: SessionScores) -> Self {
        let feedback = format!(
            "{} Keep practicing to deepen specifics and quantify impact.",
            completion_sentence(role, scores.overall_score)
        );
        Self::with_narrative(
            scores,
            feedback,
            strings(&[
                "Practice more technical questions specific to your role",
                "Work on your communication skills and clarity",
                "Research industry best practices and trends",
                "Prepare specific examples from your experience",
            ]),
        )
    }

    /// Summary used when the model call failed.
    pub fn without_model_reply(role: &str, scores: SessionScores) -> Self {
        let feedback = completion_sentence(role, scores.overall_score);
        Self::with_narrative(scores, feedback, default_recommendations())
    }

    /// Deepest fallback, used when the evaluation could not run at all.
    pub fn fallback(answered: usize) -> Self {
        Self {
            overall_score: FALLBACK_OVERALL_SCORE,
            total_questions: answered,
            completed_questions: answered,
            feedback: "Good interview performance! Keep practicing to improve your skills."
                .to_string(),
            recommendations: strings(&[
                "Practice more technical questions",
                "Work on communication skills",
                "Research industry best practices",
            ]),
            criteria_averages: BTreeMap::new(),
        }
    }
}

fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_session_prompt(answers: &[AnswerRecord], role: &str, average_score: u32) -> String {
    let avg_length = if answers.is_empty() {
        0
    } else {
        let total: usize = answers.iter().map(|a| a.answer.chars().count()).sum();
        (total as f64 / answers.len() as f64).round() as usize
    };

    let responses = answers
        .iter()
        .map(|a| {
            format!(
                "Q: {} | A: {}...",
                a.question,
                excerpt(&a.answer, ANSWER_EXCERPT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    fill_template(
        SESSION_EVAL_PROMPT_TEMPLATE,
        &[
            ("persona", INTERVIEWER_PERSONA),
            ("count", &answers.len().to_string()),
            ("avg_length", &avg_length.to_string()),
            ("role", role),
            ("avg_score", &average_score.to_string()),
            ("responses", &responses),
        ],
    )
}

/// Builds the session evaluation from a model reply. A JSON object is read
/// leniently: a null or mistyped `feedback` gets the default sentence and
/// non-string recommendations are dropped. A reply that is not a JSON object
/// is still shown to the candidate as the narrative, with the default
/// recommendations.
pub fn parse_model_summary(reply: &str, role: &str, scores: SessionScores) -> SessionEvaluation {
    match serde_json::from_str::<Value>(strip_json_fences(reply)) {
        Ok(parsed) if parsed.is_object() => {
            let feedback = text_field(&parsed, "feedback")
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| completion_sentence(role, scores.overall_score));
            let recommendations = string_list_field(&parsed, "recommendations")
                .unwrap_or_else(default_recommendations);
            SessionEvaluation::with_narrative(scores, feedback, recommendations)
        }
        other => {
            if let Err(e) = other {
                tracing::warn!("Model session summary was not valid JSON, using reply as text: {e}");
            }
            let text = reply.trim();
            let feedback = if text.is_empty() {
                completion_sentence(role, scores.overall_score)
            } else {
                text.to_string()
            };
            SessionEvaluation::with_narrative(scores, feedback, default_recommendations())
        }
    }
}
