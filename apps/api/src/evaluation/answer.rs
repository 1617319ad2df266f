//! Per-answer evaluation: output model plus the pure scoring paths
//! (unsure, heuristic, model reply parsing, generic fallback).
//!
//! Randomness is always taken from a caller-supplied `Rng` so scorers can be seeded.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evaluation::prompts::{
    fill_template, render_few_shots, render_rubric, ANSWER_EVAL_PROMPT_TEMPLATE,
};
use crate::evaluation::reply::{number_field, string_list_field, text_field};
use crate::evaluation::rubric::{few_shots_for, total_weight, Criterion};
use crate::llm_client::prompts::INTERVIEWER_PERSONA;
use crate::llm_client::strip_json_fences;

/// Score given to any "I don't know"-style answer.
pub const UNSURE_SCORE: u32 = 62;
/// Score used when the model reply omits both `score` and `weighted_score`.
pub const DEFAULT_MODEL_SCORE: u32 = 75;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub score: u32, // 0 – 100
    pub weight: f64,
    pub reason: String,
}

/// Evaluation of one submitted answer. Created once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub score: u32,
    pub weighted_score: u32,
    pub total_weight: f64,
    pub feedback: String,
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub criteria: BTreeMap<String, CriterionScore>,
}

impl AnswerEvaluation {
    /// Supportive evaluation for answers that admit not knowing.
    pub fn unsure() -> Self {
        Self {
            score: UNSURE_SCORE,
            weighted_score: UNSURE_SCORE,
            total_weight: 1.0,
            feedback: "That's completely okay. Not knowing every answer is normal in interviews. \
                A good approach is to explain how you'd find the answer or relate similar experience."
                .to_string(),
            suggestions: strings(&[
                "Share how you'd research or approach the problem",
                "Relate a similar concept you do understand",
                "Be honest and pivot to what you know",
            ]),
            criteria: BTreeMap::new(),
        }
    }

    /// Last-resort evaluation when the model call itself failed.
    pub fn generic(role: &str, score: u32) -> Self {
        Self {
            score,
            weighted_score: score,
            total_weight: 1.0,
            feedback: format!(
                "Great answer for the {role} position! You scored {score}/100. \
                Your response shows good understanding of the topic. Consider adding more \
                specific examples from your experience to make it even stronger."
            ),
            suggestions: strings(&[
                "Provide more specific examples",
                "Use technical terminology relevant to the role",
                "Structure your response better",
                "Connect your answer to real-world scenarios",
            ]),
            criteria: BTreeMap::new(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Pseudo-random fallback score in [60, 100).
pub fn fallback_score<R: Rng>(rng: &mut R) -> u32 {
    rng.gen_range(60..100)
}

fn clamp_score(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Heuristic path
// ────────────────────────────────────────────────────────────────────────────

/// Length-proportional score per criterion, jittered by ×[0.9, 1.1), combined by weight.
pub fn heuristic_evaluation<R: Rng>(
    rubric: &[Criterion],
    answer: &str,
    rng: &mut R,
) -> AnswerEvaluation {
    let length_score = (answer.chars().count() as f64 / 4.0).clamp(0.0, 100.0);

    let mut weighted = 0.0_f64;
    let mut criteria = BTreeMap::new();
    for c in rubric {
        let jitter: f64 = rng.gen_range(0.9..1.1);
        let score = clamp_score(length_score * jitter);
        weighted += score as f64 * c.weight;
        criteria.insert(
            c.name.to_string(),
            CriterionScore {
                score,
                weight: c.weight,
                reason: "Heuristic fallback without model".to_string(),
            },
        );
    }

    let score = clamp_score(weighted);
    AnswerEvaluation {
        score,
        weighted_score: score,
        total_weight: 1.0,
        feedback: "Good answer. Consider adding specific examples, tradeoffs, and measurable \
            impact to strengthen it."
            .to_string(),
        suggestions: strings(&[
            "Add one concrete example",
            "Explain tradeoffs/decisions",
            "Quantify outcome or impact",
        ]),
        criteria,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model-backed path
// ────────────────────────────────────────────────────────────────────────────

pub fn build_answer_prompt(rubric: &[Criterion], question: &str, answer: &str, role: &str) -> String {
    fill_template(
        ANSWER_EVAL_PROMPT_TEMPLATE,
        &[
            ("persona", INTERVIEWER_PERSONA),
            ("rubric", &render_rubric(rubric)),
            ("examples", &render_few_shots(few_shots_for(role))),
            ("role", role),
            ("question", question),
            ("answer", answer),
        ],
    )
}

/// Turns a model reply into an evaluation.
///
/// Any JSON object counts as a parsed reply: fields that are missing, null or
/// of the wrong type take their defaults. Top-level `score`/`weighted_score`
/// are trusted as returned (only clamped), even when they disagree with the
/// per-criterion breakdown. Anything that is not a JSON object falls back to
/// one random score applied to every rubric criterion.
pub fn parse_model_evaluation<R: Rng>(
    reply: &str,
    rubric: &[Criterion],
    rng: &mut R,
) -> AnswerEvaluation {
    match serde_json::from_str::<Value>(strip_json_fences(reply)) {
        Ok(parsed) if parsed.is_object() => from_model_reply(&parsed, rubric),
        Ok(_) => {
            tracing::warn!("Model evaluation reply was not a JSON object, using parse fallback");
            parse_fallback(rubric, fallback_score(rng))
        }
        Err(e) => {
            tracing::warn!("Model evaluation reply was not valid JSON, using parse fallback: {e}");
            parse_fallback(rubric, fallback_score(rng))
        }
    }
}

fn from_model_reply(parsed: &Value, rubric: &[Criterion]) -> AnswerEvaluation {
    let raw_score = number_field(parsed, "score");
    let raw_weighted = number_field(parsed, "weighted_score");
    let score = raw_score
        .or(raw_weighted)
        .map(clamp_score)
        .unwrap_or(DEFAULT_MODEL_SCORE);
    let weighted_score = raw_weighted
        .or(raw_score)
        .map(clamp_score)
        .unwrap_or(DEFAULT_MODEL_SCORE);

    let total = total_weight(rubric);
    let feedback = text_field(parsed, "feedback")
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| {
            "Good answer. Consider adding specific examples and tradeoffs.".to_string()
        });
    let suggestions = string_list_field(parsed, "suggestions").unwrap_or_else(|| {
        strings(&[
            "Provide more specific examples",
            "Explain tradeoffs",
            "Quantify impact",
        ])
    });
    let criteria = parsed
        .get("criteria")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter(|(_, c)| c.is_object())
                .map(|(name, c)| {
                    (
                        name.clone(),
                        CriterionScore {
                            score: number_field(c, "score").map(clamp_score).unwrap_or(0),
                            weight: number_field(c, "weight").unwrap_or(0.0),
                            reason: text_field(c, "reason").unwrap_or_default(),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    AnswerEvaluation {
        score,
        weighted_score,
        total_weight: if total > 0.0 { total } else { 1.0 },
        feedback,
        suggestions,
        criteria,
    }
}

fn parse_fallback(rubric: &[Criterion], score: u32) -> AnswerEvaluation {
    let criteria = rubric
        .iter()
        .map(|c| {
            (
                c.name.to_string(),
                CriterionScore {
                    score,
                    weight: c.weight,
                    reason: "Model parse fallback".to_string(),
                },
            )
        })
        .collect();

    AnswerEvaluation {
        score,
        weighted_score: score,
        total_weight: 1.0,
        feedback: format!(
            "Solid response. You scored {score}/100. Add concrete examples and quantify results."
        ),
        suggestions: strings(&["Add examples", "Explain tradeoffs", "Quantify impact"]),
        criteria,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::rubric::rubric_for;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn rubric_names(role: &str) -> Vec<String> {
        let mut names: Vec<_> = rubric_for(role).iter().map(|c| c.name.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_unsure_evaluation_is_fixed() {
        let eval = AnswerEvaluation::unsure();
        assert_eq!(eval.score, 62);
        assert_eq!(eval.weighted_score, 62);
        assert!(eval.feedback.starts_with("That's completely okay."));
        assert_eq!(eval.suggestions.len(), 3);
        assert!(eval.criteria.is_empty());
    }

    #[test]
    fn test_heuristic_keys_match_rubric() {
        for role in ["sde", "cloud_engineer", "ui_ux_designer"] {
            let eval = heuristic_evaluation(rubric_for(role), "a detailed answer", &mut rng());
            let keys: Vec<_> = eval.criteria.keys().cloned().collect();
            assert_eq!(keys, rubric_names(role));
        }
    }

    #[test]
    fn test_heuristic_score_in_range_for_long_answers() {
        let long = "x".repeat(2_000);
        for seed in 0..50 {
            let eval = heuristic_evaluation(
                rubric_for("backend_engineer"),
                &long,
                &mut StdRng::seed_from_u64(seed),
            );
            assert!(eval.score <= 100);
            assert!(eval.criteria.values().all(|c| c.score <= 100));
        }
    }

    #[test]
    fn test_heuristic_scales_with_length() {
        // 200 chars → length score 50, jitter keeps each criterion within [45, 55].
        let answer = "y".repeat(200);
        let eval = heuristic_evaluation(rubric_for("sde"), &answer, &mut rng());
        assert!((45..=55).contains(&eval.score), "score was {}", eval.score);
        for c in eval.criteria.values() {
            assert!((45..=55).contains(&c.score));
            assert_eq!(c.reason, "Heuristic fallback without model");
        }
    }

    #[test]
    fn test_heuristic_empty_answer_scores_zero() {
        let eval = heuristic_evaluation(rubric_for("sde"), "", &mut rng());
        assert_eq!(eval.score, 0);
    }

    #[test]
    fn test_heuristic_weighted_score_matches_criteria() {
        let eval = heuristic_evaluation(rubric_for("data_analyst"), &"z".repeat(300), &mut rng());
        let sum: f64 = eval
            .criteria
            .values()
            .map(|c| c.score as f64 * c.weight)
            .sum();
        assert!((eval.weighted_score as f64 - sum).abs() <= 0.5 + 1e-9);
    }

    #[test]
    fn test_parse_model_reply_uses_fields() {
        let reply = r#"{
            "criteria": {
                "Problem Solving": {"score": 80, "weight": 0.35, "reason": "clear"},
                "System Design": {"score": 70, "weight": 0.25, "reason": "ok"}
            },
            "weighted_score": 77,
            "score": 78,
            "feedback": "Nice structure. Add metrics.",
            "suggestions": ["a", "b", "c"]
        }"#;
        let eval = parse_model_evaluation(reply, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, 78);
        assert_eq!(eval.weighted_score, 77);
        assert_eq!(eval.feedback, "Nice structure. Add metrics.");
        assert_eq!(eval.suggestions, vec!["a", "b", "c"]);
        assert_eq!(eval.criteria["Problem Solving"].score, 80);
        assert!((eval.total_weight - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_model_reply_trusts_inconsistent_score() {
        // Breakdown implies ~50 but the model says 90: the top-level field wins.
        let reply = r#"{"criteria": {"Problem Solving": {"score": 50, "weight": 1.0, "reason": ""}}, "score": 90}"#;
        let eval = parse_model_evaluation(reply, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, 90);
        assert_eq!(eval.weighted_score, 90);
    }

    #[test]
    fn test_parse_model_reply_defaults() {
        let eval = parse_model_evaluation("{}", rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, DEFAULT_MODEL_SCORE);
        assert_eq!(eval.weighted_score, DEFAULT_MODEL_SCORE);
        assert_eq!(
            eval.feedback,
            "Good answer. Consider adding specific examples and tradeoffs."
        );
        assert_eq!(eval.suggestions.len(), 3);
        assert!(eval.criteria.is_empty());
    }

    #[test]
    fn test_parse_model_reply_weighted_only() {
        let eval = parse_model_evaluation(r#"{"weighted_score": 64.6}"#, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, 65);
        assert_eq!(eval.weighted_score, 65);
    }

    #[test]
    fn test_parse_model_reply_clamps_out_of_range() {
        let reply = r#"{"score": 140, "weighted_score": -3, "criteria": {"X": {"score": 250}}}"#;
        let eval = parse_model_evaluation(reply, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, 100);
        assert_eq!(eval.weighted_score, 0);
        assert_eq!(eval.criteria["X"].score, 100);
    }

    #[test]
    fn test_parse_model_reply_strips_fences() {
        let reply = "```json\n{\"score\": 88, \"feedback\": \"Good\"}\n```";
        let eval = parse_model_evaluation(reply, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, 88);
        assert_eq!(eval.feedback, "Good");
    }

    #[test]
    fn test_parse_model_reply_null_reason_is_kept() {
        let reply = r#"{"score":85,"weighted_score":84,"feedback":"Clear answer.","suggestions":["a","b","c"],"criteria":{"Problem Solving":{"score":80,"weight":0.35,"reason":null}}}"#;
        let eval = parse_model_evaluation(reply, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, 85);
        assert_eq!(eval.weighted_score, 84);
        assert_eq!(eval.feedback, "Clear answer.");
        assert_eq!(eval.criteria["Problem Solving"].score, 80);
        assert_eq!(eval.criteria["Problem Solving"].reason, "");
    }

    #[test]
    fn test_parse_model_reply_null_suggestion_is_dropped() {
        let reply = r#"{"score":85,"weighted_score":84,"feedback":"Clear answer.","suggestions":["a",null,"c"]}"#;
        let eval = parse_model_evaluation(reply, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, 85);
        assert_eq!(eval.suggestions, vec!["a", "c"]);
    }

    #[test]
    fn test_parse_model_reply_quoted_score_and_null_weight() {
        let reply = r#"{"score":"85","criteria":{"Problem Solving":{"score":"70","weight":null,"reason":"ok"}}}"#;
        let eval = parse_model_evaluation(reply, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, 85);
        assert_eq!(eval.weighted_score, 85);
        assert_eq!(eval.criteria["Problem Solving"].score, 70);
        assert_eq!(eval.criteria["Problem Solving"].weight, 0.0);
    }

    #[test]
    fn test_parse_model_reply_wrong_types_take_defaults() {
        let reply = r#"{"score":null,"feedback":42,"suggestions":"none","criteria":{"X":7}}"#;
        let eval = parse_model_evaluation(reply, rubric_for("sde"), &mut rng());
        assert_eq!(eval.score, DEFAULT_MODEL_SCORE);
        assert_eq!(
            eval.feedback,
            "Good answer. Consider adding specific examples and tradeoffs."
        );
        assert_eq!(eval.suggestions.len(), 3);
        assert!(eval.criteria.is_empty());
    }

    #[test]
    fn test_answer_prompt_keeps_placeholders_in_answer() {
        let prompt = build_answer_prompt(rubric_for("sde"), "Explain {answer} vs {role}", "SECRET", "sde");
        assert!(prompt.contains("Question: Explain {answer} vs {role}\n"));
        assert!(prompt.contains("Answer: SECRET\n"));
        assert!(prompt.contains("Role: sde\n"));
    }

    #[test]
    fn test_parse_failure_yields_complete_evaluation() {
        for seed in 0..50 {
            let eval = parse_model_evaluation(
                "Sure! Here is my evaluation: great answer.",
                rubric_for("frontend_engineer"),
                &mut StdRng::seed_from_u64(seed),
            );
            assert!((60..=100).contains(&eval.score));
            assert_eq!(eval.weighted_score, eval.score);
            assert_eq!(
                eval.criteria.keys().cloned().collect::<Vec<_>>(),
                rubric_names("frontend_engineer")
            );
            assert!(eval
                .criteria
                .values()
                .all(|c| c.score == eval.score && c.reason == "Model parse fallback"));
            assert!(eval.feedback.contains(&format!("{}/100", eval.score)));
            assert_eq!(eval.suggestions.len(), 3);
        }
    }

    #[test]
    fn test_generic_mentions_role_and_score() {
        let eval = AnswerEvaluation::generic("data_analyst", 71);
        assert!(eval.feedback.contains("data_analyst"));
        assert!(eval.feedback.contains("71/100"));
        assert_eq!(eval.suggestions.len(), 4);
    }

    #[test]
    fn test_prompt_embeds_rubric_examples_and_answer() {
        let prompt = build_answer_prompt(
            rubric_for("backend_engineer"),
            "How do you scale reads?",
            "Read replicas plus caching.",
            "backend_engineer",
        );
        assert!(prompt.contains("1. System Design (weight 0.35)"));
        assert!(prompt.contains("Example 2 - Poor"));
        assert!(prompt.contains("Question: How do you scale reads?"));
        assert!(prompt.contains("Answer: Read replicas plus caching."));
        assert!(prompt.contains("Role: backend_engineer"));
        assert!(!prompt.contains("{rubric}"));
    }

    #[test]
    fn test_evaluation_serializes_snake_case() {
        let value = serde_json::to_value(AnswerEvaluation::unsure()).unwrap();
        assert_eq!(value["weighted_score"], 62);
        assert!(value["criteria"].as_object().unwrap().is_empty());
    }
}
