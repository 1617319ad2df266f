//! One clarifying follow-up question for an answer.

use serde::Deserialize;

use crate::evaluation::prompts::{fill_template, FOLLOW_UP_PROMPT_TEMPLATE};
use crate::llm_client::prompts::INTERVIEWER_PERSONA;
use crate::llm_client::strip_json_fences;

pub fn build_follow_up_prompt(question: &str, answer: &str, role: &str) -> String {
    fill_template(
        FOLLOW_UP_PROMPT_TEMPLATE,
        &[
            ("persona", INTERVIEWER_PERSONA),
            ("role", role),
            ("question", question),
            ("answer", answer),
        ],
    )
}

#[derive(Debug, Deserialize)]
struct FollowUpReply {
    follow_up: Option<serde_json::Value>,
}

/// Extracts `follow_up` from the model reply; anything unexpected yields "".
pub fn parse_follow_up(reply: &str) -> String {
    serde_json::from_str::<FollowUpReply>(strip_json_fences(reply))
        .ok()
        .and_then(|r| r.follow_up)
        .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
        .unwrap_or_default()
}
