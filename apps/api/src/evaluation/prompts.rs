// All LLM prompt templates for the evaluation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::evaluation::rubric::{Criterion, FewShot};

/// Answer scoring prompt. Replace: {persona}, {rubric}, {examples}, {question}, {answer}, {role}
pub const ANSWER_EVAL_PROMPT_TEMPLATE: &str = r#"{persona}

Evaluate the candidate's answer using the role-specific rubric below. Score each criterion 0-100 with a brief reason, then compute a weighted_score (0-100) using the given weights (weights sum to 1.0). Return concise feedback and 3 suggestions.

Rubric:
{rubric}

Few-shot anchors (for reference quality; do not copy):
{examples}

Question: {question}
Answer: {answer}
Role: {role}

Return JSON only:
{
  "criteria": {
    "<criterion_name>": { "score": <0-100>, "weight": <0-1>, "reason": "<short>" }
  },
  "weighted_score": <0-100>,
  "score": <0-100>,
  "feedback": "<2 short sentences>",
  "suggestions": ["<short>", "<short>", "<short>"]
}"#;

/// Session summary prompt.
/// Replace: {persona}, {count}, {avg_length}, {role}, {avg_score}, {responses}
pub const SESSION_EVAL_PROMPT_TEMPLATE: &str = r#"{persona} You are providing overall feedback for an interview session.

Interview Summary:
- Total questions answered: {count}
- Average answer length: {avg_length} characters
- Role: {role}
- Average score: {avg_score}/100

Individual responses:
{responses}

Please provide overall feedback on the candidate's interview performance. Consider:
1. Overall communication skills
2. Consistency in responses
3. Areas of strength
4. Areas for improvement
5. Overall impression

Provide feedback in 3-4 sentences that sounds natural and conversational. Use a warm, professional tone as if you're wrapping up a real interview. Be encouraging but honest about areas for improvement.

Also provide 4 specific recommendations for improvement.

Format your response as JSON:
{
  "feedback": "<overall_feedback_text>",
  "recommendations": ["<rec1>", "<rec2>", "<rec3>", "<rec4>"]
}"#;

/// Follow-up question prompt. Replace: {persona}, {role}, {question}, {answer}
pub const FOLLOW_UP_PROMPT_TEMPLATE: &str = r#"{persona}

Role: {role}
Original question: {question}
Candidate's answer: {answer}

Write ONE brief, natural follow-up question that digs deeper into the candidate's experience, tools used, impact, or decision-making. Keep it under 18 words. If the candidate clearly said they don't know, return an empty string.

Respond as JSON only:
{ "follow_up": "<one_short_question_or_empty>" }"#;

/// Substitutes `{key}` placeholders in one pass over the template.
///
/// Inserted values are never rescanned, so caller text that happens to contain
/// `{answer}` or `{role}` is kept verbatim. Unknown `{...}` groups (the JSON
/// shapes in the templates) are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let value = tail.find('}').and_then(|close| {
            let key = &tail[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// One line per criterion: `1. System Design (weight 0.35): APIs, data modeling, ...`
pub fn render_rubric(rubric: &[Criterion]) -> String {
    rubric
        .iter()
        .enumerate()
        .map(|(idx, c)| format!("{}. {} (weight {}): {}", idx + 1, c.name, c.weight, c.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_few_shots(examples: &[FewShot]) -> String {
    if examples.is_empty() {
        return "(none)".to_string();
    }
    examples
        .iter()
        .enumerate()
        .map(|(idx, ex)| {
            format!(
                "Example {} - {}\nQ: {}\nA: {}\nWhy: {}",
                idx + 1,
                ex.label,
                ex.question,
                ex.answer,
                ex.rationale
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::rubric::{few_shots_for, rubric_for};

    #[test]
    fn test_render_rubric_numbers_lines() {
        let text = render_rubric(rubric_for("sde"));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "1. Problem Solving (weight 0.35): DSA, complexity, correctness"
        );
        assert!(lines[3].starts_with("4. Communication & Clarity (weight 0.2)"));
    }

    #[test]
    fn test_fill_template_single_pass() {
        let out = fill_template(
            "Q: {question} / A: {answer} / R: {role}",
            &[("question", "Explain {answer} vs {role}"), ("answer", "SECRET"), ("role", "sde")],
        );
        assert_eq!(out, "Q: Explain {answer} vs {role} / A: SECRET / R: sde");
    }

    #[test]
    fn test_fill_template_keeps_unknown_groups() {
        let out = fill_template("{ \"score\": <0-100> } {name} {", &[("name", "x")]);
        assert_eq!(out, "{ \"score\": <0-100> } x {");
    }

    #[test]
    fn test_render_few_shots_none() {
        assert_eq!(render_few_shots(few_shots_for("sde")), "(none)");
    }

    #[test]
    fn test_render_few_shots_blocks() {
        let text = render_few_shots(few_shots_for("cloud_engineer"));
        assert!(text.starts_with("Example 1 - Good\nQ: Design a highly available web app on AWS."));
        assert!(text.contains("\n\nExample 2 - Poor\n"));
        assert!(text.contains("Why: No HA detail, no services, no ops"));
    }
}
