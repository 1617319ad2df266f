//! Plain-text interview report, served as a download.

use std::fmt::Write;

use crate::models::session::InterviewSession;

pub fn report_filename(session: &InterviewSession) -> String {
    format!("interview_report_{}.txt", session.session_id)
}

/// `backend_engineer` → `Backend Engineer`.
pub fn title_case_role(role: &str) -> String {
    role.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_report(session: &InterviewSession) -> String {
    let mut out = String::new();
    let date = session.end_time.unwrap_or(session.start_time);
    let candidate = if session.name.trim().is_empty() {
        "N/A"
    } else {
        session.name.as_str()
    };

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Interview Report");
    let _ = writeln!(out, "================");
    let _ = writeln!(out, "Candidate: {candidate}");
    let _ = writeln!(out, "Role: {}", title_case_role(&session.role));
    let _ = writeln!(out, "Date: {}", date.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out);

    if let Some(overall) = &session.overall_evaluation {
        let _ = writeln!(out, "Overall Evaluation");
        let _ = writeln!(out, "------------------");
        let _ = writeln!(out, "Score: {}/100", overall.overall_score);
        let _ = writeln!(out, "{}", overall.feedback);
        if !overall.recommendations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Recommendations:");
            for rec in &overall.recommendations {
                let _ = writeln!(out, "  • {rec}");
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Interview Questions and Answers");
    let _ = writeln!(out, "-------------------------------");
    for (idx, qa) in session.answers.iter().enumerate() {
        let _ = writeln!(out, "Question {}: {}", idx + 1, qa.question);
        if !qa.answer.is_empty() {
            let _ = writeln!(out, "Answer: {}", qa.answer);
        }
        if !qa.feedback.feedback.is_empty() {
            let _ = writeln!(
                out,
                "Feedback ({}/100): {}",
                qa.feedback.weighted_score, qa.feedback.feedback
            );
        }
        let _ = writeln!(out);
    }

    out
}
