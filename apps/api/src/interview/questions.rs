//! Fixed question bank and per-session question selection.

use crate::evaluation::rubric::DEFAULT_ROLE;
use crate::evaluation::skills::{resume_questions, SkillMatchMap};
use crate::models::session::QuestionItem;

/// Questions handed out when the caller does not ask for a specific count.
pub const DEFAULT_QUESTION_COUNT: usize = 6;
/// General questions appended after the role-specific ones.
const GENERAL_QUESTIONS_USED: usize = 3;

const ROLE_QUESTIONS: &[(&str, [&str; 8])] = &[
    (
        "cloud_engineer",
        [
            "Tell me about your experience with cloud platforms like AWS, Azure, or GCP.",
            "How would you design a highly available system in the cloud?",
            "What's your experience with containerization and orchestration tools?",
            "How do you handle security in cloud environments?",
            "Describe a time when you had to troubleshoot a production issue in the cloud.",
            "What's your experience with Infrastructure as Code tools?",
            "How do you approach cost optimization in cloud environments?",
            "Tell me about your experience with CI/CD pipelines.",
        ],
    ),
    (
        "backend_engineer",
        [
            "Tell me about your experience with backend technologies and frameworks.",
            "How would you design a scalable database architecture?",
            "What's your experience with API design and development?",
            "How do you handle data consistency in distributed systems?",
            "Describe a challenging backend problem you solved.",
            "What's your experience with microservices architecture?",
            "How do you approach performance optimization?",
            "Tell me about your experience with testing strategies.",
        ],
    ),
    (
        "frontend_engineer",
        [
            "Tell me about your experience with frontend frameworks and libraries.",
            "How do you approach responsive design and cross-browser compatibility?",
            "What's your experience with state management in frontend applications?",
            "How do you optimize frontend performance?",
            "Describe a complex UI component you built.",
            "What's your experience with modern JavaScript and TypeScript?",
            "How do you approach accessibility in web applications?",
            "Tell me about your experience with build tools and bundlers.",
        ],
    ),
    (
        "ui_ux_designer",
        [
            "Walk me through your design process from research to final design.",
            "How do you approach user research and usability testing?",
            "Tell me about a design challenge you faced and how you solved it.",
            "How do you ensure your designs are accessible and inclusive?",
            "What's your experience with design systems and component libraries?",
            "How do you collaborate with developers and product managers?",
            "Describe a project where you had to balance user needs with business requirements.",
            "What design tools and software are you most comfortable with?",
        ],
    ),
    (
        "sde",
        [
            "Tell me about your experience with data structures and algorithms.",
            "How would you approach solving a complex programming problem?",
            "Describe a time when you had to optimize code for performance.",
            "What's your experience with system design and architecture?",
            "How do you approach debugging and troubleshooting?",
            "Tell me about a challenging project you worked on.",
            "What's your experience with version control and collaboration?",
            "How do you stay updated with new technologies and best practices?",
        ],
    ),
    (
        "data_analyst",
        [
            "Tell me about your experience with data analysis and visualization tools.",
            "How do you approach cleaning and preprocessing data?",
            "Describe a time when you had to present complex data insights to stakeholders.",
            "What's your experience with SQL and database querying?",
            "How do you ensure data quality and accuracy in your analysis?",
            "Tell me about a data-driven decision you helped make.",
            "What's your experience with statistical analysis and modeling?",
            "How do you approach storytelling with data?",
        ],
    ),
    (
        "ai_engineer",
        [
            "Tell me about your experience with machine learning frameworks and libraries.",
            "How do you approach feature engineering and model selection?",
            "Describe a machine learning project you worked on from start to finish.",
            "What's your experience with deep learning and neural networks?",
            "How do you handle overfitting and model validation?",
            "Tell me about your experience with MLOps and model deployment.",
            "What's your experience with natural language processing or computer vision?",
            "How do you stay updated with the latest AI research and developments?",
        ],
    ),
];

const GENERAL_QUESTIONS: [&str; 8] = [
    "Tell me about yourself and your background.",
    "What are your greatest strengths?",
    "What areas are you looking to improve?",
    "Where do you see yourself in five years?",
    "Why are you interested in this role?",
    "Describe a challenging situation you faced at work and how you handled it.",
    "What's your experience working in teams?",
    "How do you handle stress and pressure?",
];

fn role_questions(role: &str) -> &'static [&'static str] {
    let find = |key: &str| {
        ROLE_QUESTIONS
            .iter()
            .find(|(r, _)| r.eq_ignore_ascii_case(key))
            .map(|(_, qs)| qs.as_slice())
    };
    find(role.trim()).or_else(|| find(DEFAULT_ROLE)).unwrap_or(&[])
}

/// Builds the question list for a new session.
///
/// Order: personalized resume questions (when `skills` has matches for the
/// role), then the role's questions, then the first three general questions.
/// The first `count` are returned with ids starting at 1. Each item carries
/// the role exactly as requested.
pub fn questions_for_role(role: &str, count: usize, skills: Option<&SkillMatchMap>) -> Vec<QuestionItem> {
    let personalized = skills
        .and_then(|map| {
            map.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(role.trim()))
                .map(|(_, matched)| resume_questions(matched))
        })
        .unwrap_or_default();

    personalized
        .into_iter()
        .chain(role_questions(role).iter().map(|q| q.to_string()))
        .chain(
            GENERAL_QUESTIONS[..GENERAL_QUESTIONS_USED]
                .iter()
                .map(|q| q.to_string()),
        )
        .take(count)
        .enumerate()
        .map(|(idx, question)| QuestionItem {
            id: idx as u32 + 1,
            question,
            role: role.to_string(),
        })
        .collect()
}
