//! Resume skill extraction: plain keyword containment per role.
//!
//! Matching is substring-based on lower-cased text, not tokenized, so short
//! keywords ("go", "r") also hit inside longer words. That keeps the signal
//! generous; it only orders questions and suggests a starting role.

use indexmap::IndexMap;

use crate::evaluation::rubric::DEFAULT_ROLE;

/// Role → matched keywords, in keyword-table order.
pub type SkillMatchMap = IndexMap<String, Vec<String>>;

/// Personalized questions generated from a resume, at most.
pub const MAX_RESUME_QUESTIONS: usize = 3;

const RESUME_SKILL_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "cloud_engineer",
        &[
            "aws", "azure", "gcp", "kubernetes", "docker", "terraform", "ansible", "jenkins",
            "ci/cd", "microservices", "serverless", "lambda", "ec2", "s3", "rds", "vpc",
            "cloudformation", "elasticsearch", "redis",
        ],
    ),
    (
        "backend_engineer",
        &[
            "python", "java", "node.js", "go", "c++", "c#", "spring", "django", "flask",
            "express", "postgresql", "mysql", "mongodb", "redis", "kafka", "rabbitmq",
            "rest api", "graphql", "microservices", "docker",
        ],
    ),
    (
        "frontend_engineer",
        &[
            "javascript", "typescript", "react", "vue", "angular", "html", "css", "sass",
            "webpack", "babel", "redux", "vuex", "next.js", "nuxt.js", "responsive design",
            "accessibility", "seo", "pwa",
        ],
    ),
    (
        "ui_ux_designer",
        &[
            "figma", "sketch", "adobe xd", "invision", "prototyping", "wireframing",
            "user research", "usability testing", "design systems", "typography",
            "color theory", "interaction design", "information architecture",
        ],
    ),
    (
        "sde",
        &[
            "data structures", "algorithms", "leetcode", "system design",
            "distributed systems", "python", "java", "c++", "javascript", "sql", "nosql",
            "git", "agile", "scrum",
        ],
    ),
    (
        "data_analyst",
        &[
            "sql", "python", "r", "excel", "tableau", "power bi", "pandas", "numpy",
            "matplotlib", "seaborn", "statistics", "machine learning", "data visualization",
            "etl", "data warehousing", "business intelligence",
        ],
    ),
    (
        "ai_engineer",
        &[
            "python", "tensorflow", "pytorch", "scikit-learn", "keras", "numpy", "pandas",
            "machine learning", "deep learning", "neural networks", "nlp", "computer vision",
            "reinforcement learning", "mlops", "model deployment", "data preprocessing",
        ],
    ),
];

/// Scans `text` for every role's keywords. Every role appears in the result,
/// possibly with an empty list.
pub fn extract_resume_skills(text: &str) -> SkillMatchMap {
    let lower = text.to_lowercase();
    RESUME_SKILL_KEYWORDS
        .iter()
        .map(|(role, keywords)| {
            let found = keywords
                .iter()
                .filter(|kw| lower.contains(&kw.to_lowercase()))
                .map(|kw| kw.to_string())
                .collect();
            (role.to_string(), found)
        })
        .collect()
}

/// Role with the most matches. Ties go to the earliest role; no matches at all yields `sde`.
pub fn suggest_role(skills: &SkillMatchMap) -> String {
    let mut best: Option<(&str, usize)> = None;
    for (role, found) in skills {
        if found.is_empty() {
            continue;
        }
        if best.map_or(true, |(_, score)| found.len() > score) {
            best = Some((role.as_str(), found.len()));
        }
    }
    best.map(|(role, _)| role)
        .unwrap_or(DEFAULT_ROLE)
        .to_string()
}

/// "Tell me about a project using X" prompts for the first three matched skills.
pub fn resume_questions(skills_for_role: &[String]) -> Vec<String> {
    skills_for_role
        .iter()
        .take(MAX_RESUME_QUESTIONS)
        .map(|skill| {
            format!(
                "You mentioned {skill} in your resume. Can you describe a project where you applied {skill} and the impact it had?"
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_keywords_found() {
        let skills = extract_resume_skills("I used AWS and Terraform daily");
        let cloud = &skills["cloud_engineer"];
        assert!(cloud.contains(&"aws".to_string()));
        assert!(cloud.contains(&"terraform".to_string()));
    }

    #[test]
    fn test_every_role_present() {
        let skills = extract_resume_skills("");
        assert_eq!(skills.len(), RESUME_SKILL_KEYWORDS.len());
        assert!(skills.values().all(|v| v.is_empty()));
    }

    #[test]
    fn test_matches_follow_keyword_order() {
        let skills = extract_resume_skills("Redis, Docker and Kubernetes on AWS");
        assert_eq!(
            skills["cloud_engineer"],
            vec!["aws", "kubernetes", "docker", "redis"]
        );
    }

    #[test]
    fn test_substring_matching_is_not_tokenized() {
        // "go" hits inside "google"; "r" hits nearly anything.
        let skills = extract_resume_skills("Worked at Google");
        assert!(skills["backend_engineer"].contains(&"go".to_string()));
        assert!(skills["data_analyst"].contains(&"r".to_string()));
    }

    #[test]
    fn test_suggest_role_picks_most_matches() {
        let mut skills = SkillMatchMap::new();
        skills.insert(
            "cloud_engineer".to_string(),
            vec!["aws".to_string(), "docker".to_string()],
        );
        skills.insert("sde".to_string(), vec![]);
        assert_eq!(suggest_role(&skills), "cloud_engineer");
    }

    #[test]
    fn test_suggest_role_tie_goes_to_first() {
        let mut skills = SkillMatchMap::new();
        skills.insert("data_analyst".to_string(), vec!["sql".to_string()]);
        skills.insert("sde".to_string(), vec!["git".to_string()]);
        assert_eq!(suggest_role(&skills), "data_analyst");
    }

    #[test]
    fn test_suggest_role_defaults_to_sde() {
        assert_eq!(suggest_role(&SkillMatchMap::new()), "sde");
    }

    #[test]
    fn test_suggest_role_without_matches_is_sde() {
        let skills = extract_resume_skills("");
        assert_eq!(suggest_role(&skills), "sde");
    }

    #[test]
    fn test_resume_questions_capped_at_three() {
        let found: Vec<String> = ["aws", "docker", "terraform", "redis"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let questions = resume_questions(&found);
        assert_eq!(questions.len(), 3);
        assert!(questions[0].starts_with("You mentioned aws in your resume."));
        assert!(questions[2].contains("terraform"));
    }
}
