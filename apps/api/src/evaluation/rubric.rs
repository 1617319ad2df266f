//! Role rubrics and few-shot anchors used to score answers.

use serde::Serialize;

/// Role used whenever a session names a role the table does not know.
pub const DEFAULT_ROLE: &str = "sde";

/// One weighted scoring criterion.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Criterion {
    pub name: &'static str,
    pub weight: f64,
    pub description: &'static str,
}

/// A worked example shown to the model to anchor its scale.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FewShot {
    pub label: &'static str,
    pub question: &'static str,
    pub answer: &'static str,
    pub rationale: &'static str,
}

const fn criterion(name: &'static str, weight: f64, description: &'static str) -> Criterion {
    Criterion {
        name,
        weight,
        description,
    }
}

/// Role → weighted criteria. Weights of each role sum to 1.0.
pub const ROLE_RUBRICS: &[(&str, &[Criterion])] = &[
    (
        "cloud_engineer",
        &[
            criterion(
                "Architecture & Scalability",
                0.35,
                "Designs highly available, scalable cloud systems; tradeoffs and patterns",
            ),
            criterion(
                "Security & Reliability",
                0.25,
                "IAM, network policies, backups, monitoring, resiliency",
            ),
            criterion(
                "DevOps & Automation",
                0.20,
                "CI/CD, IaC, container orchestration, cost optimization",
            ),
            criterion(
                "Communication & Clarity",
                0.20,
                "Clear, structured explanation with relevant examples",
            ),
        ],
    ),
    (
        "backend_engineer",
        &[
            criterion(
                "System Design",
                0.35,
                "APIs, data modeling, performance, scalability, consistency tradeoffs",
            ),
            criterion(
                "Implementation Depth",
                0.25,
                "Algorithms, code structure, testing, debugging",
            ),
            criterion(
                "Databases & Storage",
                0.20,
                "SQL/NoSQL choices, indexing, transactions, caching",
            ),
            criterion(
                "Communication & Clarity",
                0.20,
                "Clarity, structure, concrete examples",
            ),
        ],
    ),
    (
        "frontend_engineer",
        &[
            criterion(
                "UI Architecture & State",
                0.30,
                "Component design, state management, routing",
            ),
            criterion(
                "Performance & Accessibility",
                0.25,
                "Perf optimizations, a11y, responsiveness",
            ),
            criterion("Web Fundamentals", 0.25, "HTML/CSS/JS/TS best practices"),
            criterion(
                "Communication & Clarity",
                0.20,
                "Structure, examples, tradeoffs",
            ),
        ],
    ),
    (
        "ui_ux_designer",
        &[
            criterion(
                "Process & Research",
                0.35,
                "User research, usability testing, insights",
            ),
            criterion(
                "Interaction & Systems",
                0.30,
                "Interaction design, design systems, consistency",
            ),
            criterion(
                "Communication & Clarity",
                0.20,
                "Narrative, rationale, constraints",
            ),
            criterion("Accessibility", 0.15, "Inclusive design considerations"),
        ],
    ),
    (
        "sde",
        &[
            criterion("Problem Solving", 0.35, "DSA, complexity, correctness"),
            criterion(
                "System Design",
                0.25,
                "Architecture, scalability, reliability",
            ),
            criterion(
                "Code Quality & Testing",
                0.20,
                "Clean code, tests, debugging",
            ),
            criterion(
                "Communication & Clarity",
                0.20,
                "Structure, examples, tradeoffs",
            ),
        ],
    ),
    (
        "data_analyst",
        &[
            criterion(
                "Data Handling & SQL",
                0.35,
                "Cleaning, joins, aggregations, correctness",
            ),
            criterion(
                "Analysis & Insight",
                0.30,
                "Reasoning from data, business impact",
            ),
            criterion(
                "Visualization & Communication",
                0.20,
                "Charts, storytelling, clarity",
            ),
            criterion("Tooling", 0.15, "Pandas/Excel/BI tools proficiency"),
        ],
    ),
    (
        "ai_engineer",
        &[
            criterion("ML Fundamentals", 0.30, "Bias/variance, metrics, validation"),
            criterion(
                "Modeling & MLOps",
                0.30,
                "Feature engineering, deployment, monitoring",
            ),
            criterion(
                "Problem Framing",
                0.20,
                "Objective, constraints, data suitability",
            ),
            criterion(
                "Communication & Clarity",
                0.20,
                "Structure, examples, tradeoffs",
            ),
        ],
    ),
];

const ROLE_FEW_SHOTS: &[(&str, &[FewShot])] = &[
    (
        "backend_engineer",
        &[
            FewShot {
                label: "Good",
                question: "How would you design a rate limiter for an API?",
                answer: "I'd use a token bucket per client with Redis for atomic counters and TTL. \
                    For burst handling, refill tokens each interval and enforce a max. \
                    I'd expose headers for remaining quota and backoff.",
                rationale: "Concrete mechanism, storage choice, headers, backoff",
            },
            FewShot {
                label: "Poor",
                question: "How would you design a rate limiter for an API?",
                answer: "I'd limit requests somehow. Maybe use a database.",
                rationale: "Vague, lacks mechanism and tradeoffs",
            },
        ],
    ),
    (
        "cloud_engineer",
        &[
            FewShot {
                label: "Good",
                question: "Design a highly available web app on AWS.",
                answer: "ALB -> ASG across AZs, RDS Multi-AZ, S3 for assets, CloudFront, \
                    IaC via Terraform, CloudWatch alarms, WAF, backups.",
                rationale: "HA patterns, services, IaC, ops",
            },
            FewShot {
                label: "Poor",
                question: "Design a highly available web app on AWS.",
                answer: "I'd use EC2. Maybe a database.",
                rationale: "No HA detail, no services, no ops",
            },
        ],
    ),
];

fn lookup<T: ?Sized>(table: &'static [(&'static str, &'static T)], role: &str) -> Option<&'static T> {
    let role = role.trim();
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(role))
        .map(|(_, value)| *value)
}

/// Returns the rubric for `role`, falling back to the generic `sde` rubric.
pub fn rubric_for(role: &str) -> &'static [Criterion] {
    lookup(ROLE_RUBRICS, role)
        .or_else(|| lookup(ROLE_RUBRICS, DEFAULT_ROLE))
        .unwrap_or(&[])
}

/// Few-shot anchors for `role`; empty for roles without curated examples.
pub fn few_shots_for(role: &str) -> &'static [FewShot] {
    lookup(ROLE_FEW_SHOTS, role).unwrap_or(&[])
}

/// Whether `role` has its own rubric (rather than the default one).
pub fn is_known_role(role: &str) -> bool {
    lookup(ROLE_RUBRICS, role).is_some()
}

/// All role keys, in table order.
pub fn available_roles() -> Vec<&'static str> {
    ROLE_RUBRICS.iter().map(|(role, _)| *role).collect()
}

/// Σ weights of a rubric.
pub fn total_weight(rubric: &[Criterion]) -> f64 {
    rubric.iter().map(|c| c.weight).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rubric_weights_sum_to_one() {
        for (role, rubric) in ROLE_RUBRICS {
            let sum = total_weight(rubric);
            assert!((sum - 1.0).abs() < 1e-6, "{role} weights sum to {sum}");
        }
    }

    #[test]
    fn test_unknown_role_falls_back_to_sde() {
        let fallback = rubric_for("astronaut");
        let sde = rubric_for("sde");
        assert_eq!(fallback.len(), sde.len());
        assert_eq!(fallback[0].name, "Problem Solving");
        assert!(!is_known_role("astronaut"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(rubric_for("Cloud_Engineer")[0].name, "Architecture & Scalability");
        assert!(is_known_role(" DATA_ANALYST "));
    }

    #[test]
    fn test_few_shots_capped_at_two() {
        for role in available_roles() {
            assert!(few_shots_for(role).len() <= 2, "{role} has too many few-shots");
        }
        assert_eq!(few_shots_for("backend_engineer").len(), 2);
        assert!(few_shots_for("sde").is_empty());
    }

    #[test]
    fn test_available_roles_in_table_order() {
        let roles = available_roles();
        assert_eq!(roles.len(), 7);
        assert_eq!(roles[0], "cloud_engineer");
        assert_eq!(roles[6], "ai_engineer");
    }

    #[test]
    fn test_criterion_names_unique_per_role() {
        for (role, rubric) in ROLE_RUBRICS {
            let mut names: Vec<_> = rubric.iter().map(|c| c.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), rubric.len(), "{role} repeats a criterion");
        }
    }
}
