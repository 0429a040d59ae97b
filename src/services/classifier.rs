//! Classifier — does a user message concern AWS RDS deployment?
//!
//! Plain lower-cased substring containment against a fixed keyword list.
//! No word boundaries: "clients" matches "cli".

/// Keywords covering RDS product names, engines, networking and operational
/// terms, and deployment tooling. All lower case.
pub const RDS_KEYWORDS: &[&str] = &[
    "aws",
    "rds",
    "amazon rds",
    "relational database service",
    "database",
    "mysql",
    "postgresql",
    "oracle",
    "sql server",
    "mariadb",
    "aurora",
    "db instance",
    "database instance",
    "vpc",
    "subnet group",
    "security group",
    "parameter group",
    "option group",
    "backup",
    "snapshot",
    "restore",
    "multi-az",
    "read replica",
    "endpoint",
    "connection string",
    "deploy",
    "deployment",
    "setup",
    "configure",
    "installation",
    "cloudformation",
    "terraform",
    "cdk",
    "cli",
    "console",
];

/// `true` when `text` mentions any RDS keyword, case-insensitively.
#[must_use]
pub fn classify(text: &str) -> bool {
    matched_keyword(text).is_some()
}

/// First keyword (in list order) contained in `text`.
#[must_use]
pub fn matched_keyword(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    RDS_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
