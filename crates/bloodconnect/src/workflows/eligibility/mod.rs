//! Donor eligibility screening for the "become a donor" questionnaire.

mod domain;
mod rules;


pub use domain::{
    AgeBand, EligibilityAnswers, EligibilityIssue, HealthStatus, IssueKind, WeightBand,
};

use serde::{Deserialize, Serialize};

/// Verdict for one questionnaire submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub issues: Vec<EligibilityIssue>,
    pub score: u8,
}

impl EligibilityResult {
    pub fn disqualifying_issues(&self) -> impl Iterator<Item = &EligibilityIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.kind.is_disqualifying())
    }

    pub fn summary(&self) -> String {
        if self.eligible && self.issues.is_empty() {
            return "eligible to donate".to_string();
        }
        if self.eligible {
            return format!(
                "eligible to donate with {} advisory note(s)",
                self.issues.len()
            );
        }
        let kinds: Vec<&str> = self
            .disqualifying_issues()
            .map(|issue| issue.kind.label())
            .collect();
        format!("not eligible: {}", kinds.join(", "))
    }
}

/// Evaluate a complete answer set. Total over every combination of answers.
pub fn evaluate(answers: &EligibilityAnswers) -> EligibilityResult {
    let issues = rules::collect_issues(answers);
    let eligible = !issues.iter().any(|issue| issue.kind.is_disqualifying());
    let score = if eligible { 100 } else { rules::score(&issues) };

    EligibilityResult {
        eligible,
        issues,
        score,
    }
}
