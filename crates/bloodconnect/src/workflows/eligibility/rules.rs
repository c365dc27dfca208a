use super::domain::{
    AgeBand, EligibilityAnswers, EligibilityIssue, HealthStatus, IssueKind, WeightBand,
};

pub(crate) const PENALTY_PER_ISSUE: u8 = 25;

fn issue(kind: IssueKind, message: &str, solution: &str) -> EligibilityIssue {
    EligibilityIssue {
        kind,
        message: message.to_string(),
        solution: solution.to_string(),
    }
}

fn age_rule(age: AgeBand) -> Option<EligibilityIssue> {
    match age {
        AgeBand::Under17 => Some(issue(
            IssueKind::Age,
            "You must be at least 17 years old to donate blood.",
            "Register as a future donor and we will remind you once you are eligible.",
        )),
        AgeBand::Over65 => Some(issue(
            IssueKind::AgeWarning,
            "Donors over 65 may need an additional health screening.",
            "Consult your doctor before booking a donation.",
        )),
        AgeBand::Adult => None,
    }
}

fn weight_rule(weight: WeightBand) -> Option<EligibilityIssue> {
    match weight {
        WeightBand::Under50 => Some(issue(
            IssueKind::Weight,
            "You must weigh at least 50 kg to donate blood safely.",
            "Keep a balanced diet and check again once you meet the weight requirement.",
        )),
        WeightBand::FiftyPlus => None,
    }
}

fn health_rule(health: HealthStatus) -> Option<EligibilityIssue> {
    match health {
        HealthStatus::Issues => Some(issue(
            IssueKind::Health,
            "Current health conditions may prevent you from donating.",
            "Speak with a healthcare professional and try again after recovery.",
        )),
        HealthStatus::Good => None,
    }
}

/// Runs every rule in questionnaire order (age, weight, health).
pub(crate) fn collect_issues(answers: &EligibilityAnswers) -> Vec<EligibilityIssue> {
    [
        age_rule(answers.age),
        weight_rule(answers.weight),
        health_rule(answers.health),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub(crate) fn score(issues: &[EligibilityIssue]) -> u8 {
    let penalties = issues
        .iter()
        .filter(|issue| issue.kind.is_disqualifying())
        .count();
    let deduction = penalties.saturating_mul(PENALTY_PER_ISSUE as usize);
    100usize.saturating_sub(deduction) as u8
}
