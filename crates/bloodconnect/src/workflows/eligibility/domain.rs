use serde::{Deserialize, Serialize};

/// Age bracket selected on the donor questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "under-17")]
    Under17,
    #[serde(rename = "17-65")]
    Adult,
    #[serde(rename = "over-65")]
    Over65,
}

/// Body weight bracket selected on the donor questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightBand {
    #[serde(rename = "under-50")]
    Under50,
    #[serde(rename = "50-plus")]
    FiftyPlus,
}

/// Self-reported health state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthStatus {
    Good,
    Issues,
}

/// Complete answer set for one eligibility check. Every field is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityAnswers {
    pub age: AgeBand,
    pub weight: WeightBand,
    pub health: HealthStatus,
}

impl AgeBand {
    pub const fn ordered() -> [Self; 3] {
        [Self::Under17, Self::Adult, Self::Over65]
    }
}

impl WeightBand {
    pub const fn ordered() -> [Self; 2] {
        [Self::Under50, Self::FiftyPlus]
    }
}

impl HealthStatus {
    pub const fn ordered() -> [Self; 2] {
        [Self::Good, Self::Issues]
    }
}

/// Category of a finding raised while checking eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Age,
    AgeWarning,
    Weight,
    Health,
}

impl IssueKind {
    /// Warnings are informational and never reduce the score.
    pub const fn is_disqualifying(self) -> bool {
        !matches!(self, IssueKind::AgeWarning)
    }

    pub const fn label(self) -> &'static str {
        match self {
            IssueKind::Age => "age",
            IssueKind::AgeWarning => "age-warning",
            IssueKind::Weight => "weight",
            IssueKind::Health => "health",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    pub solution: String,
}
