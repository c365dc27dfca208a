use serde::{Deserialize, Serialize};

/// Aggregate state of the verification checklist shown to the reviewer.
///
/// Only the counts reach the workflow; the individual checks stay with the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationChecklist {
    pub total: usize,
    pub checked: usize,
}

impl VerificationChecklist {
    pub fn new(total: usize, checked: usize) -> Self {
        Self { total, checked }
    }

    pub fn complete(total: usize) -> Self {
        Self::new(total, total)
    }

    /// `checked` exceeding `total` means the counts came from different renders.
    pub fn is_consistent(&self) -> bool {
        self.checked <= self.total
    }

    pub fn is_complete(&self) -> bool {
        self.checked == self.total
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.checked)
    }
}
