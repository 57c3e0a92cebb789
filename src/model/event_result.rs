use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventApplyOutcome {
    Applied,
    Rejected { reason: String },
}

impl EventApplyOutcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        EventApplyOutcome::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, EventApplyOutcome::Applied)
    }
}
