use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::LifecycleError;

/// Canonical quote status. Stored as lowercase text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    EnumIter,
    DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum QuoteStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "reviewing")]
    Reviewing,
    #[sea_orm(string_value = "quoted")]
    Quoted,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 7] = [
        QuoteStatus::Pending,
        QuoteStatus::Reviewing,
        QuoteStatus::Quoted,
        QuoteStatus::Accepted,
        QuoteStatus::Rejected,
        QuoteStatus::Cancelled,
        QuoteStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Reviewing => "reviewing",
            QuoteStatus::Quoted => "quoted",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Cancelled => "cancelled",
            QuoteStatus::Completed => "completed",
        }
    }

    /// Forward edges of the lifecycle. Terminal states have none, and no
    /// state lists itself.
    pub fn next_states(&self) -> &'static [QuoteStatus] {
        use QuoteStatus::*;
        match self {
            Pending => &[Reviewing, Cancelled],
            Reviewing => &[Quoted, Accepted, Rejected, Cancelled],
            Quoted => &[Accepted, Rejected, Cancelled],
            Accepted => &[Completed, Cancelled],
            Rejected | Cancelled | Completed => &[],
        }
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        self.next_states().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }

    /// Validates a single edge, returning the target state on success.
    pub fn transition(self, next: QuoteStatus) -> Result<QuoteStatus, LifecycleError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(LifecycleError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuoteStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| LifecycleError::Validation(format!("unknown quote status '{s}'")))
    }
}
