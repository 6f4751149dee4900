use serde::Serialize;
use utoipa::ToSchema;

use super::{
    QuoteStatus,
    rules::{self, Actor},
};
use crate::models::Quote;

/// Statuses shown on the customer progress bar, in order. Rejected and
/// cancelled are reported through the banner instead.
pub const PROGRESS_STEPS: [QuoteStatus; 5] = [
    QuoteStatus::Pending,
    QuoteStatus::Reviewing,
    QuoteStatus::Quoted,
    QuoteStatus::Accepted,
    QuoteStatus::Completed,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Done,
    Current,
    Upcoming,
    Skipped,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStep {
    pub status: QuoteStatus,
    pub label: &'static str,
    pub state: StepState,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub status: QuoteStatus,
    pub title: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteActions {
    pub can_delete: bool,
    pub can_cancel: bool,
    pub can_accept: bool,
    pub can_pay: bool,
    pub can_leave_feedback: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub tracking_code: String,
    pub status: QuoteStatus,
    pub steps: Vec<ProgressStep>,
    pub banner: Option<Banner>,
    pub actions: QuoteActions,
}

impl TrackingView {
    /// Projects a quote onto what the owner sees. `has_feedback` comes from
    /// the feedbacks table.
    pub fn project(quote: &Quote, has_feedback: bool) -> Self {
        Self {
            tracking_code: quote.tracking_code.clone(),
            status: quote.status,
            steps: progress_steps(quote.status),
            banner: banner(quote),
            actions: owner_actions(quote, has_feedback),
        }
    }
}

fn label(status: QuoteStatus) -> &'static str {
    match status {
        QuoteStatus::Pending => "Request received",
        QuoteStatus::Reviewing => "Under review",
        QuoteStatus::Quoted => "Price proposed",
        QuoteStatus::Accepted => "Confirmed",
        QuoteStatus::Completed => "Move completed",
        QuoteStatus::Rejected => "Rejected",
        QuoteStatus::Cancelled => "Cancelled",
    }
}

pub fn progress_steps(status: QuoteStatus) -> Vec<ProgressStep> {
    let current = PROGRESS_STEPS.iter().position(|s| *s == status);
    PROGRESS_STEPS
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            let state = match current {
                // A completed move has nothing left to wait for.
                Some(pos) if idx == pos && status == QuoteStatus::Completed => StepState::Done,
                // Earlier steps count as done only when every route here passes them.
                Some(pos) if idx < pos && reachable_avoiding(status, *step) => StepState::Skipped,
                Some(pos) if idx < pos => StepState::Done,
                Some(pos) if idx == pos => StepState::Current,
                Some(_) => StepState::Upcoming,
                // Rejected or cancelled: only the request itself happened for sure.
                None if idx == 0 => StepState::Done,
                None => StepState::Skipped,
            };
            ProgressStep {
                status: *step,
                label: label(*step),
                state,
            }
        })
        .collect()
}

/// Whether `target` can be reached from pending without visiting `avoid`.
fn reachable_avoiding(target: QuoteStatus, avoid: QuoteStatus) -> bool {
    let mut stack = vec![QuoteStatus::Pending];
    let mut seen = Vec::new();
    while let Some(status) = stack.pop() {
        if status == avoid || seen.contains(&status) {
            continue;
        }
        if status == target {
            return true;
        }
        seen.push(status);
        stack.extend_from_slice(status.next_states());
    }
    false
}

fn banner(quote: &Quote) -> Option<Banner> {
    let (title, fallback) = match quote.status {
        QuoteStatus::Cancelled => ("Quote cancelled", "This quote has been cancelled."),
        QuoteStatus::Rejected => (
            "Quote rejected",
            "We are unable to take on this move. Please contact support for details.",
        ),
        _ => return None,
    };
    let message = quote
        .admin_notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(fallback)
        .to_string();
    Some(Banner {
        status: quote.status,
        title,
        message,
    })
}

pub fn owner_actions(quote: &Quote, has_feedback: bool) -> QuoteActions {
    let status = quote.status;
    QuoteActions {
        can_delete: rules::ensure_deletable(Actor::Owner, status).is_ok(),
        can_cancel: rules::authorize_transition(
            Actor::Owner,
            status,
            QuoteStatus::Cancelled,
            quote.estimated_cost,
        )
        .is_ok(),
        can_accept: rules::authorize_transition(
            Actor::Owner,
            status,
            QuoteStatus::Accepted,
            quote.estimated_cost,
        )
        .is_ok(),
        can_pay: rules::ensure_payable(status, quote.estimated_cost, quote.payment_status).is_ok(),
        can_leave_feedback: rules::ensure_feedback_open(status, has_feedback).is_ok(),
    }
}
