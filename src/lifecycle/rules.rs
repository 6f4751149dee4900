use super::{LifecycleError, QuoteStatus};
use crate::payment::PaymentStatus;

pub const FEEDBACK_COMMENT_MAX: usize = 500;
pub const ADMIN_NOTES_MAX: usize = 2000;

/// Who is acting on a quote. Derived from the route, not from the token role:
/// admin routes act as `Admin`, `/users/quotes` routes act as `Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin,
    Owner,
}

/// Checks a status change for `actor`.
///
/// Order of checks: the edge must exist, the actor must be allowed to take it,
/// and acceptance needs a price on the quote.
pub fn authorize_transition(
    actor: Actor,
    from: QuoteStatus,
    to: QuoteStatus,
    estimated_cost: Option<i64>,
) -> Result<QuoteStatus, LifecycleError> {
    let next = from.transition(to)?;

    if actor == Actor::Owner && !matches!(next, QuoteStatus::Accepted | QuoteStatus::Cancelled) {
        return Err(LifecycleError::Forbidden(format!(
            "Only an administrator can move a quote to {next}"
        )));
    }

    if next == QuoteStatus::Accepted && estimated_cost.is_none() {
        return Err(LifecycleError::Validation(
            "An estimated cost is required before a quote can be accepted".into(),
        ));
    }

    Ok(next)
}

pub fn ensure_deletable(actor: Actor, status: QuoteStatus) -> Result<(), LifecycleError> {
    if actor != Actor::Owner {
        return Err(LifecycleError::Forbidden(
            "Only the owner can delete a quote".into(),
        ));
    }
    match status {
        QuoteStatus::Pending | QuoteStatus::Reviewing => Ok(()),
        other => Err(LifecycleError::Forbidden(format!(
            "A quote can only be deleted while pending or reviewing (current: {other})"
        ))),
    }
}

pub fn ensure_feedback_open(status: QuoteStatus, has_feedback: bool) -> Result<(), LifecycleError> {
    if status != QuoteStatus::Completed {
        return Err(LifecycleError::Forbidden(format!(
            "Feedback can only be left on a completed quote (current: {status})"
        )));
    }
    if has_feedback {
        return Err(LifecycleError::Conflict(
            "Feedback has already been submitted for this quote".into(),
        ));
    }
    Ok(())
}

pub fn validate_feedback(rating: i16, comment: Option<&str>) -> Result<(), LifecycleError> {
    if !(1..=5).contains(&rating) {
        return Err(LifecycleError::Validation(
            "Rating must be between 1 and 5".into(),
        ));
    }
    if comment.is_some_and(|c| c.chars().count() > FEEDBACK_COMMENT_MAX) {
        return Err(LifecycleError::Validation(format!(
            "Comment must be at most {FEEDBACK_COMMENT_MAX} characters"
        )));
    }
    Ok(())
}

pub fn ensure_payable(
    status: QuoteStatus,
    estimated_cost: Option<i64>,
    payment_status: Option<PaymentStatus>,
) -> Result<(), LifecycleError> {
    if status != QuoteStatus::Accepted {
        return Err(LifecycleError::Forbidden(format!(
            "Payment details can only be submitted for an accepted quote (current: {status})"
        )));
    }
    if estimated_cost.is_none() {
        return Err(LifecycleError::Forbidden(
            "The quote has no estimated cost yet".into(),
        ));
    }
    match payment_status {
        Some(PaymentStatus::Submitted | PaymentStatus::Paid) => Err(LifecycleError::Conflict(
            "Payment details have already been submitted".into(),
        )),
        Some(PaymentStatus::Failed) | None => Ok(()),
    }
}

pub fn validate_cost(field: &str, value: Option<i64>) -> Result<(), LifecycleError> {
    match value {
        Some(v) if v < 0 => Err(LifecycleError::Validation(format!(
            "{field} must not be negative"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_admin_notes(notes: Option<&str>) -> Result<(), LifecycleError> {
    if notes.is_some_and(|n| n.chars().count() > ADMIN_NOTES_MAX) {
        return Err(LifecycleError::Validation(format!(
            "adminNotes must be at most {ADMIN_NOTES_MAX} characters"
        )));
    }
    Ok(())
}
