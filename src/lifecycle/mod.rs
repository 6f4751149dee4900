//! Quote lifecycle rules.
//!
//! Everything in here is pure: the services load a quote, ask these functions
//! whether an action is allowed, and only then write. The tracking view uses
//! the same functions so the customer never sees an action the backend would
//! refuse.

pub mod rules;
pub mod status;
pub mod tracking;

use thiserror::Error;

pub use rules::Actor;
pub use status::QuoteStatus;
pub use tracking::TrackingView;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: QuoteStatus, to: QuoteStatus },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),
}
