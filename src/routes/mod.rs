use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod doc;
pub mod feedback;
pub mod health;
pub mod messages;
pub mod params;
pub mod quotes;
pub mod users;

// State is attached by the caller so tests can mount the same tree.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/quotes", quotes::router())
        .nest("/users", users::router())
        .nest("/feedback", feedback::router())
        .nest("/enquiries", messages::enquiries_router())
        .nest("/contacts", messages::contacts_router())
        .nest("/admin", admin::router())
}
