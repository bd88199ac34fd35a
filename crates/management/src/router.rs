//! Campaign board router — pages, sessions, users and the campaign resource.

use crate::handlers::{self, ManagementState};
use axum::routing::{get, post};
use axum::Router;

/// Build the router with all endpoints.
/// Returns a Router that should be merged into the main app.
pub fn management_router(state: ManagementState) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::home))
        // Sessions & users
        .route("/session/new", get(handlers::login_form))
        .route("/session", post(handlers::handle_login).delete(handlers::handle_logout))
        .route("/users", post(handlers::register_user))
        // Campaigns
        .route("/campaigns", get(handlers::list_campaigns).post(handlers::create_campaign))
        .route("/campaigns/new", get(handlers::new_campaign))
        .route(
            "/campaigns/:id",
            get(handlers::get_campaign)
                .patch(handlers::update_campaign)
                .put(handlers::update_campaign)
                .delete(handlers::delete_campaign),
        )
        .route("/campaigns/:id/edit", get(handlers::edit_campaign))
        .with_state(state)
}
