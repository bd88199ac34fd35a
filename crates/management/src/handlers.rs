//! Axum REST handlers for the campaign board.

use crate::auth::{RequestContext, SessionStore};
use crate::controller::{self, CampaignsController, Outcome, View};
use crate::models::*;
use crate::store::CampaignStore;
use crate::users::UserDirectory;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use campaign_core::{CampaignError, CampaignResult, SessionConfig};
use serde::Serialize;
use std::sync::Arc;
use chrono::Duration;
use tracing::{error, warn};

/// Shared management state.
#[derive(Clone)]
pub struct ManagementState {
    pub store: Arc<CampaignStore>,
    pub users: Arc<UserDirectory>,
    pub sessions: Arc<SessionStore>,
}

impl ManagementState {
    pub fn new(config: &SessionConfig) -> CampaignResult<Self> {
        config.validate()?;
        let ttl = Duration::try_hours(config.ttl_hours).ok_or_else(|| {
            CampaignError::Config(format!("session ttl of {} hours", config.ttl_hours))
        })?;
        Ok(Self {
            store: Arc::new(CampaignStore::new()),
            users: Arc::new(UserDirectory::new()),
            sessions: Arc::new(SessionStore::new(ttl)),
        })
    }

    pub fn campaigns(&self) -> CampaignsController {
        CampaignsController::new(self.store.clone())
    }
}

/// JSON body of a rendered view.
#[derive(Serialize)]
struct RenderedView {
    #[serde(flatten)]
    view: View,
    flash: Option<Flash>,
}

fn render(
    state: &ManagementState,
    ctx: &RequestContext,
    status: StatusCode,
    view: View,
) -> Response {
    let flash = ctx.token().and_then(|token| state.sessions.take_flash(token));
    (status, Json(RenderedView { view, flash })).into_response()
}

fn error_body(status: StatusCode, err: &CampaignError, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: err.code().to_string(),
            message,
        }),
    )
        .into_response()
}

/// Map a controller result onto an HTTP response.
fn respond(
    state: &ManagementState,
    ctx: &RequestContext,
    result: CampaignResult<Outcome>,
) -> Response {
    match result {
        Ok(Outcome::Render(view)) => render(state, ctx, StatusCode::OK, view),
        Ok(Outcome::Invalid(view)) => render(state, ctx, StatusCode::UNPROCESSABLE_ENTITY, view),
        Ok(Outcome::Redirect { location, flash }) => {
            if let (Some(token), Some(flash)) = (ctx.token(), flash) {
                state.sessions.set_flash(token, flash);
            }
            Redirect::to(&location).into_response()
        }
        Err(err) => error_response(state, ctx, err),
    }
}

fn error_response(state: &ManagementState, ctx: &RequestContext, err: CampaignError) -> Response {
    match err {
        CampaignError::Unauthenticated => {
            metrics::counter!("management.auth.unauthenticated").increment(1);
            Redirect::to(controller::LOGIN_PATH).into_response()
        }
        CampaignError::Unauthorized => {
            metrics::counter!("management.auth.forbidden").increment(1);
            if let Some(token) = ctx.token() {
                state
                    .sessions
                    .set_flash(token, Flash::alert("You are not authorized to do that."));
            }
            Redirect::to(controller::HOME_PATH).into_response()
        }
        CampaignError::Validation(ref errors) => {
            let message = errors.to_string();
            error_body(StatusCode::UNPROCESSABLE_ENTITY, &err, message)
        }
        CampaignError::NotFound(_) => {
            let message = err.to_string();
            error_body(StatusCode::NOT_FOUND, &err, message)
        }
        CampaignError::BadRequest(ref msg) => {
            let message = msg.clone();
            error_body(StatusCode::BAD_REQUEST, &err, message)
        }
        CampaignError::Conflict(ref msg) => {
            let message = msg.clone();
            error_body(StatusCode::CONFLICT, &err, message)
        }
        other => {
            error!(error = %other, "Request failed");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                &other,
                "Internal server error".to_string(),
            )
        }
    }
}

/// Decode the `campaign` object of a request body.
///
/// A body with no JSON content type or no `campaign` key is a missing
/// param. A malformed body is a bad request. Wrongly typed attributes decode
/// fine and are reported by validation.
fn params(payload: Result<Json<CampaignPayload>, JsonRejection>) -> CampaignResult<CampaignParams> {
    match payload {
        Ok(Json(body)) => body.campaign.ok_or_else(controller::missing_params),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(controller::missing_params()),
        Err(rejection) => Err(CampaignError::BadRequest(rejection.body_text())),
    }
}

// ─── Pages ─────────────────────────────────────────────────────────────────

pub async fn home(State(state): State<ManagementState>, ctx: RequestContext) -> Response {
    render(&state, &ctx, StatusCode::OK, View::Home)
}

pub async fn login_form(State(state): State<ManagementState>, ctx: RequestContext) -> Response {
    render(&state, &ctx, StatusCode::OK, View::Login)
}

// ─── Sessions & users ──────────────────────────────────────────────────────

pub async fn handle_login(
    State(state): State<ManagementState>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), (StatusCode, Json<ErrorResponse>)> {
    match state.users.find_by_email(&req.email) {
        Some(user) => {
            let issued = state.sessions.create(user.id).map_err(|err| {
                error!(error = %err, "Session could not be issued");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: err.code().to_string(),
                        message: "Internal server error".to_string(),
                    }),
                )
            })?;
            metrics::counter!("management.logins").increment(1);
            Ok((
                StatusCode::CREATED,
                Json(LoginResponse {
                    token: issued.token,
                    user_id: issued.user_id,
                    expires_at: issued.expires_at,
                }),
            ))
        }
        None => {
            warn!("Login attempt for unknown email");
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "auth_failed".to_string(),
                    message: "Invalid credentials".to_string(),
                }),
            ))
        }
    }
}

pub async fn handle_logout(
    State(state): State<ManagementState>,
    ctx: RequestContext,
) -> StatusCode {
    if let Some(token) = ctx.token() {
        state.sessions.revoke(token);
    }
    StatusCode::NO_CONTENT
}

pub async fn register_user(
    State(state): State<ManagementState>,
    ctx: RequestContext,
    Json(req): Json<RegisterUserRequest>,
) -> Response {
    match state.users.register(&req.name, &req.email) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => error_response(&state, &ctx, err),
    }
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn list_campaigns(
    State(state): State<ManagementState>,
    ctx: RequestContext,
) -> Response {
    let outcome = state.campaigns().index();
    respond(&state, &ctx, Ok(outcome))
}

pub async fn new_campaign(State(state): State<ManagementState>, ctx: RequestContext) -> Response {
    let result = state.campaigns().new_form(&ctx);
    respond(&state, &ctx, result)
}

pub async fn create_campaign(
    State(state): State<ManagementState>,
    ctx: RequestContext,
    payload: Result<Json<CampaignPayload>, JsonRejection>,
) -> Response {
    let result = state.campaigns().create(&ctx, params(payload));
    respond(&state, &ctx, result)
}

pub async fn get_campaign(
    State(state): State<ManagementState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Response {
    let result = controller::parse_campaign_id(&id).and_then(|id| state.campaigns().show(id));
    respond(&state, &ctx, result)
}

pub async fn edit_campaign(
    State(state): State<ManagementState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Response {
    let result = ctx
        .require_user()
        .and_then(|_| controller::parse_campaign_id(&id))
        .and_then(|id| state.campaigns().edit(&ctx, id));
    respond(&state, &ctx, result)
}

pub async fn update_campaign(
    State(state): State<ManagementState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    payload: Result<Json<CampaignPayload>, JsonRejection>,
) -> Response {
    let result = ctx
        .require_user()
        .and_then(|_| controller::parse_campaign_id(&id))
        .and_then(|id| state.campaigns().update(&ctx, id, params(payload)));
    respond(&state, &ctx, result)
}

pub async fn delete_campaign(
    State(state): State<ManagementState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Response {
    let result = ctx
        .require_user()
        .and_then(|_| controller::parse_campaign_id(&id))
        .and_then(|id| state.campaigns().destroy(&ctx, id));
    respond(&state, &ctx, result)
}
