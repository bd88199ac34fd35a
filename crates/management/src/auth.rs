//! Bearer-token sessions and the per-request `RequestContext` extractor.
//!
//! Development: sessions live in memory and any registered email may sign in.
//! Production: replace with a password/OAuth2 flow and a shared session store.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use campaign_core::{CampaignError, CampaignResult};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::handlers::ManagementState;
use crate::models::{Flash, User};

const TOKEN_PREFIX: &str = "cb_";

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    flash: Option<Flash>,
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Token -> session table.
pub struct SessionStore {
    sessions: DashMap<String, SessionRecord>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Start a session for `user_id` and return its bearer token.
    ///
    /// Sessions that have already expired are swept out first.
    pub fn create(&self, user_id: Uuid) -> CampaignResult<IssuedSession> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            CampaignError::Internal(anyhow::anyhow!("session expiry out of range"))
        })?;

        let before = self.sessions.len();
        self.sessions.retain(|_, record| record.expires_at > now);
        let swept = before.saturating_sub(self.sessions.len());
        if swept > 0 {
            debug!(swept, "Expired sessions swept");
        }

        let token = generate_token();
        self.sessions.insert(
            token.clone(),
            SessionRecord {
                user_id,
                expires_at,
                flash: None,
            },
        );
        info!(user_id = %user_id, "Session created");
        Ok(IssuedSession {
            token,
            user_id,
            expires_at,
        })
    }

    /// The user behind `token`. Expired sessions are dropped on lookup.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let user_id = {
            let record = self.sessions.get(token)?;
            if Utc::now() < record.expires_at {
                Some(record.user_id)
            } else {
                None
            }
        };
        if user_id.is_none() {
            self.sessions.remove(token);
            debug!("Expired session dropped");
        }
        user_id
    }

    /// Returns `true` when the session existed.
    pub fn revoke(&self, token: &str) -> bool {
        let removed = self.sessions.remove(token).is_some();
        if removed {
            info!("Session revoked");
        }
        removed
    }

    /// Store a flash for the next rendered view. Replaces any pending one.
    pub fn set_flash(&self, token: &str, flash: Flash) {
        if let Some(mut record) = self.sessions.get_mut(token) {
            record.flash = Some(flash);
        }
    }

    /// Remove and return the pending flash.
    pub fn take_flash(&self, token: &str) -> Option<Flash> {
        self.sessions.get_mut(token)?.flash.take()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// Generate a random bearer token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    format!("{}{}", TOKEN_PREFIX, hex::encode(bytes))
}

/// Pull the token out of an `Authorization: Bearer ...` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.starts_with(TOKEN_PREFIX) && token.len() > TOKEN_PREFIX.len() {
        Some(token)
    } else {
        None
    }
}

// ─── Request context ───────────────────────────────────────────────────────

/// A signed-in user together with the token that authenticated them.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: String,
    pub user: User,
}

/// Who is making the request. Handed explicitly to every controller call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    session: Option<SignedIn>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    pub fn signed_in(token: impl Into<String>, user: User) -> Self {
        Self {
            session: Some(SignedIn {
                token: token.into(),
                user,
            }),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// The current user, or `Unauthenticated`.
    pub fn require_user(&self) -> CampaignResult<&User> {
        self.current_user().ok_or(CampaignError::Unauthenticated)
    }
}

/// Resolve the request's bearer token into a `RequestContext`.
///
/// Anything short of a live session for a known user yields an anonymous
/// context; the controller decides whether that is acceptable.
#[async_trait]
impl FromRequestParts<ManagementState> for RequestContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ManagementState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);

        let Some(token) = token else {
            return Ok(Self::anonymous());
        };

        Ok(resolve_context(&state.sessions, &state.users, token))
    }
}

fn resolve_context(
    sessions: &Arc<SessionStore>,
    users: &Arc<crate::users::UserDirectory>,
    token: &str,
) -> RequestContext {
    match sessions.resolve(token).and_then(|id| users.get(id)) {
        Some(user) => RequestContext::signed_in(token, user),
        None => RequestContext::anonymous(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::UserDirectory;

    #[test]
    fn test_create_and_resolve_session() {
        let store = SessionStore::new(Duration::hours(1));
        let user_id = Uuid::new_v4();
        let issued = store.create(user_id).unwrap();

        assert!(issued.token.starts_with(TOKEN_PREFIX));
        assert_eq!(issued.token.len(), TOKEN_PREFIX.len() + 64);
        assert_eq!(store.resolve(&issued.token), Some(user_id));
        assert_eq!(store.resolve("cb_unknown"), None);
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let store = SessionStore::new(Duration::seconds(-1));
        let issued = store.create(Uuid::new_v4()).unwrap();
        assert_eq!(store.resolve(&issued.token), None);
        assert!(!store.revoke(&issued.token));
    }

    #[test]
    fn test_create_sweeps_expired_sessions() {
        let expired = SessionStore::new(Duration::seconds(-1));
        for _ in 0..5 {
            expired.create(Uuid::new_v4()).unwrap();
        }
        // Each sign-in clears the ones issued before it.
        assert_eq!(expired.len(), 1);

        let store = SessionStore::new(Duration::hours(1));
        let live = store.create(Uuid::new_v4()).unwrap();
        store.create(Uuid::new_v4()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.resolve(&live.token).is_some());
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        let store = SessionStore::new(Duration::days(365 * 1_000_000));
        let err = store.create(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, CampaignError::Internal(_)));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_revoke_session() {
        let store = SessionStore::new(Duration::hours(1));
        let issued = store.create(Uuid::new_v4()).unwrap();
        assert!(store.revoke(&issued.token));
        assert_eq!(store.resolve(&issued.token), None);
        assert!(!store.revoke(&issued.token));
    }

    #[test]
    fn test_flash_is_one_shot() {
        let store = SessionStore::new(Duration::hours(1));
        let issued = store.create(Uuid::new_v4()).unwrap();

        store.set_flash(&issued.token, Flash::alert("stale"));
        store.set_flash(&issued.token, Flash::notice("Campaign created"));
        assert_eq!(
            store.take_flash(&issued.token),
            Some(Flash::notice("Campaign created"))
        );
        assert_eq!(store.take_flash(&issued.token), None);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer cb_abc"), Some("cb_abc"));
        assert_eq!(bearer_token("Bearer cb_"), None);
        assert_eq!(bearer_token("Bearer other"), None);
        assert_eq!(bearer_token("Basic cb_abc"), None);
    }

    #[test]
    fn test_resolve_context_requires_known_user() {
        let sessions = Arc::new(SessionStore::new(Duration::hours(1)));
        let users = Arc::new(UserDirectory::new());

        let ghost = sessions.create(Uuid::new_v4()).unwrap();
        assert!(resolve_context(&sessions, &users, &ghost.token)
            .current_user()
            .is_none());

        let user = users.register("Ada", "ada@example.com").unwrap();
        let issued = sessions.create(user.id).unwrap();
        let ctx = resolve_context(&sessions, &users, &issued.token);
        assert_eq!(ctx.current_user().map(|u| u.id), Some(user.id));
        assert_eq!(ctx.token(), Some(issued.token.as_str()));
        assert!(ctx.require_user().is_ok());
        assert!(RequestContext::anonymous().require_user().is_err());
    }
}
