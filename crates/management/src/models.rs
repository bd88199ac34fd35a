//! Management domain types — users, campaigns, form input, flash messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ─── User ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// ─── Campaign ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Campaign {
    pub id: Uuid,
    pub title: String,
    pub goal: i64,
    /// Set once at creation; never rewritten by an update.
    pub owner_id: Uuid,
    /// Insertion sequence number. Index listings sort on this.
    pub position: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attributes that passed validation and may be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignAttributes {
    pub title: String,
    pub goal: i64,
}

/// A submitted goal. Anything that is not a whole number is kept as sent so
/// validation can report it and the form can show it back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GoalInput {
    Number(i64),
    Raw(serde_json::Value),
}

/// Unvalidated campaign attributes, as shown back in the `new` form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CampaignDraft {
    pub title: Option<String>,
    pub goal: Option<GoalInput>,
}

/// The `campaign` object of a create/update request body.
///
/// Each field distinguishes "absent" (`None`) from "explicitly null"
/// (`Some(None)`), so an update can clear a title.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignParams {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub goal: Option<Option<GoalInput>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CampaignParams {
    /// Candidate attributes for a brand new campaign.
    pub fn draft(&self) -> CampaignDraft {
        CampaignDraft {
            title: self.title.clone().flatten(),
            goal: self.goal.clone().flatten(),
        }
    }

    /// Candidate attributes after merging these params over `campaign`.
    pub fn merged_with(&self, campaign: &Campaign) -> CampaignDraft {
        CampaignDraft {
            title: match &self.title {
                Some(title) => title.clone(),
                None => Some(campaign.title.clone()),
            },
            goal: match &self.goal {
                Some(goal) => goal.clone(),
                None => Some(GoalInput::Number(campaign.goal)),
            },
        }
    }
}

/// Request body wrapper: `{"campaign": {...}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignPayload {
    #[serde(default)]
    pub campaign: Option<CampaignParams>,
}

// ─── Flash ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Notice,
    Alert,
}

/// One-shot message shown by the next rendered view of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Notice,
            message: message.into(),
        }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Alert,
            message: message.into(),
        }
    }
}

// ─── API Request/Response types ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
