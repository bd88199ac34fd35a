//! Development user registry. Users sign in by email.

use crate::models::User;
use campaign_core::{CampaignError, CampaignResult, ValidationErrors};
use chrono::Utc;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

pub struct UserDirectory {
    users: DashMap<Uuid, User>,
    /// Lower-cased email -> user id.
    emails: DashMap<String, Uuid>,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
        }
    }

    /// Register a new user. Emails are unique, ignoring case.
    pub fn register(&self, name: &str, email: &str) -> CampaignResult<User> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        let mut errors = ValidationErrors::new();
        if name.is_empty() {
            errors.add("name", "can't be blank");
        }
        if !email.contains('@') {
            errors.add("email", "is invalid");
        }
        errors.into_result()?;

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.clone(),
            created_at: Utc::now(),
        };

        // Claim the email first so two concurrent registrations cannot both win.
        match self.emails.entry(email) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(CampaignError::Conflict("email has already been taken".into()));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user.clone());
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|r| r.value().clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let id = *self.emails.get(&email.trim().to_lowercase())?.value();
        self.get(id)
    }
}
