//! Campaign attribute validation.

use campaign_core::ValidationErrors;

use crate::models::{CampaignAttributes, CampaignDraft, GoalInput};

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 255;

impl CampaignDraft {
    /// Check the draft and turn it into attributes that may be persisted.
    ///
    /// The title is trimmed; a missing or empty goal counts as `0`. A goal
    /// sent as a numeric string is accepted.
    pub fn validate(&self) -> Result<CampaignAttributes, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            errors.add("title", "can't be blank");
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.add(
                "title",
                format!("is too long (maximum is {MAX_TITLE_LEN} characters)"),
            );
        }

        let goal = match goal_value(self.goal.as_ref()) {
            Ok(goal) => goal,
            Err(message) => {
                errors.add("goal", message);
                0
            }
        };
        if goal < 0 {
            errors.add("goal", "must be greater than or equal to 0");
        }

        errors.into_result()?;
        Ok(CampaignAttributes {
            title: title.to_string(),
            goal,
        })
    }
}

fn goal_value(goal: Option<&GoalInput>) -> Result<i64, &'static str> {
    match goal {
        None => Ok(0),
        Some(GoalInput::Number(goal)) => Ok(*goal),
        Some(GoalInput::Raw(serde_json::Value::String(raw))) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(0);
            }
            raw.parse().map_err(|_| "is not a number")
        }
        Some(GoalInput::Raw(serde_json::Value::Number(_))) => Err("must be an integer"),
        Some(GoalInput::Raw(_)) => Err("is not a number"),
    }
}
