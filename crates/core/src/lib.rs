pub mod config;
pub mod error;

pub use config::{AppConfig, SessionConfig, MAX_SESSION_TTL_HOURS};
pub use error::{CampaignError, CampaignResult, FieldError, ValidationErrors};
