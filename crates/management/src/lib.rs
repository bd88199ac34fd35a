//! Campaign board backend — campaign CRUD gated by sign-in and ownership.
//!
//! Provides the campaign resource handler, its ownership policy, and the
//! REST endpoints around it. Data stored in DashMap (development); swap to
//! PostgreSQL for production.

pub mod auth;
pub mod controller;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod router;
pub mod store;
pub mod users;
pub mod validation;

pub use auth::{RequestContext, SessionStore};
pub use controller::{CampaignsController, Outcome, View};
pub use handlers::ManagementState;
pub use router::management_router;
pub use store::CampaignStore;
pub use users::UserDirectory;
