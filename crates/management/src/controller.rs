//! Campaign resource handler: the seven CRUD actions.
//!
//! Every action receives the caller's [`RequestContext`] explicitly and
//! returns an [`Outcome`] (render, re-render, redirect) or a
//! [`CampaignError`]. Nothing in here knows about HTTP; the axum adapter in
//! `handlers` turns outcomes and errors into responses.

use std::sync::Arc;

use campaign_core::{CampaignError, CampaignResult, ValidationErrors};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::RequestContext;
use crate::models::{Campaign, CampaignDraft, CampaignParams, Flash};
use crate::policy;
use crate::store::CampaignStore;

pub const LOGIN_PATH: &str = "/session/new";
pub const HOME_PATH: &str = "/";
pub const CAMPAIGNS_PATH: &str = "/campaigns";

pub fn campaign_path(id: Uuid) -> String {
    format!("{CAMPAIGNS_PATH}/{id}")
}

/// An id that does not parse cannot name a campaign.
pub fn parse_campaign_id(raw: &str) -> CampaignResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| CampaignError::not_found("Campaign"))
}

/// A template plus the data assigned to it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum View {
    New {
        campaign: CampaignDraft,
        errors: ValidationErrors,
    },
    Show {
        campaign: Campaign,
    },
    Index {
        campaigns: Vec<Campaign>,
    },
    Edit {
        campaign: Campaign,
        errors: ValidationErrors,
    },
    Home,
    Login,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Render(View),
    /// The originating form, shown again because its input was rejected.
    Invalid(View),
    Redirect {
        location: String,
        flash: Option<Flash>,
    },
}

impl Outcome {
    fn redirect(location: impl Into<String>, flash: Flash) -> Self {
        Self::Redirect {
            location: location.into(),
            flash: Some(flash),
        }
    }
}

/// A request body without a `campaign` object.
pub fn missing_params() -> CampaignError {
    CampaignError::BadRequest("param is missing or the value is empty: campaign".into())
}

#[derive(Clone)]
pub struct CampaignsController {
    store: Arc<CampaignStore>,
}

impl CampaignsController {
    pub fn new(store: Arc<CampaignStore>) -> Self {
        Self { store }
    }

    /// GET /campaigns/new
    pub fn new_form(&self, ctx: &RequestContext) -> CampaignResult<Outcome> {
        ctx.require_user()?;
        Ok(Outcome::Render(View::New {
            campaign: CampaignDraft::default(),
            errors: ValidationErrors::new(),
        }))
    }

    /// POST /campaigns
    ///
    /// `params` is the decoded request body; a body that failed to decode is
    /// only reported once the caller is known to be signed in.
    pub fn create(
        &self,
        ctx: &RequestContext,
        params: CampaignResult<CampaignParams>,
    ) -> CampaignResult<Outcome> {
        let user = ctx.require_user()?;
        let draft = params?.draft();

        match draft.validate() {
            Ok(attrs) => {
                let campaign = self.store.create_campaign(attrs, user.id);
                metrics::counter!("management.campaigns.created").increment(1);
                Ok(Outcome::redirect(
                    campaign_path(campaign.id),
                    Flash::notice("Campaign created successfully."),
                ))
            }
            Err(errors) => {
                warn!(user_id = %user.id, errors = %errors, "Campaign create rejected");
                metrics::counter!("management.validation_errors").increment(1);
                Ok(Outcome::Invalid(View::New {
                    campaign: draft,
                    errors,
                }))
            }
        }
    }

    /// GET /campaigns/{id}
    pub fn show(&self, id: Uuid) -> CampaignResult<Outcome> {
        let campaign = self.find(id)?;
        Ok(Outcome::Render(View::Show { campaign }))
    }

    /// GET /campaigns
    pub fn index(&self) -> Outcome {
        Outcome::Render(View::Index {
            campaigns: self.store.list_campaigns(),
        })
    }

    /// GET /campaigns/{id}/edit
    pub fn edit(&self, ctx: &RequestContext, id: Uuid) -> CampaignResult<Outcome> {
        let campaign = self.find_managed(ctx, id)?;
        Ok(Outcome::Render(View::Edit {
            campaign,
            errors: ValidationErrors::new(),
        }))
    }

    /// PATCH /campaigns/{id}
    pub fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        params: CampaignResult<CampaignParams>,
    ) -> CampaignResult<Outcome> {
        let campaign = self.find_managed(ctx, id)?;
        let params = params?;

        match self.store.update_campaign(id, &params) {
            Ok(updated) => {
                metrics::counter!("management.campaigns.updated").increment(1);
                Ok(Outcome::redirect(
                    campaign_path(updated.id),
                    Flash::notice("Campaign updated successfully."),
                ))
            }
            Err(CampaignError::Validation(errors)) => {
                warn!(campaign_id = %id, errors = %errors, "Campaign update rejected");
                metrics::counter!("management.validation_errors").increment(1);
                // Nothing was written, so `campaign` is still the stored state.
                Ok(Outcome::Invalid(View::Edit { campaign, errors }))
            }
            Err(other) => Err(other),
        }
    }

    /// DELETE /campaigns/{id}
    pub fn destroy(&self, ctx: &RequestContext, id: Uuid) -> CampaignResult<Outcome> {
        self.find_managed(ctx, id)?;
        if !self.store.delete_campaign(id) {
            return Err(CampaignError::not_found("Campaign"));
        }
        metrics::counter!("management.campaigns.deleted").increment(1);
        Ok(Outcome::redirect(
            CAMPAIGNS_PATH,
            Flash::notice("Campaign deleted."),
        ))
    }

    fn find(&self, id: Uuid) -> CampaignResult<Campaign> {
        self.store
            .get_campaign(id)
            .ok_or_else(|| CampaignError::not_found("Campaign"))
    }

    /// Signed in, campaign exists, and the caller owns it: in that order.
    fn find_managed(&self, ctx: &RequestContext, id: Uuid) -> CampaignResult<Campaign> {
        let user = ctx.require_user()?;
        let campaign = self.find(id)?;
        if let Err(err) = policy::authorize_owner(&campaign, user) {
            info!(campaign_id = %id, user_id = %user.id, "Campaign access denied");
            return Err(err);
        }
        Ok(campaign)
    }
}
