//! Ownership policy for campaigns.

use campaign_core::{CampaignError, CampaignResult};

use crate::models::{Campaign, User};

/// Only a campaign's owner may edit, update or delete it.
pub fn can_manage(campaign: &Campaign, user: &User) -> bool {
    campaign.owner_id == user.id
}

pub fn authorize_owner(campaign: &Campaign, user: &User) -> CampaignResult<()> {
    if can_manage(campaign, user) {
        Ok(())
    } else {
        Err(CampaignError::Unauthorized)
    }
}
