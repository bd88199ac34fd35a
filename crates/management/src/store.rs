//! In-memory campaign store backed by DashMap.
//!
//! Production: replace with PostgreSQL (sqlx) or similar ACID store.
//! This provides the same API surface for development and testing.

use crate::models::*;
use campaign_core::{CampaignError, CampaignResult};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use uuid::Uuid;

/// Thread-safe in-memory campaign table.
pub struct CampaignStore {
    campaigns: DashMap<Uuid, Campaign>,
    next_position: AtomicU64,
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignStore {
    pub fn new() -> Self {
        info!("Campaign store initialized (in-memory)");
        Self {
            campaigns: DashMap::new(),
            next_position: AtomicU64::new(1),
        }
    }

    /// All campaigns, oldest first.
    pub fn list_campaigns(&self) -> Vec<Campaign> {
        let mut campaigns: Vec<Campaign> =
            self.campaigns.iter().map(|r| r.value().clone()).collect();
        campaigns.sort_by_key(|c| c.position);
        campaigns
    }

    pub fn get_campaign(&self, id: Uuid) -> Option<Campaign> {
        self.campaigns.get(&id).map(|r| r.value().clone())
    }

    pub fn count(&self) -> usize {
        self.campaigns.len()
    }

    pub fn create_campaign(&self, attrs: CampaignAttributes, owner_id: Uuid) -> Campaign {
        let now = Utc::now();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            title: attrs.title,
            goal: attrs.goal,
            owner_id,
            position: self.next_position.fetch_add(1, Ordering::SeqCst),
            created_at: now,
            updated_at: now,
        };
        self.campaigns.insert(campaign.id, campaign.clone());
        info!(campaign_id = %campaign.id, owner_id = %owner_id, "Campaign created");
        campaign
    }

    /// Merge `params` into the stored campaign and persist the result if it
    /// validates. The entry stays locked between validation and the write.
    pub fn update_campaign(&self, id: Uuid, params: &CampaignParams) -> CampaignResult<Campaign> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| CampaignError::not_found("Campaign"))?;
        let attrs = params.merged_with(entry.value()).validate()?;

        let campaign = entry.value_mut();
        campaign.title = attrs.title;
        campaign.goal = attrs.goal;
        campaign.updated_at = Utc::now();
        info!(campaign_id = %id, "Campaign updated");
        Ok(campaign.clone())
    }

    pub fn delete_campaign(&self, id: Uuid) -> bool {
        let removed = self.campaigns.remove(&id).is_some();
        if removed {
            info!(campaign_id = %id, "Campaign deleted");
        }
        removed
    }
}
