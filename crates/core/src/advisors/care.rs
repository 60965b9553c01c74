use serde::Serialize;

use super::{AdvisorSettings, UsageSource};
use crate::domain::interaction::UserId;
use crate::domain::item::{CareRequirement, ItemId};
use crate::recommend::RecommendationEngine;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareNotification {
    pub item_id: ItemId,
    pub care: CareRequirement,
    pub usage_intensity: f64,
    pub message: String,
}

/// Suggests care for owned items whose simulated wear crosses the threshold.
#[derive(Debug, Clone, Copy)]
pub struct CareAdvisor<'a> {
    engine: &'a RecommendationEngine,
    settings: AdvisorSettings,
}

impl<'a> CareAdvisor<'a> {
    pub fn new(engine: &'a RecommendationEngine, settings: AdvisorSettings) -> Self {
        Self { engine, settings }
    }

    /// One draw per owned interaction, taken before the care check so the
    /// sequence consumed from `usage` does not depend on the catalog.
    pub fn notifications<U>(&self, user_id: UserId, usage: &mut U) -> Vec<CareNotification>
    where
        U: UsageSource + ?Sized,
    {
        let owned =
            self.engine.interactions().owned_by(user_id, self.settings.owned_rating_threshold);
        let mut notifications = Vec::new();

        for interaction in owned {
            let usage_intensity = interaction.rating_or_zero() * usage.usage_multiplier();
            let Some(item) = self.engine.catalog().find(interaction.item_id) else {
                continue;
            };
            if !item.care_required.is_required() || usage_intensity <= self.settings.usage_threshold
            {
                continue;
            }

            notifications.push(CareNotification {
                item_id: item.id,
                care: item.care_required,
                usage_intensity,
                message: format!(
                    "Your {} {} may need {}.",
                    item.brand, item.model, item.care_required
                ),
            });
        }

        notifications
    }
}
