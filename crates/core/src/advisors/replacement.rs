use serde::Serialize;

use super::{AdvisorSettings, UsageSource};
use crate::domain::interaction::UserId;
use crate::domain::item::ItemId;
use crate::recommend::{validate_alpha, Recommendation, RecommendResult, RecommendationEngine};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplacementSuggestion {
    pub item_id: ItemId,
    pub days_in_use: u32,
    pub remaining_days: i64,
    pub replacement: Recommendation,
    pub message: String,
}

/// Flags owned items near the end of their expected life and proposes the
/// user's current top recommendation as a replacement.
#[derive(Debug, Clone, Copy)]
pub struct ReplacementAdvisor<'a> {
    engine: &'a RecommendationEngine,
    settings: AdvisorSettings,
}

impl<'a> ReplacementAdvisor<'a> {
    pub fn new(
        engine: &'a RecommendationEngine,
        settings: AdvisorSettings,
    ) -> RecommendResult<Self> {
        validate_alpha(settings.alpha)?;
        Ok(Self { engine, settings })
    }

    pub fn expected_life_days(&self, is_running: bool) -> u32 {
        if is_running {
            self.settings.running_life_days
        } else {
            self.settings.default_life_days
        }
    }

    pub fn suggestions<U>(
        &self,
        user_id: UserId,
        usage: &mut U,
    ) -> RecommendResult<Vec<ReplacementSuggestion>>
    where
        U: UsageSource + ?Sized,
    {
        let owned =
            self.engine.interactions().owned_by(user_id, self.settings.owned_rating_threshold);
        // The top pick is the same for every worn-out item, so rank at most once.
        let mut top_pick: Option<Option<Recommendation>> = None;
        let mut suggestions = Vec::new();

        for interaction in owned {
            let days_in_use = usage.days_in_use();
            let Some(item) = self.engine.catalog().find(interaction.item_id) else {
                continue;
            };

            let remaining_days =
                i64::from(self.expected_life_days(item.is_running())) - i64::from(days_in_use);
            if remaining_days >= i64::from(self.settings.replacement_margin_days) {
                continue;
            }

            let candidate = match &top_pick {
                Some(candidate) => candidate.clone(),
                None => {
                    let candidate =
                        self.engine.recommend(user_id, self.settings.alpha, 1)?.into_iter().next();
                    top_pick = Some(candidate.clone());
                    candidate
                }
            };
            let Some(replacement) = candidate else {
                continue;
            };

            let message = format!(
                "Consider replacing {}. Suggested: {}",
                item.display_name(),
                replacement.display_name()
            );
            suggestions.push(ReplacementSuggestion {
                item_id: item.id,
                days_in_use,
                remaining_days,
                replacement,
                message,
            });
        }

        Ok(suggestions)
    }
}
