//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module suggests campaign titles, categories and statuses as the user
//! types, so command arguments match what the core lookups expect.

use crate::{
    bot::BotData,
    core::campaign::{self, CampaignFilter},
    entities::CampaignStatus,
    errors::Error,
};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

/// Provides autocomplete suggestions for campaign titles.
///
/// Only campaigns currently accepting donations are suggested, matching the
/// partial input case-insensitively.
pub async fn autocomplete_campaign_title(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(campaigns) = campaign::list_campaigns(db, &CampaignFilter::active()).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();

    let mut matching: Vec<String> = campaigns
        .into_iter()
        .filter(|c| c.title.to_lowercase().contains(&partial_lower))
        .map(|c| c.title)
        .take(MAX_SUGGESTIONS)
        .collect();

    // Sort alphabetically for consistent UX
    matching.sort();
    matching.dedup();
    matching
}

/// Provides autocomplete suggestions for category names from the loaded config.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    ctx.data()
        .settings
        .categories
        .iter()
        .filter(|cat| cat.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}

/// Provides autocomplete suggestions for campaign statuses.
pub async fn autocomplete_campaign_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    [
        CampaignStatus::Draft,
        CampaignStatus::InProgress,
        CampaignStatus::Completed,
        CampaignStatus::Ended,
    ]
    .iter()
    .map(|s| s.as_str())
    .filter(|s| s.contains(&partial_lower))
    .map(str::to_string)
    .collect()
}
