//! Live list Discord commands - `watch` and `unwatch`.
//!
//! `/watch` starts a live campaign list for the channel. Every time the list
//! changes the bot posts the new version. `/unwatch` tears it down.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, register_watch},
        core::{
            campaign::CampaignFilter,
            live::LiveQuery,
            report, validation,
        },
        entities::campaign as campaign_entity,
        errors::{Error, Result},
    };
    use std::{fmt::Write, sync::Arc};
    use tracing::{info, warn};

    const MAX_LISTED: usize = 15;

    fn render(title: &str, campaigns: &[campaign_entity::Model]) -> Result<String> {
        let mut response = format!("📡 **{title}**\n\n");
        if campaigns.is_empty() {
            response.push_str("_No active campaigns_\n");
        }
        for c in campaigns.iter().take(MAX_LISTED) {
            writeln!(&mut response, "• {}", report::format_campaign_line(c))?;
        }
        if campaigns.len() > MAX_LISTED {
            writeln!(&mut response, "…and {} more", campaigns.len() - MAX_LISTED)?;
        }
        Ok(response)
    }

    /// Keeps a live list of active campaigns in this channel.
    #[poise::command(slash_command, prefix_command)]
    pub async fn watch(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only this category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let channel_id = ctx.channel_id();

        let category = category
            .map(|c| validation::validate_category(&c, &data.settings.categories))
            .transpose()?;
        let title = category.as_ref().map_or_else(
            || "Live: active campaigns".to_string(),
            |c| format!("Live: active {c} campaigns"),
        );
        let filter = CampaignFilter {
            category,
            ..CampaignFilter::active()
        };

        let mut query = LiveQuery::start(Arc::clone(&data.database), &data.feed, filter).await?;
        ctx.say(render(&title, &query.snapshot())?).await?;

        let http = Arc::clone(&ctx.serenity_context().http);
        let task = tokio::spawn(async move {
            while query.changed().await.is_ok() {
                let body = match render(&title, &query.snapshot()) {
                    Ok(body) => body,
                    Err(e) => {
                        warn!("Failed to render live list: {e}");
                        continue;
                    }
                };
                if let Err(e) = channel_id.say(&*http, body).await {
                    warn!(%channel_id, "Failed to post live list: {e}");
                }
            }
        });

        register_watch(&mut *data.watches.lock().await, channel_id, task);
        info!(%channel_id, "Started live campaign list");
        Ok(())
    }

    /// Stops the live list in this channel.
    #[poise::command(slash_command, prefix_command)]
    pub async fn unwatch(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let channel_id = ctx.channel_id();
        let removed = ctx.data().watches.lock().await.remove(&channel_id);

        if let Some(task) = removed {
            task.abort();
            info!(%channel_id, "Stopped live campaign list");
            ctx.say("🛑 Live list stopped.").await?;
        } else {
            ctx.say("ℹ️ No live list is running in this channel.")
                .await?;
        }
        Ok(())
    }
}

pub use inner::*;
