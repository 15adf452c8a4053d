//! Campaign Discord commands - browsing, details and owner management.
//!
//! Browsing is open to everyone. The `/campaign` subcommands act only on
//! campaigns the caller owns.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, require_registered, resolve_campaign},
        core::{
            campaign::{self, CampaignFilter, CampaignUpdate, NewCampaign},
            donation::{self, DonationFilter},
            live::{ChangeEvent, ChangeKind},
            pagination::{Cursor, PageRequest},
            report, validation,
        },
        entities::{CampaignStatus, DonationStatus, campaign as campaign_entity},
        errors::{Error, Result},
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::fmt::Write;

    const RECENT_DONATIONS: usize = 5;

    async fn owned_campaign(
        ctx: poise::Context<'_, BotData, Error>,
        input: &str,
    ) -> Result<campaign_entity::Model> {
        let found = resolve_campaign(&ctx.data().database, input).await?;
        if found.owner_id != ctx.author().id.to_string() {
            return Err(Error::PermissionDenied {
                message: format!("you do not own '{}'", found.title),
            });
        }
        Ok(found)
    }

    fn parse_end_date(raw: Option<&str>) -> Result<Option<chrono::DateTime<Utc>>> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(None);
        };
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| Error::validation("end date", "use the format YYYY-MM-DD"))?;
        let end_of_day = date
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| Error::validation("end date", "is not a valid date"))?;
        Ok(Some(Utc.from_utc_datetime(&end_of_day)))
    }

    /// Browses campaigns, newest first.
    ///
    /// Defaults to campaigns currently accepting donations. Pass the `next`
    /// token from a previous reply as `after` to see the following page.
    #[poise::command(slash_command, prefix_command)]
    pub async fn campaigns(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Status filter (default: in_progress)"]
        #[autocomplete = "autocomplete::autocomplete_campaign_status"]
        status: Option<String>,
        #[description = "Category filter"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "Continue after this page token"] after: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();

        let status = match status.as_deref() {
            Some(raw) => raw.parse::<CampaignStatus>()?,
            None => CampaignStatus::InProgress,
        };
        let category = category
            .map(|c| validation::validate_category(&c, &data.settings.categories))
            .transpose()?;
        let filter = CampaignFilter {
            status: Some(status),
            owner_id: None,
            category,
        };
        let request = match after.as_deref() {
            Some(token) => PageRequest::after(data.settings.page_size, Cursor::decode(token)?),
            None => PageRequest::first(data.settings.page_size),
        };

        let page = campaign::list_campaigns_page(&data.database, &filter, &request).await?;
        if page.items.is_empty() {
            ctx.say(format!("📂 No {status} campaigns found.")).await?;
            return Ok(());
        }

        let mut response = format!("📂 **{status} campaigns**\n\n");
        for c in &page.items {
            writeln!(&mut response, "• {}", report::format_campaign_line(c))?;
        }
        if let Some(next) = &page.next {
            writeln!(&mut response, "\n➡️ More: `after: {}`", next.encode())?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows one campaign with its progress and recent donations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn campaign_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title or #id"]
        #[autocomplete = "autocomplete::autocomplete_campaign_title"]
        campaign: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let found = resolve_campaign(db, &campaign).await?;

        let mut response = format!("📋 **{}** (#{})\n", found.title, found.id);
        writeln!(&mut response, "_{}_\n", found.short_description)?;
        if !found.description.is_empty() {
            writeln!(&mut response, "{}\n", found.description)?;
        }
        writeln!(&mut response, "📊 Status: {}", found.status)?;
        writeln!(&mut response, "🏷️ Category: {}", found.category)?;
        writeln!(
            &mut response,
            "💰 Raised {} of {} from {} donation(s)",
            report::format_amount(found.donated_amount),
            report::format_amount(found.target_amount),
            found.donor_count
        )?;
        writeln!(
            &mut response,
            "**Progress:** {}",
            report::format_progress_bar(campaign::progress_percent(&found), Some(15))
        )?;
        if let Some(ends_at) = found.ends_at {
            writeln!(&mut response, "⏰ Ends {}", ends_at.format("%Y-%m-%d"))?;
        }
        if let Some(image_url) = &found.image_url {
            writeln!(&mut response, "🖼️ {image_url}")?;
        }
        writeln!(&mut response)?;

        let filter = DonationFilter {
            campaign_id: Some(found.id),
            status: Some(DonationStatus::Completed),
            ..Default::default()
        };
        let recent: Vec<_> = donation::list_donations(db, &filter)
            .await?
            .into_iter()
            .take(RECENT_DONATIONS)
            .collect();

        if recent.is_empty() {
            response.push_str("_No donations yet_\n");
        } else {
            let donors = donation::load_donors(db, &recent).await?;
            response.push_str("**Recent Donations:**\n");
            for d in &recent {
                let donor = donors.iter().find(|u| u.id == d.donor_id);
                let label = donation::donor_label(d, donor);
                writeln!(&mut response, "• {}", report::format_donation_line(d, &label))?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists the campaigns you run, in every status.
    #[poise::command(slash_command, prefix_command)]
    pub async fn my_campaigns(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let me = require_registered(ctx).await?;
        let filter = CampaignFilter {
            owner_id: Some(me.id),
            ..Default::default()
        };
        let mine = campaign::list_campaigns(&ctx.data().database, &filter).await?;

        if mine.is_empty() {
            ctx.say("📂 You have no campaigns. Start one with `/campaign create`.")
                .await?;
            return Ok(());
        }

        let mut response = String::from("📂 **Your campaigns**\n\n");
        for c in &mine {
            writeln!(&mut response, "• {}", report::format_campaign_line(c))?;
        }
        ctx.say(response).await?;
        Ok(())
    }

    /// Parent command for managing your own campaigns.
    #[poise::command(
        slash_command,
        subcommands(
            "campaign_create",
            "campaign_publish",
            "campaign_end",
            "campaign_edit",
            "campaign_delete"
        )
    )]
    pub async fn campaign(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Campaign management command. Available subcommands:\n\
            `/campaign create` - Start a new draft campaign\n\
            `/campaign publish` - Open a draft for donations\n\
            `/campaign end` - Close a campaign early\n\
            `/campaign edit` - Change a campaign's details\n\
            `/campaign delete` - Delete a campaign with no donations";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a draft campaign owned by you.
    #[poise::command(slash_command, rename = "create")]
    pub async fn campaign_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title"] title: String,
        #[description = "One-line summary"] short_description: String,
        #[description = "Amount to raise"] target_amount: f64,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Full description"] description: Option<String>,
        #[description = "Cover image URL"] image_url: Option<String>,
        #[description = "Closing date (YYYY-MM-DD)"] ends_on: Option<String>,
    ) -> Result<()> {
        let me = require_registered(ctx).await?;
        let data = ctx.data();

        let created = campaign::create_campaign(
            &data.database,
            NewCampaign {
                title,
                short_description,
                description: description.unwrap_or_default(),
                target_amount,
                owner_id: me.id,
                category,
                image_url,
                ends_at: parse_end_date(ends_on.as_deref())?,
            },
            &data.settings.categories,
        )
        .await?;
        data.feed
            .publish(ChangeEvent::campaign(ChangeKind::Created, created.id));

        ctx.say(format!(
            "✅ Created draft **{}** (#{}) with a target of {}. Use `/campaign publish` when it is ready.",
            created.title,
            created.id,
            report::format_amount(created.target_amount)
        ))
        .await?;
        Ok(())
    }

    /// Opens one of your drafts for donations.
    #[poise::command(slash_command, rename = "publish")]
    pub async fn campaign_publish(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title or #id"] campaign: String,
    ) -> Result<()> {
        let data = ctx.data();
        let found = owned_campaign(ctx, &campaign).await?;
        let published = campaign::publish_campaign(&data.database, found.id).await?;
        data.feed
            .publish(ChangeEvent::campaign(ChangeKind::Updated, published.id));

        ctx.say(format!(
            "🚀 **{}** is now accepting donations!",
            published.title
        ))
        .await?;
        Ok(())
    }

    /// Closes one of your campaigns before it reaches its target.
    #[poise::command(slash_command, rename = "end")]
    pub async fn campaign_end(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title or #id"]
        #[autocomplete = "autocomplete::autocomplete_campaign_title"]
        campaign: String,
    ) -> Result<()> {
        let data = ctx.data();
        let found = owned_campaign(ctx, &campaign).await?;
        let ended = campaign::end_campaign(&data.database, found.id).await?;
        data.feed
            .publish(ChangeEvent::campaign(ChangeKind::Updated, ended.id));

        ctx.say(format!(
            "🏁 **{}** has ended after raising {}.",
            ended.title,
            report::format_amount(ended.donated_amount)
        ))
        .await?;
        Ok(())
    }

    /// Changes the details of one of your open campaigns.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn campaign_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title or #id"] campaign: String,
        #[description = "New title"] title: Option<String>,
        #[description = "New summary"] short_description: Option<String>,
        #[description = "New description"] description: Option<String>,
        #[description = "New target amount"] target_amount: Option<f64>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "New cover image URL (empty to clear)"] image_url: Option<String>,
        #[description = "New closing date (YYYY-MM-DD)"] ends_on: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let found = owned_campaign(ctx, &campaign).await?;

        let updated = campaign::update_campaign(
            &data.database,
            found.id,
            CampaignUpdate {
                title,
                short_description,
                description,
                target_amount,
                category,
                image_url,
                ends_at: parse_end_date(ends_on.as_deref())?,
            },
            &data.settings.categories,
        )
        .await?;
        data.feed
            .publish(ChangeEvent::campaign(ChangeKind::Updated, updated.id));

        ctx.say(format!("✅ Updated **{}**.", updated.title)).await?;
        Ok(())
    }

    /// Deletes one of your campaigns. Only possible before any donation.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn campaign_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title or #id"] campaign: String,
    ) -> Result<()> {
        let data = ctx.data();
        let found = owned_campaign(ctx, &campaign).await?;
        let deleted = campaign::delete_campaign(&data.database, found.id).await?;
        data.feed
            .publish(ChangeEvent::campaign(ChangeKind::Deleted, deleted.id));

        ctx.say(format!("🗑️ Deleted **{}**.", deleted.title)).await?;
        Ok(())
    }
}

pub use inner::*;
