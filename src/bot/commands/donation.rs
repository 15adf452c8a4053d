//! Donation Discord commands - donating, history, statistics and leaderboard.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, require_registered, resolve_campaign},
        core::{
            campaign,
            donation::{self, DonationFilter, NewDonation},
            live::{ChangeEvent, ChangeKind},
            mailer,
            pagination::{Cursor, PageRequest},
            report,
            stats::{self, Period},
            user,
        },
        entities::DonationStatus,
        errors::{Error, Result},
    };
    use std::fmt::Write;
    use tracing::info;

    const DEFAULT_LEADERBOARD: u32 = 5;
    const MAX_LEADERBOARD: u32 = 25;

    /// Donates to a campaign that is accepting donations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn donate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title or #id"]
        #[autocomplete = "autocomplete::autocomplete_campaign_title"]
        campaign: String,
        #[description = "Amount in dollars"] amount: f64,
        #[description = "Note for the campaign owner"] message: Option<String>,
        #[description = "Hide your name from the owner (default: false)"] anonymous: Option<bool>,
    ) -> Result<()> {
        let me = require_registered(ctx).await?;
        let data = ctx.data();
        let db = &data.database;
        let target = resolve_campaign(db, &campaign).await?;

        let outcome = donation::donate(
            db,
            NewDonation {
                campaign_id: target.id,
                donor_id: me.id,
                amount,
                message,
                is_anonymous: anonymous.unwrap_or(false),
            },
        )
        .await?;

        data.feed.publish_all(
            [
                ChangeEvent::donation(ChangeKind::Created, outcome.donation.id),
                ChangeEvent::campaign(ChangeKind::Updated, outcome.campaign.id),
                ChangeEvent::user(ChangeKind::Updated, &outcome.donor.id),
            ]
            .into_iter()
            .chain(
                outcome
                    .notifications
                    .iter()
                    .map(|n| ChangeEvent::notification(ChangeKind::Created, n.id)),
            ),
        );

        data.send_mail_in_background(mailer::donation_receipt(
            &outcome.donor,
            &outcome.campaign,
            &outcome.donation,
        ));
        if outcome.reached_target {
            if let Some(owner) = user::get_user_by_id(db, &outcome.campaign.owner_id).await? {
                data.send_mail_in_background(mailer::campaign_completed(&owner, &outcome.campaign));
            }
        }

        let mut response = format!(
            "💝 Thank you! You donated {} to **{}**.\n",
            report::format_amount(outcome.donation.amount),
            outcome.campaign.title
        );
        writeln!(
            &mut response,
            "**Progress:** {}",
            report::format_progress_bar(campaign::progress_percent(&outcome.campaign), Some(15))
        )?;
        if outcome.reached_target {
            writeln!(&mut response, "🎉 This donation completed the campaign!")?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows your donations, newest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Continue after this page token"] after: Option<String>,
    ) -> Result<()> {
        let me = require_registered(ctx).await?;
        let data = ctx.data();
        let db = &data.database;

        let filter = DonationFilter {
            donor_id: Some(me.id),
            ..Default::default()
        };
        let request = match after.as_deref() {
            Some(token) => PageRequest::after(data.settings.page_size, Cursor::decode(token)?),
            None => PageRequest::first(data.settings.page_size),
        };
        let page = donation::list_donations_page(db, &filter, &request).await?;

        if page.items.is_empty() {
            ctx.say("📜 No donations yet. Find a cause with `/campaigns`!")
                .await?;
            return Ok(());
        }

        let campaigns = donation::load_campaigns(db, &page.items).await?;
        let mut response = String::from("📜 **Your donations**\n\n");
        for d in &page.items {
            let title = campaigns
                .iter()
                .find(|c| c.id == d.campaign_id)
                .map_or("(deleted campaign)", |c| c.title.as_str());
            writeln!(&mut response, "• {}", report::format_donation_line(d, title))?;
        }
        if let Some(next) = &page.next {
            writeln!(&mut response, "\n➡️ More: `after: {}`", next.encode())?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists completed donations to a campaign. Anonymous donors stay hidden.
    #[poise::command(slash_command, prefix_command)]
    pub async fn campaign_donations(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title or #id"]
        #[autocomplete = "autocomplete::autocomplete_campaign_title"]
        campaign: String,
        #[description = "Continue after this page token"] after: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let target = resolve_campaign(db, &campaign).await?;

        let filter = DonationFilter {
            campaign_id: Some(target.id),
            status: Some(DonationStatus::Completed),
            ..Default::default()
        };
        let request = match after.as_deref() {
            Some(token) => PageRequest::after(data.settings.page_size, Cursor::decode(token)?),
            None => PageRequest::first(data.settings.page_size),
        };
        let page = donation::list_donations_page(db, &filter, &request).await?;

        if page.items.is_empty() {
            ctx.say(format!("📜 **{}** has no donations yet.", target.title))
                .await?;
            return Ok(());
        }

        let donors = donation::load_donors(db, &page.items).await?;
        let mut response = format!("📜 **Donations to {}**\n\n", target.title);
        for d in &page.items {
            let donor = donors.iter().find(|u| u.id == d.donor_id);
            let label = donation::donor_label(d, donor);
            writeln!(&mut response, "• {}", report::format_donation_line(d, &label))?;
        }
        if let Some(next) = &page.next {
            writeln!(&mut response, "\n➡️ More: `after: {}`", next.encode())?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Sums your completed donations by day, month or year.
    #[poise::command(slash_command, prefix_command)]
    pub async fn stats(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "day, month or year (default: month)"] period: Option<String>,
    ) -> Result<()> {
        let me = require_registered(ctx).await?;
        let db = &ctx.data().database;
        let period = match period.as_deref() {
            Some(raw) => raw.parse::<Period>()?,
            None => Period::Month,
        };

        let history = donation::donation_history(db, &me.id).await?;
        let summary = stats::summarize(&history);
        if summary.count == 0 {
            ctx.say("📊 No completed donations yet.").await?;
            return Ok(());
        }

        let mut response = format!("📊 **Your giving by {period}**\n\n");
        for bucket in stats::sum_by_period(&history, period) {
            writeln!(
                &mut response,
                "`{}` {} ({} donation(s))",
                bucket.key,
                report::format_amount(bucket.total),
                bucket.count
            )?;
        }
        writeln!(
            &mut response,
            "\n**Total:** {} | **Average:** {} | **Largest:** {}",
            report::format_amount(summary.total),
            report::format_amount(summary.average),
            report::format_amount(summary.largest)
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows the campaigns that raised the most.
    #[poise::command(slash_command, prefix_command)]
    pub async fn leaderboard(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many campaigns to show (default 5, max 25)"] count: Option<u32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let n = count.unwrap_or(DEFAULT_LEADERBOARD).clamp(1, MAX_LEADERBOARD);

        let top = stats::top_campaigns_overall(db, n.try_into()?).await?;
        if top.is_empty() {
            ctx.say("🏆 No donations yet.").await?;
            return Ok(());
        }

        let mut response = String::from("🏆 **Top campaigns**\n\n");
        for (rank, entry) in top.iter().enumerate() {
            let title = campaign::get_campaign_by_id(db, entry.campaign_id)
                .await?
                .map_or_else(|| format!("Campaign #{}", entry.campaign_id), |c| c.title);
            writeln!(
                &mut response,
                "{}. **{title}** - {} from {} donation(s)",
                rank + 1,
                report::format_amount(entry.total),
                entry.count
            )?;
        }

        info!(shown = top.len(), "Leaderboard requested");
        ctx.say(response).await?;
        Ok(())
    }
}

pub use inner::*;
