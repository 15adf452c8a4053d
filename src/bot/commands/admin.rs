//! Admin Discord commands - managing users, campaigns and donation records.
//!
//! Every subcommand checks the caller's role first. Lists are paginated with
//! the same `after` tokens the public commands use.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, require_admin, resolve_campaign},
        core::{
            campaign::{self, CampaignFilter},
            donation::{self, DonationFilter},
            live::{ChangeEvent, ChangeKind},
            pagination::{Cursor, PageRequest},
            report, user,
        },
        entities::{CampaignStatus, DonationStatus, UserRole},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    fn page_request<K: std::str::FromStr>(
        page_size: u64,
        after: Option<&str>,
    ) -> Result<PageRequest<K>> {
        Ok(match after {
            Some(token) => PageRequest::after(page_size, Cursor::decode(token)?),
            None => PageRequest::first(page_size),
        })
    }

    /// Parent command for administrators.
    #[poise::command(
        slash_command,
        subcommands(
            "admin_users",
            "admin_set_role",
            "admin_delete_user",
            "admin_campaigns",
            "admin_set_status",
            "admin_donations",
            "admin_fail_donation",
            "admin_delete_donation"
        )
    )]
    pub async fn admin(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Admin command. Available subcommands:\n\
            `/admin users` - List registered users\n\
            `/admin set_role` - Grant or remove the admin role\n\
            `/admin delete_user` - Remove a user account\n\
            `/admin campaigns` - List campaigns in any status\n\
            `/admin set_status` - Move a campaign through its lifecycle\n\
            `/admin donations` - List donation records\n\
            `/admin fail_donation` - Mark a pending donation as failed\n\
            `/admin delete_donation` - Delete a donation record";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists registered users, newest first.
    #[poise::command(slash_command, rename = "users")]
    pub async fn admin_users(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only this role (user or admin)"] role: Option<String>,
        #[description = "Continue after this page token"] after: Option<String>,
    ) -> Result<()> {
        require_admin(ctx).await?;
        let data = ctx.data();

        let role = role.map(|r| r.parse::<UserRole>()).transpose()?;
        let request = page_request(data.settings.page_size, after.as_deref())?;
        let page = user::list_users_page(&data.database, role, &request).await?;

        if page.items.is_empty() {
            ctx.say("👥 No users found.").await?;
            return Ok(());
        }

        let mut response = String::from("👥 **Users**\n\n");
        for u in &page.items {
            writeln!(
                &mut response,
                "• `{}` **{}** ({}) {} - {} donated",
                u.id,
                u.display_name,
                u.role,
                u.email,
                report::format_amount(u.total_donated)
            )?;
        }
        if let Some(next) = &page.next {
            writeln!(&mut response, "\n➡️ More: `after: {}`", next.encode())?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Grants or removes the admin role.
    #[poise::command(slash_command, rename = "set_role")]
    pub async fn admin_set_role(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to change"] member: serenity::User,
        #[description = "user or admin"] role: String,
    ) -> Result<()> {
        let acting = require_admin(ctx).await?;
        let data = ctx.data();
        let role = role.parse::<UserRole>()?;

        let updated =
            user::set_role(&data.database, &acting, &member.id.to_string(), role).await?;
        data.feed
            .publish(ChangeEvent::user(ChangeKind::Updated, &updated.id));

        ctx.say(format!(
            "✅ **{}** is now {}.",
            updated.display_name, updated.role
        ))
        .await?;
        Ok(())
    }

    /// Removes a user account. Their donations stay on record.
    #[poise::command(slash_command, rename = "delete_user")]
    pub async fn admin_delete_user(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to remove"] member: serenity::User,
    ) -> Result<()> {
        let acting = require_admin(ctx).await?;
        let data = ctx.data();

        let deleted = user::delete_user(&data.database, &acting, &member.id.to_string()).await?;
        data.feed.publish_all([
            ChangeEvent::user(ChangeKind::Deleted, &deleted.id),
            ChangeEvent::notifications_for(ChangeKind::Deleted, &deleted.id),
        ]);

        ctx.say(format!("🗑️ Removed **{}**.", deleted.display_name))
            .await?;
        Ok(())
    }

    /// Lists campaigns in any status.
    #[poise::command(slash_command, rename = "campaigns")]
    pub async fn admin_campaigns(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Status filter"]
        #[autocomplete = "autocomplete::autocomplete_campaign_status"]
        status: Option<String>,
        #[description = "Continue after this page token"] after: Option<String>,
    ) -> Result<()> {
        require_admin(ctx).await?;
        let data = ctx.data();

        let filter = CampaignFilter {
            status: status.map(|s| s.parse::<CampaignStatus>()).transpose()?,
            ..Default::default()
        };
        let request = page_request(data.settings.page_size, after.as_deref())?;
        let page = campaign::list_campaigns_page(&data.database, &filter, &request).await?;

        if page.items.is_empty() {
            ctx.say("📂 No campaigns found.").await?;
            return Ok(());
        }

        let mut response = String::from("📂 **Campaigns**\n\n");
        for c in &page.items {
            writeln!(
                &mut response,
                "• {} (owner `{}`)",
                report::format_campaign_line(c),
                c.owner_id
            )?;
        }
        if let Some(next) = &page.next {
            writeln!(&mut response, "\n➡️ More: `after: {}`", next.encode())?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Moves a campaign to a new status and notifies its owner.
    #[poise::command(slash_command, rename = "set_status")]
    pub async fn admin_set_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Campaign title or #id"]
        #[autocomplete = "autocomplete::autocomplete_campaign_title"]
        campaign: String,
        #[description = "New status"]
        #[autocomplete = "autocomplete::autocomplete_campaign_status"]
        status: String,
    ) -> Result<()> {
        require_admin(ctx).await?;
        let data = ctx.data();
        let db = &data.database;

        let target = resolve_campaign(db, &campaign).await?;
        let status = status.parse::<CampaignStatus>()?;
        let updated = campaign::set_status_by_admin(db, target.id, status).await?;
        data.feed
            .publish(ChangeEvent::campaign(ChangeKind::Updated, updated.id));
        data.feed.publish(ChangeEvent::notifications_for(
            ChangeKind::Created,
            &updated.owner_id,
        ));

        ctx.say(format!(
            "✅ **{}** moved from {} to {}.",
            updated.title, target.status, updated.status
        ))
        .await?;
        Ok(())
    }

    /// Lists donation records, newest first.
    #[poise::command(slash_command, rename = "donations")]
    pub async fn admin_donations(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "pending, completed or failed"] status: Option<String>,
        #[description = "Continue after this page token"] after: Option<String>,
    ) -> Result<()> {
        require_admin(ctx).await?;
        let data = ctx.data();
        let db = &data.database;

        let filter = DonationFilter {
            status: status.map(|s| s.parse::<DonationStatus>()).transpose()?,
            ..Default::default()
        };
        let request = page_request(data.settings.page_size, after.as_deref())?;
        let page = donation::list_donations_page(db, &filter, &request).await?;

        if page.items.is_empty() {
            ctx.say("📜 No donations found.").await?;
            return Ok(());
        }

        let campaigns = donation::load_campaigns(db, &page.items).await?;
        let mut response = String::from("📜 **Donations**\n\n");
        for d in &page.items {
            let title = campaigns
                .iter()
                .find(|c| c.id == d.campaign_id)
                .map_or("(deleted campaign)", |c| c.title.as_str());
            // Admins see the real donor id even for anonymous donations
            let label = format!("{title} from `{}`", d.donor_id);
            writeln!(&mut response, "• {}", report::format_donation_line(d, &label))?;
        }
        if let Some(next) = &page.next {
            writeln!(&mut response, "\n➡️ More: `after: {}`", next.encode())?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Marks a pending donation as failed.
    #[poise::command(slash_command, rename = "fail_donation")]
    pub async fn admin_fail_donation(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Donation number"] id: i64,
    ) -> Result<()> {
        require_admin(ctx).await?;
        let data = ctx.data();

        let failed = donation::fail_donation(&data.database, id).await?;
        data.feed
            .publish(ChangeEvent::donation(ChangeKind::Updated, failed.id));

        ctx.say(format!("⚠️ Donation `#{}` marked as failed.", failed.id))
            .await?;
        Ok(())
    }

    /// Deletes a donation record, reversing its totals if it had settled.
    #[poise::command(slash_command, rename = "delete_donation")]
    pub async fn admin_delete_donation(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Donation number"] id: i64,
    ) -> Result<()> {
        require_admin(ctx).await?;
        let data = ctx.data();

        let deleted = donation::delete_donation(&data.database, id).await?;
        data.feed.publish_all([
            ChangeEvent::donation(ChangeKind::Deleted, deleted.id),
            ChangeEvent::campaign(ChangeKind::Updated, deleted.campaign_id),
            ChangeEvent::user(ChangeKind::Updated, &deleted.donor_id),
        ]);

        ctx.say(format!(
            "🗑️ Deleted donation `#{}` of {}.",
            deleted.id,
            report::format_amount(deleted.amount)
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
