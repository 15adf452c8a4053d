//! Account Discord commands - `register`, `profile` and `update_profile`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, require_registered},
        core::{
            live::{ChangeEvent, ChangeKind},
            notification, report,
            user::{self, ProfileUpdate},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Creates your donor account.
    ///
    /// Your Discord id becomes your account id. Registering again after an
    /// admin removed your account restores it.
    #[poise::command(slash_command, prefix_command)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name shown on your donations"] display_name: String,
        #[description = "Email address for donation receipts"] email: String,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        let created = user::register_user(&data.database, &user_id, &display_name, &email).await?;
        data.feed
            .publish(ChangeEvent::user(ChangeKind::Created, &created.id));

        ctx.say(format!(
            "✅ Welcome, **{}**! Receipts will go to {}.",
            created.display_name, created.email
        ))
        .await?;
        Ok(())
    }

    /// Shows your profile and donation totals.
    #[poise::command(slash_command, prefix_command)]
    pub async fn profile(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let me = require_registered(ctx).await?;
        let unread = notification::unread_count(&ctx.data().database, &me.id).await?;

        let mut response = format!("👤 **{}** ({})\n\n", me.display_name, me.role);
        writeln!(&mut response, "📧 {}", me.email)?;
        if let Some(phone) = &me.phone {
            writeln!(&mut response, "📞 {phone}")?;
        }
        if let Some(bio) = &me.bio {
            writeln!(&mut response, "📝 {bio}")?;
        }
        writeln!(
            &mut response,
            "\n💝 Donated {} across {} donation(s)",
            report::format_amount(me.total_donated),
            me.donation_count
        )?;
        writeln!(&mut response, "🔔 {unread} unread notification(s)")?;
        writeln!(
            &mut response,
            "📅 Member since {}",
            me.created_at.format("%Y-%m-%d")
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Edits your profile. Pass an empty phone or bio to clear it.
    #[poise::command(slash_command, prefix_command)]
    pub async fn update_profile(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "New display name"] display_name: Option<String>,
        #[description = "New email address"] email: Option<String>,
        #[description = "Phone number"] phone: Option<String>,
        #[description = "Short bio (max 280 characters)"] bio: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        if display_name.is_none() && email.is_none() && phone.is_none() && bio.is_none() {
            ctx.say("ℹ️ Nothing to update. Pass at least one field.")
                .await?;
            return Ok(());
        }

        let updated = user::update_profile(
            &data.database,
            &user_id,
            ProfileUpdate {
                display_name,
                email,
                phone,
                bio,
            },
        )
        .await?;
        data.feed
            .publish(ChangeEvent::user(ChangeKind::Updated, &updated.id));

        ctx.say(format!("✅ Profile updated, **{}**.", updated.display_name))
            .await?;
        Ok(())
    }
}

pub use inner::*;
