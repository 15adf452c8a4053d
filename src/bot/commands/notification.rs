//! Notification Discord commands - listing and read state.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, require_registered},
        core::{
            live::{ChangeEvent, ChangeKind},
            notification::{self, NotificationFilter},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    const MAX_SHOWN: usize = 20;

    /// Shows your notifications, newest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn notifications(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only unread notifications (default: false)"] unread_only: Option<bool>,
    ) -> Result<()> {
        let me = require_registered(ctx).await?;
        let filter = NotificationFilter {
            user_id: me.id,
            unread_only: unread_only.unwrap_or(false),
        };
        let all = notification::list_notifications(&ctx.data().database, &filter).await?;

        if all.is_empty() {
            ctx.say("🔔 Nothing new.").await?;
            return Ok(());
        }

        let mut response = String::from("🔔 **Notifications**\n\n");
        for n in all.iter().take(MAX_SHOWN) {
            let marker = if n.is_read { "▫️" } else { "🔹" };
            writeln!(
                &mut response,
                "{marker} `#{}` **{}** - {} _({})_",
                n.id,
                n.title,
                n.body,
                n.created_at.format("%Y-%m-%d %H:%M")
            )?;
        }
        if all.len() > MAX_SHOWN {
            writeln!(&mut response, "\n…and {} more", all.len() - MAX_SHOWN)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Marks one notification as read.
    #[poise::command(slash_command, prefix_command)]
    pub async fn mark_read(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Notification number"] id: i64,
    ) -> Result<()> {
        let me = require_registered(ctx).await?;
        let data = ctx.data();
        let read = notification::mark_read(&data.database, &me.id, id).await?;
        data.feed
            .publish(ChangeEvent::notification(ChangeKind::Updated, read.id));

        ctx.say(format!("✅ Marked `#{}` as read.", read.id)).await?;
        Ok(())
    }

    /// Marks all of your notifications as read.
    #[poise::command(slash_command, prefix_command)]
    pub async fn mark_all_read(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let me = require_registered(ctx).await?;
        let data = ctx.data();
        let changed = notification::mark_all_read(&data.database, &me.id).await?;
        if changed > 0 {
            data.feed
                .publish(ChangeEvent::notifications_for(ChangeKind::Updated, &me.id));
        }

        ctx.say(format!("✅ Marked {changed} notification(s) as read."))
            .await?;
        Ok(())
    }
}

pub use inner::*;
